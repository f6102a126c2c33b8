//! Message-bus side of the system.
//!
//! Inbound research requests arrive as signed envelopes on a subscription
//! topic; progress and results leave as signed envelopes on a publish
//! topic. The [`bridge::BusBridge`] turns each verified delivery into a
//! pipeline run, gated by a flow-control window.

pub mod bridge;
pub mod envelope;
pub mod transport;

pub use bridge::BusBridge;
pub use envelope::{BusMessage, EnvelopeCodec, EventPayload, TaskClaims};
pub use transport::{AckProbe, BusTransport, Delivery, InMemoryBus};

use crate::types::{AppError, ProgressEvent, Result};
use std::sync::Arc;

/// Envelope-signing publish helper bound to one outbound topic.
pub struct Publisher {
    transport: Arc<dyn BusTransport>,
    codec: Arc<EnvelopeCodec>,
    topic: String,
}

impl Publisher {
    pub fn new(transport: Arc<dyn BusTransport>, codec: Arc<EnvelopeCodec>, topic: String) -> Self {
        Self {
            transport,
            codec,
            topic,
        }
    }

    /// Sign a progress event together with its routing metadata and publish
    /// it to the outbound topic.
    pub async fn publish_event(
        &self,
        event: &ProgressEvent,
        message_type: Option<String>,
        user_id: Option<String>,
    ) -> Result<()> {
        let payload = EventPayload {
            kind: event.kind,
            output: event.output.clone(),
            message_type: message_type.clone(),
            user_id,
        };

        let body = BusMessage {
            message: self.codec.sign(&payload)?,
            message_type,
        };

        let bytes = serde_json::to_vec(&body)
            .map_err(|e| AppError::Envelope(format!("Failed to encode message body: {}", e)))?;
        self.transport.publish(&self.topic, bytes).await
    }
}
