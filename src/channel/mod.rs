//! Output channels.
//!
//! Every pipeline run is bound to exactly one channel for its lifetime: the
//! WebSocket connection that started it, or the bus publisher for runs that
//! arrived as envelopes. Stages emit [`ProgressEvent`]s; the channel decides
//! how they reach the outside world.

use crate::bus::Publisher;
use crate::types::{AppError, ProgressEvent, ProgressKind, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Sink for progress events, shared by reference across the stages of one
/// run and never by concurrent runs.
#[async_trait]
pub trait OutputChannel: Send + Sync {
    /// Deliver one event, in emission order.
    async fn emit(&self, event: ProgressEvent) -> Result<()>;

    /// Whether live report tokens should be forwarded to this channel.
    fn supports_streaming(&self) -> bool {
        false
    }
}

/// Deliver an event, logging delivery failure instead of propagating it.
/// A dropped interactive connection must not abort an in-flight run.
pub async fn emit_or_log(channel: &dyn OutputChannel, event: ProgressEvent) {
    if let Err(e) = channel.emit(event).await {
        tracing::debug!(error = %e, "progress event dropped");
    }
}

/// Channel bound to one interactive WebSocket connection. Events are pushed
/// into the connection's frame queue in emission order; the socket task
/// drains the queue.
pub struct WebSocketChannel {
    frames: mpsc::UnboundedSender<ProgressEvent>,
    verbose: bool,
}

impl WebSocketChannel {
    pub fn new(frames: mpsc::UnboundedSender<ProgressEvent>, verbose: bool) -> Self {
        Self { frames, verbose }
    }
}

#[async_trait]
impl OutputChannel for WebSocketChannel {
    async fn emit(&self, event: ProgressEvent) -> Result<()> {
        if self.verbose && event.kind != ProgressKind::Report {
            tracing::info!(kind = ?event.kind, "{}", event.output);
        }
        self.frames
            .send(event)
            .map_err(|_| AppError::Channel("websocket connection closed".to_string()))
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

/// Channel for bus-initiated runs. Every event is signed, published to the
/// outbound topic, and mirrored to the local diagnostic log sink since no
/// interactive channel is bound.
pub struct BusChannel {
    publisher: Arc<Publisher>,
    message_type: Option<String>,
    user_id: Option<String>,
}

impl BusChannel {
    pub fn new(
        publisher: Arc<Publisher>,
        message_type: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            publisher,
            message_type,
            user_id,
        }
    }
}

#[async_trait]
impl OutputChannel for BusChannel {
    async fn emit(&self, event: ProgressEvent) -> Result<()> {
        tracing::info!(kind = ?event.kind, "{}", event.output);
        self.publisher
            .publish_event(&event, self.message_type.clone(), self.user_id.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_websocket_channel_preserves_emission_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = WebSocketChannel::new(tx, false);

        for i in 0..5 {
            channel
                .emit(ProgressEvent::logs(format!("event {}", i)))
                .await
                .expect("should deliver");
        }

        for i in 0..5 {
            let event = rx.recv().await.expect("should receive");
            assert_eq!(event.output, format!("event {}", i));
        }
    }

    #[tokio::test]
    async fn test_websocket_channel_errors_after_disconnect() {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = WebSocketChannel::new(tx, false);
        drop(rx);

        let result = channel.emit(ProgressEvent::logs("late")).await;
        assert!(result.is_err());
    }
}
