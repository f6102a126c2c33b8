use crate::artifact::ArtifactRenderer;
use crate::bus::envelope::{BusMessage, EnvelopeCodec, TaskClaims};
use crate::bus::transport::{BusTransport, Delivery};
use crate::bus::Publisher;
use crate::channel::BusChannel;
use crate::config::BusConfig;
use crate::research::ResearchPipeline;
use crate::types::{AppError, ProgressEvent, Report, ResearchTask, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Bridges the inbound bus topic into pipeline runs.
///
/// Configuration is constructed once and immutable for the process
/// lifetime. Concurrency is gated by an owned-permit semaphore sized to the
/// flow-control window: while every permit is held, the dispatch loop does
/// not pull the next delivery, so the transport sees backpressure instead
/// of an application-level queue.
pub struct BusBridge {
    config: BusConfig,
    transport: Arc<dyn BusTransport>,
    codec: Arc<EnvelopeCodec>,
    publisher: Arc<Publisher>,
    pipeline: Arc<ResearchPipeline>,
    renderer: Arc<dyn ArtifactRenderer>,
    permits: Arc<Semaphore>,
}

impl BusBridge {
    pub fn new(
        config: BusConfig,
        transport: Arc<dyn BusTransport>,
        pipeline: Arc<ResearchPipeline>,
        renderer: Arc<dyn ArtifactRenderer>,
    ) -> Self {
        let codec = Arc::new(EnvelopeCodec::new(&config.secret));
        let publisher = Arc::new(Publisher::new(
            Arc::clone(&transport),
            Arc::clone(&codec),
            config.pub_topic.clone(),
        ));
        let permits = Arc::new(Semaphore::new(config.flow_control_window.max(1)));

        Self {
            config,
            transport,
            codec,
            publisher,
            pipeline,
            renderer,
            permits,
        }
    }

    /// Subscribe to the inbound topic and start dispatching. Subscription
    /// failure is fatal and aborts startup; the returned handle runs for
    /// the process lifetime.
    pub async fn start(self: Arc<Self>) -> Result<tokio::task::JoinHandle<()>> {
        let deliveries = self.transport.subscribe(&self.config.sub_topic).await?;
        tracing::info!(topic = %self.config.sub_topic, "listening for research requests");

        Ok(tokio::spawn(async move {
            self.dispatch_loop(deliveries).await;
        }))
    }

    async fn dispatch_loop(
        self: Arc<Self>,
        mut deliveries: tokio::sync::mpsc::UnboundedReceiver<Delivery>,
    ) {
        while let Some(delivery) = deliveries.recv().await {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed; a closed semaphore means
                // the process is shutting down.
                Err(_) => break,
            };

            let bridge = Arc::clone(&self);
            tokio::spawn(async move {
                bridge.handle_delivery(delivery).await;
                drop(permit);
            });
        }
    }

    /// Per-message algorithm. The inbound message is acknowledged in every
    /// outcome; the bus never redelivers for this system.
    async fn handle_delivery(&self, delivery: Delivery) {
        match self.decode_task(&delivery.payload) {
            Ok(Some(task)) => self.process_task(task).await,
            Ok(None) => {
                tracing::warn!("dropping unprocessable message: not enough parameters provided");
            }
            Err(e) => {
                tracing::warn!(error = %e, "rejecting envelope");
                let message_type = outer_message_type(&delivery.payload);
                self.publish_terminal(
                    ProgressEvent::error(format!("ERROR: {}", e)),
                    message_type,
                    None,
                )
                .await;
            }
        }

        delivery.ack();
    }

    /// Decode the outer body and verify the signed task payload.
    /// `Ok(None)` means the envelope was authentic but unprocessable
    /// (missing task or report type) and must be dropped silently.
    fn decode_task(&self, payload: &[u8]) -> Result<Option<ResearchTask>> {
        let body: BusMessage = serde_json::from_slice(payload)
            .map_err(|e| AppError::Envelope(format!("Malformed message body: {}", e)))?;

        let claims: TaskClaims = self.codec.verify(&body.message)?;

        let (Some(query), Some(report_type)) = (claims.task, claims.report_type) else {
            return Ok(None);
        };

        let task = ResearchTask {
            query,
            report_type,
            agent: None,
            user_id: claims.user_id,
            message_type: claims.message_type.or(body.message_type),
        };

        if task.validate().is_err() {
            return Ok(None);
        }

        Ok(Some(task))
    }

    async fn process_task(&self, task: ResearchTask) {
        let channel = BusChannel::new(
            Arc::clone(&self.publisher),
            task.message_type.clone(),
            task.user_id.clone(),
        );

        if self.config.verbose_logging {
            tracing::info!(query = %task.query, report_type = %task.report_type, "starting bus research run");
        }

        let terminal = match self.pipeline.run(&task, &channel).await {
            Ok(Report::Completed(text)) => match self.renderer.render(&text).await {
                Ok(path) => ProgressEvent::path(path),
                Err(e) => ProgressEvent::error(format!("ERROR: {}", e)),
            },
            Ok(Report::Failed(diagnostic)) => ProgressEvent::error(diagnostic),
            Err(e) => ProgressEvent::error(format!("ERROR: {}", e)),
        };

        self.publish_terminal(terminal, task.message_type.clone(), task.user_id.clone())
            .await;
    }

    async fn publish_terminal(
        &self,
        event: ProgressEvent,
        message_type: Option<String>,
        user_id: Option<String>,
    ) {
        if let Err(e) = self
            .publisher
            .publish_event(&event, message_type, user_id)
            .await
        {
            tracing::warn!(error = %e, "failed to publish terminal envelope");
        }
    }
}

/// The routing tag is duplicated in clear on the outer body so error
/// envelopes for unverifiable messages can still be routed.
fn outer_message_type(payload: &[u8]) -> Option<String> {
    serde_json::from_slice::<BusMessage>(payload)
        .ok()
        .and_then(|body| body.message_type)
}
