use crate::types::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// One inbound message handed to a subscriber. The subscriber must call
/// [`Delivery::ack`] in every outcome; this system never requests
/// redelivery.
#[derive(Debug)]
pub struct Delivery {
    pub payload: Vec<u8>,
    acked: Arc<AtomicBool>,
}

impl Delivery {
    pub fn new(payload: Vec<u8>) -> (Self, AckProbe) {
        let acked = Arc::new(AtomicBool::new(false));
        let probe = AckProbe(Arc::clone(&acked));
        (Self { payload, acked }, probe)
    }

    pub fn ack(&self) {
        self.acked.store(true, Ordering::SeqCst);
    }
}

/// Observer handle for a delivery's acknowledgment state.
#[derive(Debug, Clone)]
pub struct AckProbe(Arc<AtomicBool>);

impl AckProbe {
    pub fn is_acked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The bus transport collaborator. Concrete deployments implement this over
/// their broker client; [`InMemoryBus`] covers local loopback and tests.
#[async_trait]
pub trait BusTransport: Send + Sync {
    /// Publish an opaque message body to a topic.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;

    /// Subscribe to a topic. Failure here is fatal at startup.
    async fn subscribe(&self, topic: &str) -> Result<mpsc::UnboundedReceiver<Delivery>>;
}

/// Process-local transport over tokio channels. Messages published to a
/// topic with no subscribers are dropped.
pub struct InMemoryBus {
    topics: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Delivery>>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Publish and keep a probe on the delivery's acknowledgment state.
    /// With several subscribers the probe reports the first ack.
    pub async fn publish_with_probe(&self, topic: &str, payload: Vec<u8>) -> Result<AckProbe> {
        let mut topics = self.topics.lock().await;
        let subscribers = topics.entry(topic.to_string()).or_default();

        let acked = Arc::new(AtomicBool::new(false));
        subscribers.retain(|sender| {
            let delivery = Delivery {
                payload: payload.clone(),
                acked: Arc::clone(&acked),
            };
            sender.send(delivery).is_ok()
        });

        Ok(AckProbe(acked))
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusTransport for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.publish_with_probe(topic, payload).await.map(|_| ())
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::UnboundedReceiver<Delivery>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut topics = self.topics.lock().await;
        topics.entry(topic.to_string()).or_default().push(tx);
        Ok(rx)
    }
}
