//! Message-queue transport seam used by [`crate::AmqpHandler`].
//!
//! The real broker client lives outside this workspace. Hosts plug it in by
//! implementing [`AmqpChannel`] and [`ConnectionProvider`]; [`MemoryBroker`]
//! is the in-process implementation used by tests and the CLI.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use {loglane_common::Result, tracing::debug};

/// AMQP message properties the handler sets on every publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishProperties {
    pub content_type: String,
    /// 1 = transient, 2 = persistent.
    pub delivery_mode: u8,
}

impl Default for PublishProperties {
    fn default() -> Self {
        Self {
            content_type: "application/json".into(),
            delivery_mode: 2,
        }
    }
}

/// An open channel on a message broker.
pub trait AmqpChannel: Send + Sync {
    fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
        properties: &PublishProperties,
    ) -> Result<()>;
}

/// Opens broker channels for handlers that were not given one explicitly.
pub trait ConnectionProvider: Send + Sync {
    fn channel(&self) -> Result<Arc<dyn AmqpChannel>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
    pub properties: PublishProperties,
}

impl PublishedMessage {
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }
}

/// In-memory broker that records every published message.
///
/// Clones share the same message log.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    messages: Arc<Mutex<Vec<PublishedMessage>>>,
    channels_opened: Arc<AtomicUsize>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages published to one exchange, in publish order.
    pub fn messages_for(&self, exchange: &str) -> Vec<PublishedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.exchange == exchange)
            .collect()
    }

    /// Number of channels handed out through [`ConnectionProvider::channel`].
    pub fn channels_opened(&self) -> usize {
        self.channels_opened.load(Ordering::Relaxed)
    }
}

impl AmqpChannel for MemoryBroker {
    fn basic_publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
        properties: &PublishProperties,
    ) -> Result<()> {
        debug!(exchange, routing_key, bytes = payload.len(), "publish");
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedMessage {
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
                payload: payload.to_vec(),
                properties: properties.clone(),
            });
        Ok(())
    }
}

impl ConnectionProvider for MemoryBroker {
    fn channel(&self) -> Result<Arc<dyn AmqpChannel>> {
        self.channels_opened.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(self.clone()))
    }
}
