use std::sync::Arc;

use {
    loglane_common::Result,
    loglane_logging::{ConnectionProvider, Handler},
};

use crate::HandlerConfig;

/// Builds exactly one handler from the configuration it was created with.
pub trait HandlerFactory: Send + Sync {
    fn create_handler(&self) -> Result<Box<dyn Handler>>;
}

/// Constructor registered in a [`crate::FactoryCatalog`]. Implementations
/// validate their parameters here, before any handler is built.
pub type FactoryConstructor =
    fn(HandlerConfig, &FactoryContext) -> Result<Box<dyn HandlerFactory>>;

/// Shared services injected into every factory.
#[derive(Clone, Default)]
pub struct FactoryContext {
    connections: Option<Arc<dyn ConnectionProvider>>,
}

impl FactoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connection_provider(mut self, provider: Arc<dyn ConnectionProvider>) -> Self {
        self.connections = Some(provider);
        self
    }

    pub fn connection_provider(&self) -> Option<&Arc<dyn ConnectionProvider>> {
        self.connections.as_ref()
    }
}
