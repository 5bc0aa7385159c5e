use {
    loglane_common::Result,
    loglane_logging::{Handler, Level, MemoryHandler},
};

use crate::{FactoryContext, HandlerConfig, HandlerFactory};

/// Builds a [`MemoryHandler`]. Takes only `level` and `bubble`.
pub struct MemoryFactory {
    config: HandlerConfig,
}

impl MemoryFactory {
    pub fn new(config: HandlerConfig, _context: &FactoryContext) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn construct(
        config: HandlerConfig,
        context: &FactoryContext,
    ) -> Result<Box<dyn HandlerFactory>> {
        Ok(Box::new(Self::new(config, context)?))
    }
}

impl HandlerFactory for MemoryFactory {
    fn create_handler(&self) -> Result<Box<dyn Handler>> {
        let level = self.config.level_or(Level::Debug)?;
        let bubble = self.config.bool_or("bubble", true)?;
        Ok(Box::new(MemoryHandler::new(level, bubble)))
    }
}
