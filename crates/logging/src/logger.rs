use std::sync::Arc;

use {
    loglane_common::Result,
    serde_json::{Map, Value},
};

use crate::{Handler, Level, Processor, Record};

/// A named channel: ordered handlers plus ordered processors.
pub struct Logger {
    name: String,
    handlers: Vec<Arc<dyn Handler>>,
    processors: Vec<Arc<dyn Processor>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("handlers", &self.handlers.len())
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl Logger {
    pub fn new(
        name: impl Into<String>,
        handlers: Vec<Arc<dyn Handler>>,
        processors: Vec<Arc<dyn Processor>>,
    ) -> Self {
        Self {
            name: name.into(),
            handlers,
            processors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn processors(&self) -> &[Arc<dyn Processor>] {
        &self.processors
    }

    /// Whether at least one handler accepts `level`.
    pub fn is_handling(&self, level: Level) -> bool {
        self.handlers.iter().any(|h| h.is_handling(level))
    }

    /// Log a message with structured context.
    ///
    /// Returns `Ok(false)` when no handler accepts the level. Otherwise the
    /// processors run in order, then handlers are invoked starting with the
    /// first one that accepts the level, stopping at the first handler that
    /// does not bubble.
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        context: Map<String, Value>,
    ) -> Result<bool> {
        let Some(first) = self.handlers.iter().position(|h| h.is_handling(level)) else {
            return Ok(false);
        };

        let record = self
            .processors
            .iter()
            .fold(Record::new(level, &self.name, message, context), |record, p| {
                p.process(record)
            });

        for handler in &self.handlers[first..] {
            if handler.handle(&record)? {
                break;
            }
        }
        Ok(true)
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Debug, message, Map::new())
    }

    pub fn info(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Info, message, Map::new())
    }

    pub fn notice(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Notice, message, Map::new())
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Warning, message, Map::new())
    }

    pub fn error(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Error, message, Map::new())
    }

    pub fn critical(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Critical, message, Map::new())
    }

    pub fn alert(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Alert, message, Map::new())
    }

    pub fn emergency(&self, message: impl Into<String>) -> Result<bool> {
        self.log(Level::Emergency, message, Map::new())
    }
}
