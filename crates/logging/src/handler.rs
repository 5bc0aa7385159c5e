use std::{any::Any, sync::Arc};

use loglane_common::Result;

use crate::{Formatter, Level, LineFormatter, Record};

/// Settings every handler shares: minimum level, bubbling and formatter.
#[derive(Clone)]
pub struct HandlerOptions {
    pub level: Level,
    /// When false, a handled record is not passed on to later handlers.
    pub bubble: bool,
    pub formatter: Option<Arc<dyn Formatter>>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self::new(Level::Debug, true)
    }
}

impl HandlerOptions {
    pub fn new(level: Level, bubble: bool) -> Self {
        Self {
            level,
            bubble,
            formatter: None,
        }
    }
}

impl std::fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Receives finalized records and delivers them to a destination.
///
/// Implementors provide [`Handler::write`] plus access to their
/// [`HandlerOptions`]; level filtering, formatting and bubbling are shared.
pub trait Handler: Send + Sync {
    fn options(&self) -> &HandlerOptions;

    fn options_mut(&mut self) -> &mut HandlerOptions;

    /// Deliver a record that already passed level filtering.
    fn write(&self, record: &Record, formatted: &str) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    /// Formatter used when none was attached explicitly.
    fn default_formatter(&self) -> Arc<dyn Formatter> {
        Arc::new(LineFormatter::default())
    }

    fn level(&self) -> Level {
        self.options().level
    }

    fn bubble(&self) -> bool {
        self.options().bubble
    }

    fn is_handling(&self, level: Level) -> bool {
        level >= self.level()
    }

    fn formatter(&self) -> Arc<dyn Formatter> {
        self.options()
            .formatter
            .clone()
            .unwrap_or_else(|| self.default_formatter())
    }

    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.options_mut().formatter = Some(formatter);
    }

    /// Handle a record. Returns `true` when the record must not bubble up to
    /// the remaining handlers.
    fn handle(&self, record: &Record) -> Result<bool> {
        if !self.is_handling(record.level) {
            return Ok(false);
        }
        let formatted = self.formatter().format(record)?;
        self.write(record, &formatted)?;
        Ok(!self.bubble())
    }
}
