use {
    chrono::{DateTime, Utc},
    serde_json::{Map, Value},
};

use crate::Level;

/// A single log event as it travels through processors and handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub message: String,
    pub context: Map<String, Value>,
    pub level: Level,
    /// Name of the channel that emitted the record.
    pub channel: String,
    pub datetime: DateTime<Utc>,
    /// Data added by processors.
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(
        level: Level,
        channel: impl Into<String>,
        message: impl Into<String>,
        context: Map<String, Value>,
    ) -> Self {
        Self {
            message: message.into(),
            context,
            level,
            channel: channel.into(),
            datetime: Utc::now(),
            extra: Map::new(),
        }
    }

    /// Builder-style method for adding an `extra` field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
