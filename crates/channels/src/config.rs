use std::sync::Arc;

use {
    loglane_config::ChannelSection,
    loglane_factory::HandlerConfig,
    loglane_logging::{Handler, Processor},
    serde_json::Value,
};

/// One entry of a channel's handler list.
#[derive(Clone)]
pub enum HandlerEntry {
    /// Resolved through the factory strategy when the channel is created.
    Config(HandlerConfig),
    /// Already built by the host; used as-is.
    Handler(Arc<dyn Handler>),
    /// Anything else found in a config document. Rejected on creation.
    Malformed(Value),
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(config) => f.debug_tuple("Config").field(config).finish(),
            Self::Handler(handler) => f
                .debug_tuple("Handler")
                .field(&format_args!("level={}, bubble={}", handler.level(), handler.bubble()))
                .finish(),
            Self::Malformed(value) => f.debug_tuple("Malformed").field(value).finish(),
        }
    }
}

impl From<HandlerConfig> for HandlerEntry {
    fn from(config: HandlerConfig) -> Self {
        Self::Config(config)
    }
}

impl From<Arc<dyn Handler>> for HandlerEntry {
    fn from(handler: Arc<dyn Handler>) -> Self {
        Self::Handler(handler)
    }
}

impl From<Value> for HandlerEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(params) => Self::Config(HandlerConfig::from(params)),
            other => Self::Malformed(other),
        }
    }
}

/// Declaration of one channel: its handlers and processors, in order.
#[derive(Clone, Default)]
pub struct ChannelConfig {
    pub handler: Vec<HandlerEntry>,
    pub processor: Vec<Arc<dyn Processor>>,
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("handler", &self.handler)
            .field("processor", &self.processor.len())
            .finish()
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_handler(mut self, entry: impl Into<HandlerEntry>) -> Self {
        self.handler.push(entry.into());
        self
    }

    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processor.push(processor);
        self
    }
}

impl From<&ChannelSection> for ChannelConfig {
    fn from(section: &ChannelSection) -> Self {
        Self {
            handler: section.handler.iter().cloned().map(HandlerEntry::from).collect(),
            processor: Vec::new(),
        }
    }
}
