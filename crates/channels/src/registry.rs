use std::sync::Arc;

use {
    indexmap::IndexMap,
    loglane_common::{Error, Result},
    loglane_config::{LoglaneConfig, schema::DEFAULT_CHANNEL_NAME},
    loglane_factory::{
        FactoryCatalog, FactoryConstructor, FactoryContext, FactoryStrategy, StrategyConfig,
        StrategyOverrides,
    },
    loglane_logging::{ConnectionProvider, Handler, Logger, Processor},
    tracing::{debug, info},
};

use crate::{ChannelConfig, HandlerEntry};

/// Owns every open channel by name.
///
/// Built once by the host and passed by reference to whatever needs a
/// logger. Channel names are unique; a failed operation leaves the set of
/// registered channels as it was.
pub struct ChannelRegistry {
    default_channel_name: String,
    strategy_config: StrategyConfig,
    catalog: FactoryCatalog,
    context: FactoryContext,
    declared: IndexMap<String, ChannelConfig>,
    channels: IndexMap<String, Arc<Logger>>,
    strategy: Option<FactoryStrategy>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("default_channel_name", &self.default_channel_name)
            .field("strategy_config", &self.strategy_config)
            .field("declared", &self.declared.keys().collect::<Vec<_>>())
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            default_channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            strategy_config: StrategyConfig::default(),
            catalog: FactoryCatalog::builtin(),
            context: FactoryContext::new(),
            declared: IndexMap::new(),
            channels: IndexMap::new(),
            strategy: None,
        }
    }

    /// A registry seeded from a loaded config file. Nothing is opened until
    /// [`initialize`](Self::initialize) runs.
    pub fn from_config(config: &LoglaneConfig) -> Self {
        let mut registry = Self::new();
        registry.set_default_channel_name(config.default_channel_name.clone());
        registry.set_strategy_config(config.strategy.clone());
        registry.set_channels(
            config
                .channels
                .iter()
                .map(|(name, section)| (name.clone(), ChannelConfig::from(section)))
                .collect(),
        );
        registry
    }

    /// Inject the connection provider used by factories that need a broker
    /// channel and were not handed one.
    #[must_use]
    pub fn with_connection_provider(mut self, provider: Arc<dyn ConnectionProvider>) -> Self {
        self.context = self.context.with_connection_provider(provider);
        self.strategy = None;
        self
    }

    /// Add or replace a constructor in the factory catalog.
    pub fn register_factory(
        &mut self,
        id: impl Into<String>,
        constructor: FactoryConstructor,
    ) -> &mut Self {
        self.catalog.register(id, constructor);
        self.strategy = None;
        self
    }

    pub fn set_default_channel_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.default_channel_name = name.into();
        self
    }

    /// Channel used when a lookup names none.
    pub fn default_channel_name(&self) -> Result<&str> {
        if self.default_channel_name.is_empty() {
            return Err(Error::invalid_configuration(
                "default channel name can not be empty",
            ));
        }
        Ok(&self.default_channel_name)
    }

    /// Merge `overrides` over the current strategy settings.
    pub fn set_strategy_config(&mut self, overrides: StrategyOverrides) -> &mut Self {
        self.strategy_config.merge(overrides);
        self.strategy = None;
        self
    }

    pub fn strategy_config(&self) -> &StrategyConfig {
        &self.strategy_config
    }

    /// Replace the declared channels opened by [`initialize`](Self::initialize).
    pub fn set_channels(&mut self, channels: IndexMap<String, ChannelConfig>) -> &mut Self {
        self.declared = channels;
        self
    }

    /// Open every declared channel in declaration order.
    ///
    /// Stops at the first failure. Channels opened before it stay
    /// registered; later ones are not attempted.
    pub fn initialize(&mut self) -> Result<()> {
        self.strategy = None;
        self.strategy();
        let declared = self.declared.clone();
        for (name, config) in declared {
            self.create_channel(&name, config)?;
        }
        Ok(())
    }

    /// Build every handler of `config` and open the channel.
    ///
    /// All handlers are built before anything is registered, so a failing
    /// entry leaves no partial channel behind.
    pub fn create_channel(&mut self, name: &str, config: ChannelConfig) -> Result<()> {
        if self.channels.contains_key(name) {
            return Err(already_exists(name));
        }

        let strategy = self.strategy();
        let mut handlers: Vec<Arc<dyn Handler>> = Vec::with_capacity(config.handler.len());
        for entry in config.handler {
            let handler = match entry {
                HandlerEntry::Handler(handler) => handler,
                HandlerEntry::Config(handler_config) => {
                    let mut handler = strategy.create_factory(&handler_config)?.create_handler()?;
                    if let Some(formatter) = handler_config.formatter() {
                        handler.set_formatter(Arc::clone(formatter));
                    }
                    Arc::from(handler)
                },
                HandlerEntry::Malformed(value) => {
                    return Err(Error::handler_not_found(format!(
                        "handler entry for channel '{name}' is not a handler configuration: \
                         {value}"
                    )));
                },
            };
            handlers.push(handler);
        }

        self.open_channel(name, handlers, config.processor)
    }

    /// Register a logger assembled from ready-made parts.
    pub fn open_channel(
        &mut self,
        name: &str,
        handlers: Vec<Arc<dyn Handler>>,
        processors: Vec<Arc<dyn Processor>>,
    ) -> Result<()> {
        if self.channels.contains_key(name) {
            return Err(already_exists(name));
        }
        info!(
            channel = name,
            handlers = handlers.len(),
            processors = processors.len(),
            "channel opened"
        );
        self.channels.insert(
            name.to_string(),
            Arc::new(Logger::new(name, handlers, processors)),
        );
        Ok(())
    }

    /// Remove a channel. Closing an unknown channel does nothing.
    pub fn close_channel(&mut self, name: &str) {
        if self.channels.shift_remove(name).is_some() {
            info!(channel = name, "channel closed");
        } else {
            debug!(channel = name, "close requested for unknown channel");
        }
    }

    pub fn has_logger(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Logger registered under `name`, or under the default channel name
    /// when `name` is `None`.
    pub fn get_logger(&self, name: Option<&str>) -> Result<Arc<Logger>> {
        let name = match name {
            Some(name) => name,
            None => self.default_channel_name()?,
        };
        self.channels
            .get(name)
            .cloned()
            .ok_or_else(|| Error::logger_not_found(name))
    }

    /// Names of the open channels, in the order they were opened.
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.keys().map(String::as_str).collect()
    }

    /// The factory strategy, built from the current settings on first use.
    fn strategy(&mut self) -> &FactoryStrategy {
        let Self {
            strategy,
            strategy_config,
            catalog,
            context,
            ..
        } = self;
        strategy.get_or_insert_with(|| {
            debug!(
                factories = ?strategy_config.factories.keys().collect::<Vec<_>>(),
                "building factory strategy"
            );
            FactoryStrategy::from_config(strategy_config, catalog.clone(), context.clone())
        })
    }
}

fn already_exists(name: &str) -> Error {
    Error::invalid_configuration(format!("channel '{name}' already exists"))
}
