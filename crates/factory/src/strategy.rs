use {
    indexmap::IndexMap,
    loglane_common::{Error, Result},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{
    FactoryCatalog, FactoryConstructor, FactoryContext, HandlerConfig, HandlerFactory,
    catalog::BUILTIN_FACTORIES,
};

/// Registration table for the strategy: handler type name → implementation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub factories: IndexMap<String, String>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            factories: BUILTIN_FACTORIES
                .iter()
                .map(|(id, _)| ((*id).to_string(), (*id).to_string()))
                .collect(),
        }
    }
}

/// Host-supplied strategy settings, merged over [`StrategyConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factories: Option<IndexMap<String, String>>,
}

impl StrategyConfig {
    /// Merge overrides key by key. A supplied `factories` table replaces the
    /// current one as a whole.
    pub fn merge(&mut self, overrides: StrategyOverrides) {
        if let Some(factories) = overrides.factories {
            self.factories = factories;
        }
    }
}

/// Resolves handler configurations into factories.
pub struct FactoryStrategy {
    factories: IndexMap<String, String>,
    catalog: FactoryCatalog,
    context: FactoryContext,
}

impl FactoryStrategy {
    /// A strategy with an empty registration table.
    pub fn new(catalog: FactoryCatalog, context: FactoryContext) -> Self {
        Self {
            factories: IndexMap::new(),
            catalog,
            context,
        }
    }

    pub fn from_config(
        config: &StrategyConfig,
        catalog: FactoryCatalog,
        context: FactoryContext,
    ) -> Self {
        let mut strategy = Self::new(catalog, context);
        strategy.set_factories(config.factories.clone());
        strategy
    }

    /// Replace the registration table.
    pub fn set_factories(&mut self, factories: IndexMap<String, String>) -> &mut Self {
        self.factories = factories;
        self
    }

    /// Look up the constructor registered for `handler_type`.
    pub fn resolve(&self, handler_type: &str) -> Result<FactoryConstructor> {
        let Some(id) = self.factories.get(handler_type) else {
            return Err(Error::handler_not_found(format!(
                "Type '{handler_type}' not found in handler factory"
            )));
        };
        self.catalog
            .get(id)
            .ok_or_else(|| Error::not_implemented(handler_type))
    }

    /// Build a fresh factory for `config`.
    ///
    /// Fails before constructing anything when `type` is missing, unknown or
    /// unresolvable, or when `level` does not denote a defined level.
    pub fn create_factory(&self, config: &HandlerConfig) -> Result<Box<dyn HandlerFactory>> {
        let handler_type = config.handler_type()?;
        let constructor = self.resolve(handler_type)?;

        let mut config = config.clone();
        config.normalize_level()?;

        debug!(handler_type = config.handler_type()?, "creating handler factory");
        constructor(config, &self.context)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        loglane_logging::{Handler, Level, MemoryHandler},
        serde_json::json,
    };

    fn strategy() -> FactoryStrategy {
        FactoryStrategy::from_config(
            &StrategyConfig::default(),
            FactoryCatalog::builtin(),
            FactoryContext::new(),
        )
    }

    #[test]
    fn missing_type_fails_first() {
        let config = HandlerConfig::default().with_param("level", "nonsense");
        let err = strategy().create_factory(&config).err().unwrap();
        assert!(matches!(err, Error::ParameterNotFound { ref parameter } if parameter == "type"));
    }

    #[test]
    fn unregistered_type_is_handler_not_found() {
        let err = strategy()
            .create_factory(&HandlerConfig::new("syslog"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::HandlerNotFound { .. }));
        assert!(err.to_string().contains("syslog"));
    }

    #[test]
    fn non_string_type_is_handler_not_found() {
        let config = HandlerConfig::default().with_param("type", json!(["amqp"]));
        let err = strategy().create_factory(&config).err().unwrap();
        assert!(matches!(err, Error::HandlerNotFound { .. }));
    }

    #[test]
    fn registered_but_missing_implementation_is_not_implemented() {
        let mut strategy = strategy();
        strategy.set_factories(IndexMap::from([("kafka".to_string(), "kafka".to_string())]));
        let err = strategy
            .create_factory(&HandlerConfig::new("kafka"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::NotImplemented { ref handler_type } if handler_type == "kafka"));
    }

    #[test]
    fn type_aliases_resolve_through_the_table() {
        let mut strategy = strategy();
        strategy.set_factories(IndexMap::from([("test".to_string(), "memory".to_string())]));
        let handler = strategy
            .create_factory(&HandlerConfig::new("test"))
            .unwrap()
            .create_handler()
            .unwrap();
        assert!(handler.as_any().is::<MemoryHandler>());
    }

    #[test]
    fn level_is_normalized_before_construction() {
        let config = HandlerConfig::new("memory").with_param("level", "warning");
        let handler = strategy()
            .create_factory(&config)
            .unwrap()
            .create_handler()
            .unwrap();
        assert_eq!(handler.level(), Level::Warning);
    }

    #[test]
    fn undefined_level_is_rejected() {
        let config = HandlerConfig::new("memory").with_param("level", "loud");
        let err = strategy().create_factory(&config).err().unwrap();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn each_call_returns_a_fresh_factory() {
        let strategy = strategy();
        let config = HandlerConfig::new("memory");
        let first = strategy.create_factory(&config).unwrap().create_handler().unwrap();
        let second = strategy.create_factory(&config).unwrap().create_handler().unwrap();
        let first = first.as_any().downcast_ref::<MemoryHandler>().unwrap();
        let second = second.as_any().downcast_ref::<MemoryHandler>().unwrap();
        first
            .handle(&loglane_logging::Record::new(
                Level::Info,
                "app",
                "only in first",
                serde_json::Map::new(),
            ))
            .unwrap();
        assert_eq!(first.records().len(), 1);
        assert!(second.records().is_empty());
    }

    #[test]
    fn overrides_replace_the_whole_table() {
        let mut config = StrategyConfig::default();
        assert!(config.factories.contains_key("amqp"));
        config.merge(StrategyOverrides {
            factories: Some(IndexMap::from([("queue".to_string(), "amqp".to_string())])),
        });
        assert_eq!(config.factories.len(), 1);
        assert_eq!(config.factories["queue"], "amqp");

        config.merge(StrategyOverrides::default());
        assert_eq!(config.factories.len(), 1);
    }
}
