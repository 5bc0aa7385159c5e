//! Config schema types.

use {
    indexmap::IndexMap,
    loglane_factory::StrategyOverrides,
    serde::{Deserialize, Serialize},
};

/// Channel name used when the config does not set one.
pub const DEFAULT_CHANNEL_NAME: &str = "main";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoglaneConfig {
    /// Channel returned by lookups that name no channel.
    #[serde(alias = "defaultChannelName")]
    pub default_channel_name: String,
    /// Overrides for the handler type registration table.
    #[serde(alias = "strategyConfig")]
    pub strategy: StrategyOverrides,
    /// Channels to open on initialization, in declaration order.
    pub channels: IndexMap<String, ChannelSection>,
}

impl Default for LoglaneConfig {
    fn default() -> Self {
        Self {
            default_channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            strategy: StrategyOverrides::default(),
            channels: IndexMap::new(),
        }
    }
}

/// One declared channel.
///
/// Handler entries stay untyped here; each one is checked by the strategy
/// when the channel is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSection {
    pub handler: Vec<serde_json::Value>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: LoglaneConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_channel_name, "main");
        assert!(config.channels.is_empty());
        assert!(config.strategy.factories.is_none());
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let config: LoglaneConfig = serde_json::from_str(
            r#"{
                "defaultChannelName": "app",
                "strategyConfig": { "factories": { "queue": "amqp" } },
                "channels": { "app": { "handler": [ { "type": "queue" } ] } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_channel_name, "app");
        assert_eq!(config.strategy.factories.unwrap()["queue"], "amqp");
        assert_eq!(config.channels["app"].handler.len(), 1);
    }

    #[test]
    fn channels_keep_declaration_order() {
        let config: LoglaneConfig = toml::from_str(
            r#"
            [channels.zeta]
            [channels.alpha]
            [channels.mid]
            "#,
        )
        .unwrap();
        let names: Vec<&str> = config.channels.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }
}
