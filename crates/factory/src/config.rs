use std::{any::Any, collections::HashMap, sync::Arc};

use {
    loglane_common::{Error, Result},
    loglane_logging::{AmqpChannel, Formatter, Level},
    serde_json::{Map, Value},
};

/// Externally supplied object a factory may pick up instead of building its own.
pub type Resource = Arc<dyn Any + Send + Sync>;

pub const TYPE_KEY: &str = "type";
pub const LEVEL_KEY: &str = "level";
/// Resource key for an already-open AMQP channel.
pub const EXCHANGE_KEY: &str = "exchange";

/// Configuration block for a single handler.
///
/// Plain values live in `params` and always include `type`. Objects that
/// cannot be written in a config file (a pre-built formatter, an open broker
/// channel) are attached separately.
#[derive(Clone, Default)]
pub struct HandlerConfig {
    params: Map<String, Value>,
    formatter: Option<Arc<dyn Formatter>>,
    resources: HashMap<String, Resource>,
}

impl std::fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut resources: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        resources.sort_unstable();
        f.debug_struct("HandlerConfig")
            .field("params", &self.params)
            .field("formatter", &self.formatter.is_some())
            .field("resources", &resources)
            .finish()
    }
}

impl From<Map<String, Value>> for HandlerConfig {
    fn from(params: Map<String, Value>) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }
}

impl HandlerConfig {
    pub fn new(handler_type: impl Into<String>) -> Self {
        Self::default().with_param(TYPE_KEY, handler_type.into())
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Attach an arbitrary object. It is retrieved with [`Self::resource`]
    /// using the exact same type.
    pub fn with_resource<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.resources.insert(key.into(), Arc::new(value));
        self
    }

    /// Attach an already-open AMQP channel under [`EXCHANGE_KEY`].
    pub fn with_exchange(self, channel: Arc<dyn AmqpChannel>) -> Self {
        self.with_resource(EXCHANGE_KEY, channel)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn formatter(&self) -> Option<&Arc<dyn Formatter>> {
        self.formatter.as_ref()
    }

    pub fn resource<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.resources
            .get(key)
            .and_then(|r| r.downcast_ref::<T>())
            .cloned()
    }

    pub fn has_resource(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    /// The declared handler type.
    ///
    /// A missing `type` is [`Error::ParameterNotFound`]; a non-string one can
    /// never match a registration and is reported as [`Error::HandlerNotFound`].
    pub fn handler_type(&self) -> Result<&str> {
        match self.params.get(TYPE_KEY) {
            None => Err(Error::parameter_not_found(TYPE_KEY)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(Error::handler_not_found(format!(
                "Type '{other}' not found in handler factory"
            ))),
        }
    }

    pub fn require(&self, key: &str) -> Result<&Value> {
        self.params
            .get(key)
            .ok_or_else(|| Error::parameter_not_found(key))
    }

    /// First string value found under any of `keys`, or `default`.
    pub fn str_or<'a>(&'a self, keys: &[&str], default: &'a str) -> Result<&'a str> {
        for key in keys {
            match self.params.get(*key) {
                None => continue,
                Some(Value::String(s)) => return Ok(s.as_str()),
                Some(other) => {
                    return Err(Error::invalid_parameter(
                        *key,
                        format!("expected a string, got {other}"),
                    ));
                },
            }
        }
        Ok(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.params.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(Error::invalid_parameter(
                key,
                format!("expected a boolean, got {other}"),
            )),
        }
    }

    pub fn level_or(&self, default: Level) -> Result<Level> {
        self.params
            .get(LEVEL_KEY)
            .map_or(Ok(default), Level::normalize)
    }

    /// Rewrite `level`, if present, to its canonical numeric value.
    pub fn normalize_level(&mut self) -> Result<()> {
        if let Some(raw) = self.params.get(LEVEL_KEY) {
            let level = Level::normalize(raw)?;
            self.params
                .insert(LEVEL_KEY.into(), Value::from(level.value()));
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn missing_type_is_parameter_not_found() {
        let config = HandlerConfig::default().with_param("level", "info");
        assert!(matches!(
            config.handler_type(),
            Err(Error::ParameterNotFound { ref parameter }) if parameter == "type"
        ));
    }

    #[test]
    fn normalize_rewrites_level_to_value() {
        let mut config = HandlerConfig::new("amqp").with_param("level", "Warning");
        config.normalize_level().unwrap();
        assert_eq!(config.get("level"), Some(&json!(300)));
        assert_eq!(config.level_or(Level::Debug).unwrap(), Level::Warning);
    }

    #[test]
    fn typed_accessors_reject_wrong_shapes() {
        let config = HandlerConfig::new("amqp")
            .with_param("bubble", "yes")
            .with_param("exchangeName", 5);
        assert!(matches!(
            config.bool_or("bubble", true),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            config.str_or(&["exchange_name", "exchangeName"], "logs"),
            Err(Error::InvalidParameter { ref parameter, .. }) if parameter == "exchangeName"
        ));
    }

    #[test]
    fn resources_round_trip_by_type() {
        let config = HandlerConfig::new("custom").with_resource("token", String::from("abc"));
        assert_eq!(config.resource::<String>("token").as_deref(), Some("abc"));
        assert!(config.resource::<u32>("token").is_none());
        assert!(config.has_resource("token"));
    }
}
