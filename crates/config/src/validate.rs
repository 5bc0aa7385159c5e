//! Configuration validation engine.
//!
//! Validates config files against the known schema, detects unknown or
//! misspelled fields, and checks each declared handler entry the way the
//! factory strategy will when the channel is opened.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use {
    indexmap::IndexMap,
    loglane_factory::{FactoryCatalog, StrategyConfig},
    loglane_logging::Level,
    serde_json::{Map, Value},
};

use crate::{
    env_subst::substitute_env,
    loader::parse_config_value,
    schema::LoglaneConfig,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "handler", "unknown-type",
    /// "level", "strategy", "channel", "type-error", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "channels.app.handler[0].type"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Expected shape of the configuration document.
enum KnownKeys {
    /// A struct with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// A map with dynamic keys whose values have a known shape.
    Map(Box<KnownKeys>),
    /// An array of typed items.
    Array(Box<KnownKeys>),
    /// Scalar or free-form value. Stop recursion.
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Array, Leaf, Map, Struct};

    let strategy = || Struct(HashMap::from([("factories", Map(Box::new(Leaf)))]));

    // Handler entry keys depend on the type; see `check_handler_keys`.
    let channel = Struct(HashMap::from([("handler", Array(Box::new(Leaf)))]));

    Struct(HashMap::from([
        ("default_channel_name", Leaf),
        ("defaultChannelName", Leaf),
        ("strategy", strategy()),
        ("strategyConfig", strategy()),
        ("channels", Map(Box::new(channel))),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Closest candidate to `needle` within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

fn with_suggestion(base: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!("{base} (did you mean \"{s}\"?)"),
        None => base.to_string(),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => crate::loader::find_config_file(),
    };

    let Some(actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "file-ref",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    let diagnostics = match std::fs::read_to_string(&actual_path) {
        Ok(content) => match parse_config_value(&substitute_env(&content), &actual_path) {
            Ok(value) => validate_value(&value),
            Err(e) => vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("syntax error: {e}"),
            )],
        },
        Err(e) => vec![Diagnostic::new(
            Severity::Error,
            "syntax",
            "",
            format!("failed to read config file: {e}"),
        )],
    };

    ValidationResult {
        diagnostics,
        config_path: Some(actual_path),
    }
}

/// Validate a TOML string without touching the file system.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let diagnostics = match toml::from_str::<toml::Value>(toml_str)
        .map_err(|e| e.to_string())
        .and_then(|v| serde_json::to_value(v).map_err(|e| e.to_string()))
    {
        Ok(value) => validate_value(&value),
        Err(e) => vec![Diagnostic::new(
            Severity::Error,
            "syntax",
            "",
            format!("TOML syntax error: {e}"),
        )],
    };

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Validate an already-parsed config document, whatever format it came from.
#[must_use]
pub fn validate_value(value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    // 1. Unknown fields
    check_unknown_fields(value, &build_schema_map(), "", &mut diagnostics);

    // 2. Strategy table
    let factories = strategy_factories(value);
    if let Some(table) = &factories {
        check_strategy(table, &mut diagnostics);
    }
    let factories = factories.unwrap_or_else(|| StrategyConfig::default().factories);

    // 3. Handler entries, as the strategy will see them
    if let Some(channels) = value.get("channels").and_then(Value::as_object) {
        for (name, section) in channels {
            check_channel(name, section, &factories, &mut diagnostics);
        }
    }

    // 4. Type check: attempt full deserialization
    match serde_json::from_value::<LoglaneConfig>(value.clone()) {
        Ok(config) => check_default_channel(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        )),
    }

    diagnostics
}

/// Walk the value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match (value, schema) {
        (Value::Object(table), KnownKeys::Struct(fields)) => {
            let known_keys: Vec<&str> = fields.keys().copied().collect();
            for (key, child_value) in table {
                let path = join_path(prefix, key);
                if let Some(child_schema) = fields.get(key.as_str()) {
                    check_unknown_fields(child_value, child_schema, &path, diagnostics);
                } else {
                    let base = if prefix.is_empty() {
                        "unknown field at top level"
                    } else {
                        "unknown field"
                    };
                    diagnostics.push(Diagnostic::new(
                        Severity::Error,
                        "unknown-field",
                        path,
                        with_suggestion(base, suggest(key, &known_keys, 3)),
                    ));
                }
            }
        },
        (Value::Object(table), KnownKeys::Map(value_schema)) => {
            for (key, child_value) in table {
                let path = join_path(prefix, key);
                check_unknown_fields(child_value, value_schema, &path, diagnostics);
            }
        },
        (Value::Array(arr), KnownKeys::Array(item_schema)) => {
            for (i, item) in arr.iter().enumerate() {
                let path = format!("{prefix}[{i}]");
                check_unknown_fields(item, item_schema, &path, diagnostics);
            }
        },
        // Leaf or type mismatch: type errors are caught later
        _ => {},
    }
}

/// The `factories` table declared in the document, if any.
fn strategy_factories(value: &Value) -> Option<IndexMap<String, String>> {
    let factories = value
        .get("strategy")
        .or_else(|| value.get("strategyConfig"))?
        .get("factories")?
        .as_object()?;
    Some(
        factories
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|id| (k.clone(), id.to_string())))
            .collect(),
    )
}

fn check_strategy(factories: &IndexMap<String, String>, diagnostics: &mut Vec<Diagnostic>) {
    let catalog = FactoryCatalog::builtin();
    let ids = catalog.ids();
    for (handler_type, id) in factories {
        if catalog.contains(id) {
            continue;
        }
        let base = format!(
            "implementation '{id}' is not built in; opening a channel of this type fails unless \
             the host registers it"
        );
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "strategy",
            format!("strategy.factories.{handler_type}"),
            with_suggestion(&base, suggest(id, &ids, 2)),
        ));
    }
}

fn check_channel(
    name: &str,
    section: &Value,
    factories: &IndexMap<String, String>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let prefix = format!("channels.{name}");
    let Some(entries) = section.get("handler").and_then(Value::as_array) else {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "channel",
            prefix,
            "channel declares no handlers; records sent to it are dropped",
        ));
        return;
    };
    if entries.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "channel",
            format!("{prefix}.handler"),
            "channel declares no handlers; records sent to it are dropped",
        ));
    }

    for (i, entry) in entries.iter().enumerate() {
        let path = format!("{prefix}.handler[{i}]");
        match entry.as_object() {
            Some(params) => check_handler_entry(params, &path, factories, diagnostics),
            None => diagnostics.push(Diagnostic::new(
                Severity::Error,
                "handler",
                path,
                "handler entry must be a table of parameters",
            )),
        }
    }
}

/// Keys shared by every handler entry.
const COMMON_HANDLER_KEYS: &[&str] = &["type", "level", "bubble"];

/// Type-specific keys of the built-in implementations. `None` for ids a host
/// registers itself, whose parameters are unknown here.
fn handler_keys(id: &str) -> Option<&'static [&'static str]> {
    match id {
        "amqp" => Some(&["exchange_name", "exchangeName"]),
        "stream" => Some(&["stream"]),
        "memory" => Some(&[]),
        _ => None,
    }
}

fn check_handler_keys(
    params: &Map<String, Value>,
    id: &str,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(specific) = handler_keys(id) else {
        return;
    };
    let known: Vec<&str> = COMMON_HANDLER_KEYS.iter().chain(specific).copied().collect();
    for key in params.keys() {
        if known.contains(&key.as_str()) {
            continue;
        }
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "unknown-field",
            format!("{path}.{key}"),
            with_suggestion(
                &format!("unknown parameter for '{id}' handlers"),
                suggest(key, &known, 3),
            ),
        ));
    }
}

fn check_handler_entry(
    params: &Map<String, Value>,
    path: &str,
    factories: &IndexMap<String, String>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let type_path = format!("{path}.type");
    let resolved = match params.get("type") {
        None => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "handler",
                type_path,
                "parameter 'type' not found",
            ));
            None
        },
        Some(Value::String(handler_type)) => match factories.get(handler_type) {
            Some(id) => Some(id.as_str()),
            None => {
                let known: Vec<&str> = factories.keys().map(String::as_str).collect();
                let base = format!("type '{handler_type}' not found in handler factory");
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-type",
                    type_path,
                    with_suggestion(&base, suggest(handler_type, &known, 3)),
                ));
                None
            },
        },
        Some(other) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "handler",
                type_path,
                format!("type must be a string, got {other}"),
            ));
            None
        },
    };

    if let Some(level) = params.get("level")
        && let Err(e) = Level::normalize(level)
    {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "level",
            format!("{path}.level"),
            e.to_string(),
        ));
    }

    if let Some(bubble) = params.get("bubble")
        && !bubble.is_boolean()
    {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "handler",
            format!("{path}.bubble"),
            format!("bubble must be a boolean, got {bubble}"),
        ));
    }

    if let Some(id) = resolved {
        check_handler_keys(params, id, path, diagnostics);
    }

    if resolved == Some("stream") {
        let has_stream = params
            .get("stream")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !has_stream {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "handler",
                format!("{path}.stream"),
                "stream handlers need a non-empty 'stream' path or php://stdout / php://stderr",
            ));
        } else if let Some(Value::String(stream)) = params.get("stream")
            && let Some(name) = stream.trim().strip_prefix("php://")
            && !matches!(name, "stdout" | "stderr" | "output")
        {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "handler",
                format!("{path}.stream"),
                format!("unsupported stream '{stream}', use one of php://stdout, php://stderr"),
            ));
        }
    }
}

fn check_default_channel(config: &LoglaneConfig, diagnostics: &mut Vec<Diagnostic>) {
    if config.default_channel_name.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "channel",
            "default_channel_name",
            "default channel name can not be empty",
        ));
        return;
    }
    if !config.channels.is_empty() && !config.channels.contains_key(&config.default_channel_name)
    {
        let names: Vec<&str> = config.channels.keys().map(String::as_str).collect();
        let base = format!(
            "default channel '{}' is not declared; lookups without a name will fail",
            config.default_channel_name
        );
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "channel",
            "default_channel_name",
            with_suggestion(&base, suggest(&config.default_channel_name, &names, 2)),
        ));
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn find<'a>(result: &'a ValidationResult, category: &str, path: &str) -> Option<&'a Diagnostic> {
        result
            .diagnostics
            .iter()
            .find(|d| d.category == category && d.path == path)
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("amqp", "amqp"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("stream", "steam"), 1);
        assert_eq!(levenshtein("handler", "handlr"), 1);
    }

    #[test]
    fn valid_config_has_no_diagnostics() {
        let result = validate_toml_str(
            r#"
            default_channel_name = "main"

            [[channels.main.handler]]
            type = "memory"
            level = "info"
            bubble = false

            [[channels.main.handler]]
            type = "stream"
            stream = "php://stderr"
            level = 300
            "#,
        );
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn syntax_error_is_reported() {
        let result = validate_toml_str("channels = [");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn unknown_top_level_key_with_suggestion() {
        let result = validate_toml_str("chanels = {}\n");
        let d = find(&result, "unknown-field", "chanels").unwrap();
        assert!(d.message.contains("did you mean \"channels\""), "{}", d.message);
    }

    #[test]
    fn unknown_channel_key() {
        let result = validate_toml_str("[channels.app]\nhandlers = []\n");
        let d = find(&result, "unknown-field", "channels.app.handlers").unwrap();
        assert!(d.message.contains("handler"));
    }

    #[test]
    fn missing_type() {
        let result = validate_toml_str("[[channels.app.handler]]\nlevel = \"info\"\n");
        let d = find(&result, "handler", "channels.app.handler[0].type").unwrap();
        assert_eq!(d.severity, Severity::Error);
        assert!(d.message.contains("'type'"));
    }

    #[test]
    fn unknown_type_with_suggestion() {
        let result = validate_toml_str("[[channels.app.handler]]\ntype = \"amqpp\"\n");
        let d = find(&result, "unknown-type", "channels.app.handler[0].type").unwrap();
        assert!(d.message.contains("did you mean \"amqp\""), "{}", d.message);
    }

    #[test]
    fn declared_strategy_defines_known_types() {
        let result = validate_toml_str(
            r#"
            [strategy.factories]
            queue = "amqp"

            [[channels.app.handler]]
            type = "memory"

            [[channels.app.handler]]
            type = "queue"
            "#,
        );
        assert!(find(&result, "unknown-type", "channels.app.handler[0].type").is_some());
        assert!(find(&result, "unknown-type", "channels.app.handler[1].type").is_none());
    }

    #[test]
    fn strategy_pointing_at_missing_implementation_warns() {
        let result = validate_toml_str("[strategy.factories]\nkafka = \"kafka\"\n");
        let d = find(&result, "strategy", "strategy.factories.kafka").unwrap();
        assert_eq!(d.severity, Severity::Warning);
        assert!(!result.has_errors());
    }

    #[test]
    fn undefined_level() {
        let result = validate_toml_str(
            "[[channels.app.handler]]\ntype = \"memory\"\nlevel = \"loud\"\n",
        );
        let d = find(&result, "level", "channels.app.handler[0].level").unwrap();
        assert!(d.message.contains("loud"));
    }

    #[test]
    fn non_boolean_bubble() {
        let result = validate_toml_str(
            "[[channels.app.handler]]\ntype = \"memory\"\nbubble = \"yes\"\n",
        );
        assert!(find(&result, "handler", "channels.app.handler[0].bubble").is_some());
    }

    #[test]
    fn misspelled_handler_keys_are_reported() {
        let result = validate_toml_str(
            "[[channels.main.handler]]\ntype = \"amqp\"\nexchangeNmae = \"audit\"\nbubbel = false\n",
        );
        let d = find(&result, "unknown-field", "channels.main.handler[0].exchangeNmae").unwrap();
        assert!(d.message.contains("did you mean \"exchangeName\""), "{}", d.message);
        let d = find(&result, "unknown-field", "channels.main.handler[0].bubbel").unwrap();
        assert!(d.message.contains("did you mean \"bubble\""), "{}", d.message);
        assert_eq!(result.count(Severity::Error), 2);
    }

    #[test]
    fn keys_of_other_types_are_unknown() {
        let result = validate_toml_str(
            "[[channels.main.handler]]\ntype = \"memory\"\nstream = \"php://stderr\"\n",
        );
        assert!(find(&result, "unknown-field", "channels.main.handler[0].stream").is_some());
    }

    #[test]
    fn host_registered_types_accept_any_keys() {
        let result = validate_toml_str(
            "[strategy.factories]\nkafka = \"kafka\"\n\n[[channels.main.handler]]\ntype = \"kafka\"\nbrokers = \"localhost\"\n",
        );
        assert!(
            !result
                .diagnostics
                .iter()
                .any(|d| d.category == "unknown-field")
        );
    }

    #[test]
    fn stream_without_target() {
        let result = validate_toml_str("[[channels.app.handler]]\ntype = \"stream\"\n");
        assert!(find(&result, "handler", "channels.app.handler[0].stream").is_some());

        let result =
            validate_toml_str("[[channels.app.handler]]\ntype = \"stream\"\nstream = \"php://memory\"\n");
        let d = find(&result, "handler", "channels.app.handler[0].stream").unwrap();
        assert!(d.message.contains("php://memory"), "{}", d.message);
    }

    #[test]
    fn non_table_handler_entry() {
        let diagnostics = validate_value(&json!({
            "channels": { "app": { "handler": ["amqp"] } }
        }));
        assert!(
            diagnostics
                .iter()
                .any(|d| d.category == "handler" && d.path == "channels.app.handler[0]")
        );
    }

    #[test]
    fn empty_channel_warns() {
        let result = validate_toml_str("[channels.main]\nhandler = []\n");
        let d = find(&result, "channel", "channels.main.handler").unwrap();
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn empty_default_channel_name_is_error() {
        let result = validate_toml_str("default_channel_name = \"\"\n");
        assert!(find(&result, "channel", "default_channel_name").is_some());
        assert!(result.has_errors());
    }

    #[test]
    fn undeclared_default_channel_warns() {
        let result = validate_toml_str(
            "default_channel_name = \"mian\"\n[[channels.main.handler]]\ntype = \"memory\"\n",
        );
        let d = find(&result, "channel", "default_channel_name").unwrap();
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.message.contains("did you mean \"main\""));
    }

    #[test]
    fn wrong_value_type_is_type_error() {
        let result = validate_toml_str("default_channel_name = 5\n");
        assert!(result.diagnostics.iter().any(|d| d.category == "type-error"));
    }

    #[test]
    fn validates_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loglane.yaml");
        std::fs::write(
            &path,
            "channels:\n  app:\n    handler:\n      - type: strem\n",
        )
        .unwrap();
        let result = validate(Some(&path));
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
        assert!(find(&result, "unknown-type", "channels.app.handler[0].type").is_some());
    }

    #[test]
    fn unreadable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate(Some(&dir.path().join("missing.toml")));
        assert!(result.has_errors());
        assert_eq!(result.count(Severity::Error), 1);
    }
}
