use std::{fmt, str::FromStr};

use {loglane_common::Error, serde_json::Value};

/// Log severity, ordered from least to most severe.
///
/// The discriminants are the canonical numeric values used in configuration
/// files and serialized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Level {
    Debug = 100,
    Info = 200,
    Notice = 250,
    Warning = 300,
    Error = 400,
    Critical = 500,
    Alert = 550,
    Emergency = 600,
}

impl Level {
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    #[must_use]
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Upper-case level name, e.g. `WARNING`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Alert => "ALERT",
            Self::Emergency => "EMERGENCY",
        }
    }

    #[must_use]
    pub fn from_value(value: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|l| u64::from(l.value()) == value)
    }

    /// Normalize a configured level into its canonical form.
    ///
    /// Accepts level names in any case (`"warning"`, `"WARNING"`), numeric
    /// strings (`"300"`) and integers, as long as they denote a defined level.
    pub fn normalize(value: &Value) -> loglane_common::Result<Self> {
        match value {
            Value::String(s) => s.parse(),
            Value::Number(n) => n
                .as_u64()
                .and_then(Self::from_value)
                .ok_or_else(|| undefined(&n.to_string())),
            other => Err(undefined(&other.to_string())),
        }
    }
}

fn undefined(raw: &str) -> Error {
    let known: Vec<&str> = Level::ALL.iter().map(|l| l.name()).collect();
    Error::invalid_parameter(
        "level",
        format!("level \"{raw}\" is not defined, use one of: {}", known.join(", ")),
    )
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u64>() {
            return Self::from_value(n).ok_or_else(|| undefined(s));
        }
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| undefined(s))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    #[rstest]
    #[case(json!("debug"), Level::Debug)]
    #[case(json!("INFO"), Level::Info)]
    #[case(json!("Notice"), Level::Notice)]
    #[case(json!("warning"), Level::Warning)]
    #[case(json!("300"), Level::Warning)]
    #[case(json!(400), Level::Error)]
    #[case(json!("critical"), Level::Critical)]
    #[case(json!(550), Level::Alert)]
    #[case(json!("emergency"), Level::Emergency)]
    fn normalizes_names_and_values(#[case] raw: Value, #[case] expected: Level) {
        assert_eq!(Level::normalize(&raw).unwrap(), expected);
    }

    #[rstest]
    #[case(json!("verbose"))]
    #[case(json!(301))]
    #[case(json!(-1))]
    #[case(json!(true))]
    #[case(json!(null))]
    fn rejects_undefined_levels(#[case] raw: Value) {
        let err = Level::normalize(&raw).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref parameter, .. } if parameter == "level"));
    }

    #[test]
    fn ordering_follows_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Alert < Level::Emergency);
        assert_eq!(Level::Warning.value(), 300);
    }
}
