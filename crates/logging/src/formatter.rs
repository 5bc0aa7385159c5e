use {
    loglane_common::Result,
    serde_json::{Map, Value, json},
};

use crate::Record;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Turns a record into the text a handler delivers.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record) -> Result<String>;
}

/// Human-readable single-line output:
/// `[datetime] channel.LEVEL: message context extra`.
#[derive(Debug, Clone)]
pub struct LineFormatter {
    date_format: String,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.into(),
        }
    }
}

impl LineFormatter {
    /// Use a custom `chrono` strftime pattern for the timestamp.
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }
}

fn render_map(map: &Map<String, Value>) -> Result<String> {
    if map.is_empty() {
        return Ok("[]".into());
    }
    Ok(serde_json::to_string(map)?)
}

impl Formatter for LineFormatter {
    fn format(&self, record: &Record) -> Result<String> {
        Ok(format!(
            "[{}] {}.{}: {} {} {}\n",
            record.datetime.format(&self.date_format),
            record.channel,
            record.level.name(),
            record.message,
            render_map(&record.context)?,
            render_map(&record.extra)?,
        ))
    }
}

/// One JSON object per record.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    append_newline: bool,
}

impl JsonFormatter {
    pub fn new(append_newline: bool) -> Self {
        Self { append_newline }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Result<String> {
        let value = json!({
            "message": record.message,
            "context": record.context,
            "level": record.level.value(),
            "level_name": record.level.name(),
            "channel": record.channel,
            "datetime": record.datetime.to_rfc3339(),
            "extra": record.extra,
        });
        let mut out = serde_json::to_string(&value)?;
        if self.append_newline {
            out.push('\n');
        }
        Ok(out)
    }
}
