use std::{any::Any, sync::Arc};

use loglane_common::{Error, Result};

use crate::{
    AmqpChannel, Formatter, Handler, HandlerOptions, JsonFormatter, Level, PublishProperties,
    Record,
};

/// Publishes JSON-formatted records to an AMQP exchange.
///
/// The routing key is `"{level}.{channel}"` in lower case, e.g.
/// `warning.app`, so consumers can bind on severity or channel.
pub struct AmqpHandler {
    channel: Arc<dyn AmqpChannel>,
    exchange_name: String,
    properties: PublishProperties,
    options: HandlerOptions,
}

impl AmqpHandler {
    pub fn new(
        channel: Arc<dyn AmqpChannel>,
        exchange_name: impl Into<String>,
        level: Level,
        bubble: bool,
    ) -> Self {
        Self {
            channel,
            exchange_name: exchange_name.into(),
            properties: PublishProperties::default(),
            options: HandlerOptions::new(level, bubble),
        }
    }

    pub fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    pub fn routing_key(record: &Record) -> String {
        format!("{}.{}", record.level.name(), record.channel).to_lowercase()
    }
}

impl Handler for AmqpHandler {
    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut HandlerOptions {
        &mut self.options
    }

    fn default_formatter(&self) -> Arc<dyn Formatter> {
        Arc::new(JsonFormatter::new(false))
    }

    fn write(&self, record: &Record, formatted: &str) -> Result<()> {
        let routing_key = Self::routing_key(record);
        self.channel
            .basic_publish(
                &self.exchange_name,
                &routing_key,
                formatted.as_bytes(),
                &self.properties,
            )
            .map_err(|e| {
                Error::transport(
                    format!("publish to '{}' as '{routing_key}'", self.exchange_name),
                    e,
                )
            })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
