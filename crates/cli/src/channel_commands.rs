use std::{path::Path, sync::Arc};

use {
    anyhow::{Context, Result},
    clap::Args,
    loglane_channels::ChannelRegistry,
    loglane_config::LoglaneConfig,
    loglane_logging::{Level, MemoryBroker, PublishedMessage},
    serde_json::{Map, Value},
    tracing::info,
};

#[derive(Args)]
pub struct EmitArgs {
    /// Channel to log on (defaults to the configured default channel).
    #[arg(long)]
    channel: Option<String>,
    /// Level name or numeric value.
    #[arg(long, default_value = "info")]
    level: Level,
    /// Context as a JSON object.
    #[arg(long)]
    context: Option<String>,
    message: String,
}

fn load(path: Option<&Path>) -> Result<LoglaneConfig> {
    match path {
        Some(path) => loglane_config::load_config(path),
        None => Ok(loglane_config::discover_and_load()),
    }
}

/// Registry with every declared channel open. AMQP handlers publish to an
/// in-memory broker.
fn open(path: Option<&Path>) -> Result<(ChannelRegistry, MemoryBroker)> {
    let config = load(path)?;
    let broker = MemoryBroker::new();
    let mut registry =
        ChannelRegistry::from_config(&config).with_connection_provider(Arc::new(broker.clone()));
    registry
        .initialize()
        .context("failed to open declared channels")?;
    Ok((registry, broker))
}

pub fn list(path: Option<&Path>) -> Result<()> {
    let (registry, _) = open(path)?;
    let default = registry.default_channel_name().ok();

    let names = registry.channel_names();
    if names.is_empty() {
        println!("No channels declared.");
        return Ok(());
    }
    for name in names {
        let logger = registry.get_logger(Some(name))?;
        let marker = if Some(name) == default {
            " (default)"
        } else {
            ""
        };
        println!("{name}{marker}: {} handler(s)", logger.handlers().len());
    }
    Ok(())
}

pub fn emit(path: Option<&Path>, args: EmitArgs) -> Result<()> {
    let context = parse_context(args.context.as_deref())?;
    let (registry, broker) = open(path)?;

    let logger = registry.get_logger(args.channel.as_deref())?;
    let handled = logger.log(args.level, args.message, context)?;
    info!(channel = logger.name(), level = %args.level, handled, "record emitted");

    if !handled {
        println!("No handler on '{}' accepts {}.", logger.name(), args.level);
    }
    for message in broker.messages() {
        println!("{}", describe(&message));
    }
    Ok(())
}

fn parse_context(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    match serde_json::from_str(raw).context("--context is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--context must be a JSON object, got {other}"),
    }
}

fn describe(message: &PublishedMessage) -> String {
    format!(
        "published to '{}' with routing key '{}': {}",
        message.exchange,
        message.routing_key,
        message.payload_str().trim_end()
    )
}
