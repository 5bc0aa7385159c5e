//! Named logging channels.
//!
//! The [`ChannelRegistry`] turns declarative channel configuration into
//! [`Logger`](loglane_logging::Logger) instances, building each handler
//! through the factory strategy, and owns them by name.

pub mod config;
pub mod registry;

pub use {
    config::{ChannelConfig, HandlerEntry},
    registry::ChannelRegistry,
};
