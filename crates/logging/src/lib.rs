//! Minimal structured logging model consumed by the channel registry.
//!
//! A [`Logger`] is a named channel holding an ordered list of [`Handler`]s and
//! [`Processor`]s. Records flow through processors first, then through the
//! handlers in order until one of them stops bubbling.

pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod logger;
pub mod processor;
pub mod record;
pub mod transport;

pub use {
    formatter::{Formatter, JsonFormatter, LineFormatter},
    handler::{Handler, HandlerOptions},
    handlers::{AmqpHandler, MemoryHandler, StreamHandler, StreamTarget},
    level::Level,
    logger::Logger,
    processor::Processor,
    record::Record,
    transport::{AmqpChannel, ConnectionProvider, MemoryBroker, PublishProperties, PublishedMessage},
};
