//! Concrete handlers.

mod amqp;
mod memory;
mod stream;

pub use {
    amqp::AmqpHandler,
    memory::MemoryHandler,
    stream::{StreamHandler, StreamTarget},
};
