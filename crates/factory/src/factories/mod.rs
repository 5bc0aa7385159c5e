//! Built-in factory variants, one per handler type.

mod amqp;
mod memory;
mod stream;

pub use {amqp::AmqpFactory, memory::MemoryFactory, stream::StreamFactory};
