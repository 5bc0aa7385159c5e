use crate::Record;

/// Enriches a record before it reaches the handlers.
///
/// Processors are opaque to the channel registry: they are stored and run in
/// the order they were configured.
pub trait Processor: Send + Sync {
    fn process(&self, record: Record) -> Record;
}

impl<F> Processor for F
where
    F: Fn(Record) -> Record + Send + Sync,
{
    fn process(&self, record: Record) -> Record {
        self(record)
    }
}
