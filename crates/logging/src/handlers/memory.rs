use std::{
    any::Any,
    sync::{Arc, Mutex},
};

use loglane_common::Result;

use crate::{Handler, HandlerOptions, Level, Record};

/// Keeps handled records in memory. Clones share the same buffer.
#[derive(Clone)]
pub struct MemoryHandler {
    records: Arc<Mutex<Vec<Record>>>,
    options: HandlerOptions,
}

impl Default for MemoryHandler {
    fn default() -> Self {
        Self::new(Level::Debug, true)
    }
}

impl MemoryHandler {
    pub fn new(level: Level, bubble: bool) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            options: HandlerOptions::new(level, bubble),
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn has_record(&self, level: Level, message: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|r| r.level == level && r.message == message)
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Handler for MemoryHandler {
    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut HandlerOptions {
        &mut self.options
    }

    fn write(&self, record: &Record, _formatted: &str) -> Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
