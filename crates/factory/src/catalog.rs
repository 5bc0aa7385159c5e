use std::collections::HashMap;

use crate::{AmqpFactory, FactoryConstructor, MemoryFactory, StreamFactory};

/// Implementation ids shipped with the crate, with their constructors.
pub const BUILTIN_FACTORIES: [(&str, FactoryConstructor); 3] = [
    ("amqp", AmqpFactory::construct),
    ("memory", MemoryFactory::construct),
    ("stream", StreamFactory::construct),
];

/// Table of factory constructors keyed by implementation id.
///
/// The strategy's registration table maps handler type names to these ids;
/// an id missing from the catalog means the registration points at nothing.
#[derive(Clone)]
pub struct FactoryCatalog {
    constructors: HashMap<String, FactoryConstructor>,
}

impl Default for FactoryCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FactoryCatalog {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (id, constructor) in BUILTIN_FACTORIES {
            catalog.register(id, constructor);
        }
        catalog
    }

    pub fn register(&mut self, id: impl Into<String>, constructor: FactoryConstructor) -> &mut Self {
        self.constructors.insert(id.into(), constructor);
        self
    }

    pub fn get(&self, id: &str) -> Option<FactoryConstructor> {
        self.constructors.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
