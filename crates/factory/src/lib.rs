//! Handler factories and the strategy that resolves them by type name.
//!
//! A handler configuration is a map with a required `type` key. The
//! [`FactoryStrategy`] looks the type up in its registration table, resolves
//! the registered implementation id through a [`FactoryCatalog`] and builds a
//! [`HandlerFactory`], which in turn constructs exactly one handler.

pub mod catalog;
pub mod config;
pub mod factories;
pub mod factory;
pub mod strategy;

pub use {
    catalog::FactoryCatalog,
    config::HandlerConfig,
    factories::{AmqpFactory, MemoryFactory, StreamFactory},
    factory::{FactoryConstructor, FactoryContext, HandlerFactory},
    strategy::{FactoryStrategy, StrategyConfig, StrategyOverrides},
};
