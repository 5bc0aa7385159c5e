//! Shared error definitions used across all loglane crates.

pub mod error;

pub use error::{Error, Result};
