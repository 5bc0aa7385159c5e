use std::error::Error as StdError;

use thiserror::Error;

/// Typed failures raised while resolving handlers and managing channels.
///
/// Every variant is fatal to the operation that raised it; nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration key is missing.
    #[error("parameter '{parameter}' not found in handler configuration")]
    ParameterNotFound { parameter: String },

    /// A handler entry is malformed or names a type that is not registered.
    #[error("{message}")]
    HandlerNotFound { message: String },

    /// A registered handler type has no constructor behind it.
    #[error("type '{handler_type}' not implemented")]
    NotImplemented { handler_type: String },

    /// No logger is registered under the requested channel name.
    #[error("logger instance '{name}' not found")]
    LoggerNotFound { name: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A configuration key is present but its value is unusable.
    #[error("invalid value for parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Wrapped failure from a transport collaborator.
    #[error("transport failed: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn parameter_not_found(parameter: impl Into<String>) -> Self {
        Self::ParameterNotFound {
            parameter: parameter.into(),
        }
    }

    #[must_use]
    pub fn handler_not_found(message: impl std::fmt::Display) -> Self {
        Self::HandlerNotFound {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn not_implemented(handler_type: impl Into<String>) -> Self {
        Self::NotImplemented {
            handler_type: handler_type.into(),
        }
    }

    #[must_use]
    pub fn logger_not_found(name: impl Into<String>) -> Self {
        Self::LoggerNotFound { name: name.into() }
    }

    #[must_use]
    pub fn invalid_configuration(message: impl std::fmt::Display) -> Self {
        Self::InvalidConfiguration {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
