use {
    loglane_common::{Error, Result},
    loglane_logging::{Handler, Level, StreamHandler, StreamTarget},
    serde_json::Value,
    tracing::debug,
};

use crate::{FactoryContext, HandlerConfig, HandlerFactory};

const STREAM_KEY: &str = "stream";
/// Targets accepted after a `php://` prefix.
const PHP_STREAMS: [&str; 3] = ["stdout", "stderr", "output"];

/// Builds a [`StreamHandler`] writing to stdout, stderr or a file.
pub struct StreamFactory {
    config: HandlerConfig,
}

impl StreamFactory {
    pub fn new(config: HandlerConfig, _context: &FactoryContext) -> Result<Self> {
        let factory = Self { config };
        factory.check_parameters()?;
        Ok(factory)
    }

    pub fn construct(
        config: HandlerConfig,
        context: &FactoryContext,
    ) -> Result<Box<dyn HandlerFactory>> {
        Ok(Box::new(Self::new(config, context)?))
    }

    fn check_parameters(&self) -> Result<()> {
        match self.config.require(STREAM_KEY)? {
            Value::String(s) if !s.trim().is_empty() => match s.trim().strip_prefix("php://") {
                Some(name) if !PHP_STREAMS.contains(&name) => Err(Error::invalid_parameter(
                    STREAM_KEY,
                    format!("unsupported stream '{s}', use one of php://stdout, php://stderr"),
                )),
                _ => Ok(()),
            },
            other => Err(Error::invalid_parameter(
                STREAM_KEY,
                format!("expected a non-empty string, got {other}"),
            )),
        }
    }
}

impl HandlerFactory for StreamFactory {
    fn create_handler(&self) -> Result<Box<dyn Handler>> {
        let target = StreamTarget::parse(self.config.str_or(&[STREAM_KEY], "")?);
        let level = self.config.level_or(Level::Debug)?;
        let bubble = self.config.bool_or("bubble", true)?;

        debug!(?target, %level, bubble, "creating stream handler");
        Ok(Box::new(StreamHandler::new(target, level, bubble)?))
    }
}
