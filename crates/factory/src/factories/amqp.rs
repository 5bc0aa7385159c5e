use std::sync::Arc;

use {
    loglane_common::{Error, Result},
    loglane_logging::{AmqpChannel, AmqpHandler, ConnectionProvider, Handler, Level},
    tracing::debug,
};

use crate::{
    FactoryContext, HandlerConfig, HandlerFactory,
    config::EXCHANGE_KEY,
};

const DEFAULT_EXCHANGE_NAME: &str = "logs";

/// Builds an [`AmqpHandler`].
///
/// Uses the channel attached under `exchange` when present, otherwise opens
/// one through the injected [`ConnectionProvider`].
pub struct AmqpFactory {
    config: HandlerConfig,
    connections: Option<Arc<dyn ConnectionProvider>>,
}

impl AmqpFactory {
    pub fn new(config: HandlerConfig, context: &FactoryContext) -> Result<Self> {
        let factory = Self {
            config,
            connections: context.connection_provider().cloned(),
        };
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
        if self.config.has_resource(EXCHANGE_KEY) {
            if self
                .config
                .resource::<Arc<dyn AmqpChannel>>(EXCHANGE_KEY)
                .is_none()
            {
                return Err(Error::invalid_parameter(
                    EXCHANGE_KEY,
                    "expected an AMQP channel",
                ));
            }
        } else if self.connections.is_none() {
            return Err(Error::parameter_not_found(EXCHANGE_KEY));
        }
        Ok(())
    }

    fn channel(&self) -> Result<Arc<dyn AmqpChannel>> {
        if let Some(channel) = self.config.resource::<Arc<dyn AmqpChannel>>(EXCHANGE_KEY) {
            return Ok(channel);
        }
        match &self.connections {
            Some(provider) => provider.channel(),
            None => Err(Error::parameter_not_found(EXCHANGE_KEY)),
        }
    }
}

impl HandlerFactory for AmqpFactory {
    fn create_handler(&self) -> Result<Box<dyn Handler>> {
        let exchange_name = self
            .config
            .str_or(&["exchange_name", "exchangeName"], DEFAULT_EXCHANGE_NAME)?;
        let level = self.config.level_or(Level::Debug)?;
        let bubble = self.config.bool_or("bubble", true)?;
        let channel = self.channel()?;

        debug!(exchange = exchange_name, %level, bubble, "creating amqp handler");
        Ok(Box::new(AmqpHandler::new(
            channel,
            exchange_name,
            level,
            bubble,
        )))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, loglane_logging::MemoryBroker};

    fn amqp(handler: &dyn Handler) -> &AmqpHandler {
        handler.as_any().downcast_ref::<AmqpHandler>().unwrap()
    }

    #[test]
    fn applies_defaults() {
        let broker = MemoryBroker::new();
        let context = FactoryContext::new().with_connection_provider(Arc::new(broker.clone()));
        let factory = AmqpFactory::new(HandlerConfig::new("amqp"), &context).unwrap();

        let handler = factory.create_handler().unwrap();
        assert_eq!(amqp(handler.as_ref()).exchange_name(), "logs");
        assert_eq!(handler.level(), Level::Debug);
        assert!(handler.bubble());
        assert_eq!(broker.channels_opened(), 1);
    }

    #[test]
    fn prefers_supplied_exchange_over_provider() {
        let provider = MemoryBroker::new();
        let supplied = MemoryBroker::new();
        let context = FactoryContext::new().with_connection_provider(Arc::new(provider.clone()));
        let config = HandlerConfig::new("amqp")
            .with_exchange(Arc::new(supplied.clone()))
            .with_param("exchangeName", "audit")
            .with_param("bubble", false);

        let handler = AmqpFactory::new(config, &context)
            .unwrap()
            .create_handler()
            .unwrap();
        assert_eq!(amqp(handler.as_ref()).exchange_name(), "audit");
        assert!(!handler.bubble());
        assert_eq!(provider.channels_opened(), 0);
    }

    #[test]
    fn without_exchange_or_provider_is_parameter_not_found() {
        let err = AmqpFactory::new(HandlerConfig::new("amqp"), &FactoryContext::new())
            .err()
            .unwrap();
        assert!(matches!(err, Error::ParameterNotFound { ref parameter } if parameter == "exchange"));
    }

    #[test]
    fn exchange_of_the_wrong_type_is_rejected() {
        let provider = MemoryBroker::new();
        let config =
            HandlerConfig::new("amqp").with_resource(EXCHANGE_KEY, Arc::new(MemoryBroker::new()));

        let context = FactoryContext::new().with_connection_provider(Arc::new(provider.clone()));
        let err = AmqpFactory::new(config.clone(), &context).err().unwrap();
        assert!(matches!(err, Error::InvalidParameter { ref parameter, .. } if parameter == "exchange"));
        assert_eq!(provider.channels_opened(), 0);

        let err = AmqpFactory::new(config, &FactoryContext::new()).err().unwrap();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }
}
