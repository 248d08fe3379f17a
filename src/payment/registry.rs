//! Method handler registry.
//!
//! Adapters are constructed eagerly from the validated configuration, so
//! configuration defects surface at startup instead of at request time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ConfigError, PaymentConfig};
use crate::payment::handler::MethodHandler;
use crate::payment::paypal::PayPalHandler;
use crate::payment::wirecard::WirecardHandler;
use crate::payment::Method;
use crate::ports::{CallbackUrlBuilder, CallbackVerifier, ReconciliationQueue, TransactionStore};

pub struct HandlerRegistry {
    handlers: HashMap<Method, Arc<dyn MethodHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn from_config(
        config: &PaymentConfig,
        store: Arc<dyn TransactionStore>,
        url_builder: Arc<dyn CallbackUrlBuilder>,
        queue: Arc<dyn ReconciliationQueue>,
        verifier: Arc<dyn CallbackVerifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut handlers: HashMap<Method, Arc<dyn MethodHandler>> = HashMap::new();
        handlers.insert(
            Method::PayPal,
            Arc::new(PayPalHandler::new(
                &config.paypal,
                Arc::clone(&url_builder),
                Arc::clone(&queue),
            )?),
        );
        handlers.insert(
            Method::Wirecard,
            Arc::new(WirecardHandler::new(
                &config.wirecard,
                store,
                url_builder,
                queue,
                verifier,
            )?),
        );

        Ok(Self { handlers })
    }

    pub fn get(&self, method: Method) -> Option<Arc<dyn MethodHandler>> {
        self.handlers.get(&method).cloned()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.handlers.keys().copied().collect()
    }
}
