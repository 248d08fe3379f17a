//! Payment gateway integration layer.
//!
//! A provider-agnostic method handler contract, one protocol adapter per
//! payment provider and the transaction status state machine that both
//! initiation and asynchronous callback handling drive. Routing,
//! persistence and mail are collaborators behind the ports module.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod payment;
pub mod ports;

pub use config::PaymentConfig;
pub use domain::{Transaction, TransactionStatus};
pub use payment::{CallbackType, HandlerRegistry, Method, MethodHandler};
