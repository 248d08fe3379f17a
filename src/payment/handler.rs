//! Provider-agnostic method handler contract.
//!
//! Both operations resolve every ordinary failure to a result value:
//! `init` returns `success: false` with diagnostics, `handle_callback`
//! returns the default `Error` status. Neither signals failure to its
//! caller through an `Err` or a panic.

use async_trait::async_trait;
use std::collections::HashMap;
use url::Url;

use crate::domain::{Transaction, TransactionStatus};
use crate::payment::CallbackType;
use crate::ports::StoreError;

/// Ambient request context, used only for callback URL construction.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub base_url: Url,
}

impl RequestContext {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

/// Immutable input to `MethodHandler::init`.
#[derive(Debug, Clone)]
pub struct InitData {
    pub transaction: Transaction,
    pub context: RequestContext,
}

/// One structured diagnostic carried by a failed `InitResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&StoreError> for ErrorDetail {
    fn from(error: &StoreError) -> Self {
        let code = match error {
            StoreError::NotFound(_) => "store.not_found",
            StoreError::InvalidTransition { .. } => "store.invalid_transition",
            StoreError::Backend(_) => "store.backend",
        };
        ErrorDetail::new(code, error.to_string())
    }
}

/// Outcome of a payment initiation. Success carries the provider redirect
/// URL, failure carries at least one diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitResult {
    pub success: bool,
    pub redirect_url: Option<String>,
    pub errors: Vec<ErrorDetail>,
}

impl InitResult {
    pub fn succeeded(redirect_url: impl Into<String>) -> Self {
        Self {
            success: true,
            redirect_url: Some(redirect_url.into()),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<ErrorDetail>) -> Self {
        Self {
            success: false,
            redirect_url: None,
            errors,
        }
    }
}

/// Inbound request payload of a provider callback, as handed over by the
/// excluded routing layer.
#[derive(Debug, Clone, Default)]
pub struct CallbackPayload {
    query: HashMap<String, String>,
    form: HashMap<String, String>,
}

impl CallbackPayload {
    pub fn new(query: HashMap<String, String>, form: HashMap<String, String>) -> Self {
        Self { query, form }
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn form(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_form(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }
}

/// Input to `MethodHandler::handle_callback`.
#[derive(Debug, Clone)]
pub struct HandleCallbackData {
    pub transaction: Transaction,
    pub payload: CallbackPayload,
    pub callback_type: CallbackType,
}

/// Outcome of callback handling. Always returned, even on failure; the
/// default is the `Error` status with no foreign id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleCallbackResult {
    pub status: TransactionStatus,
    pub foreign_id: Option<String>,
}

impl Default for HandleCallbackResult {
    fn default() -> Self {
        Self {
            status: TransactionStatus::Error,
            foreign_id: None,
        }
    }
}

/// Contract every provider adapter implements.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Begins a payment with the external provider and yields the URL the
    /// customer is redirected to.
    async fn init(&self, data: InitData) -> InitResult;

    /// Consumes an inbound provider callback and yields the resulting
    /// transaction status.
    async fn handle_callback(&self, data: HandleCallbackData) -> HandleCallbackResult;
}
