//! Ports to the collaborators this layer depends on but does not own:
//! the transaction store, the callback URL builder, the reconciliation
//! queue and the callback authenticity hook.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::payment::handler::{CallbackPayload, RequestContext};
use crate::payment::{CallbackType, Method};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("transaction {0} not found")]
    NotFound(Uuid),

    #[error("illegal status transition from {from:?} to {to}")]
    InvalidTransition {
        from: Option<TransactionStatus>,
        to: TransactionStatus,
    },

    #[error("transaction store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for transactions.
///
/// `save_status` carries the consistency guarantee of this layer: it must
/// apply the status with compare-and-set semantics against the stored
/// state, refusing any regression out of a terminal status. Callers never
/// assume single-writer; concurrent or duplicate callbacks simply re-save
/// the same outcome.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a status (and optionally the provider foreign id) for the
    /// given transaction, returning the stored entity.
    async fn save_status(
        &self,
        id: Uuid,
        status: TransactionStatus,
        foreign_id: Option<String>,
    ) -> StoreResult<Transaction>;

    /// Reloads a transaction by id.
    async fn by_id(&self, id: Uuid) -> StoreResult<Transaction>;
}

/// Deterministically builds the callback URL a provider redirects back to.
///
/// The three query parameters are the only contract; the URL scheme
/// itself belongs to the implementing collaborator.
pub trait CallbackUrlBuilder: Send + Sync {
    fn build(
        &self,
        context: &RequestContext,
        route: &str,
        transaction_id: Uuid,
        method: Method,
        callback_type: CallbackType,
    ) -> Url;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reconciliation queue failure: {0}")]
pub struct QueueError(pub String);

/// Work item for the out-of-band reconciliation of non-terminal provider
/// states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationJob {
    pub transaction_id: Uuid,
    pub method: Method,
    pub foreign_id: Option<String>,
}

/// External work queue the adapters hand non-terminal outcomes to.
///
/// Adapters enqueue and move on; a failed enqueue is logged and never
/// changes a callback result. No consumer lives in this layer.
#[async_trait]
pub trait ReconciliationQueue: Send + Sync {
    async fn enqueue(&self, job: ReconciliationJob) -> Result<(), QueueError>;
}

/// Authenticity hook consulted before a callback payload is parsed.
///
/// The default wiring accepts everything, leaving the request-id equality
/// check as the sole integrity measure the provider protocol offers.
pub trait CallbackVerifier: Send + Sync {
    fn verify(&self, payload: &CallbackPayload) -> bool;
}
