//! Wirecard method handler.
//!
//! Registers the payment with the REST gateway after persisting the
//! transaction as pending, and resolves the asynchronous redirect
//! callback into a transaction status.

pub mod protocol;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{ConfigError, WirecardConfig};
use crate::domain::{Transaction, TransactionStatus};
use crate::payment::handler::{
    ErrorDetail, HandleCallbackData, HandleCallbackResult, InitData, InitResult, MethodHandler,
    RequestContext,
};
use crate::payment::remote::{RemoteClient, RemoteError};
use crate::payment::{CallbackType, Method, CALLBACK_ROUTE};
use crate::ports::{
    CallbackUrlBuilder, CallbackVerifier, ReconciliationJob, ReconciliationQueue, TransactionStore,
};
use self::protocol::{
    CallbackEnvelope, MerchantAccountId, RegistrationPayment, RegistrationRequest,
    RegistrationResponse, RequestedAmount,
};

const REGISTER_PATH: &str = "/api/payment/register";

pub struct WirecardHandler {
    remote: RemoteClient,
    host: String,
    merchant_account_id: String,
    username: String,
    password: String,
    log_bodies: bool,
    store: Arc<dyn TransactionStore>,
    url_builder: Arc<dyn CallbackUrlBuilder>,
    queue: Arc<dyn ReconciliationQueue>,
    verifier: Arc<dyn CallbackVerifier>,
}

impl WirecardHandler {
    pub fn new(
        config: &WirecardConfig,
        store: Arc<dyn TransactionStore>,
        url_builder: Arc<dyn CallbackUrlBuilder>,
        queue: Arc<dyn ReconciliationQueue>,
        verifier: Arc<dyn CallbackVerifier>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            remote: RemoteClient::new(&config.http)?,
            host: config.host().trim_end_matches('/').to_string(),
            merchant_account_id: config.merchant_account_id.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            log_bodies: config.http.log_bodies,
            store,
            url_builder,
            queue,
            verifier,
        })
    }

    fn callback_url(
        &self,
        context: &RequestContext,
        transaction_id: Uuid,
        callback_type: CallbackType,
    ) -> String {
        self.url_builder
            .build(
                context,
                CALLBACK_ROUTE,
                transaction_id,
                Method::Wirecard,
                callback_type,
            )
            .to_string()
    }

    fn registration_request(
        &self,
        transaction: &Transaction,
        context: &RequestContext,
    ) -> RegistrationRequest {
        RegistrationRequest {
            payment: RegistrationPayment {
                merchant_account_id: MerchantAccountId {
                    value: self.merchant_account_id.clone(),
                },
                request_id: transaction.id.to_string(),
                transaction_type: "authorization",
                requested_amount: RequestedAmount {
                    value: transaction.total_price.major_units(),
                    currency: transaction.total_price.currency.clone(),
                },
                success_redirect_url: self.callback_url(
                    context,
                    transaction.id,
                    CallbackType::Success,
                ),
                fail_redirect_url: self.callback_url(context, transaction.id, CallbackType::Error),
                cancel_redirect_url: self.callback_url(
                    context,
                    transaction.id,
                    CallbackType::Cancel,
                ),
            },
        }
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<RegistrationResponse, RemoteError> {
        let builder = self
            .remote
            .request(reqwest::Method::POST, &format!("{}{}", self.host, REGISTER_PATH))
            .basic_auth(&self.username, Some(&self.password))
            .json(request);

        let response = self.remote.send(builder).await?;
        let body = response.text().await.map_err(RemoteError::from)?;

        if self.log_bodies {
            tracing::debug!(body = %body, "wirecard registration response");
        }

        serde_json::from_str(&body).map_err(RemoteError::from)
    }

    async fn enqueue_reconciliation(&self, transaction_id: Uuid, foreign_id: Option<String>) {
        let job = ReconciliationJob {
            transaction_id,
            method: Method::Wirecard,
            foreign_id,
        };
        if let Err(err) = self.queue.enqueue(job).await {
            tracing::error!(%transaction_id, error = %err, "failed to enqueue reconciliation job");
        }
    }
}

#[async_trait]
impl MethodHandler for WirecardHandler {
    async fn init(&self, data: InitData) -> InitResult {
        // pending must be persisted before the provider is contacted
        if let Err(err) = self
            .store
            .save_status(data.transaction.id, TransactionStatus::Pending, None)
            .await
        {
            return InitResult::failed(vec![ErrorDetail::from(&err)]);
        }

        // reload, the store may normalize the identity used as request id
        let transaction = match self.store.by_id(data.transaction.id).await {
            Ok(transaction) => transaction,
            Err(err) => return InitResult::failed(vec![ErrorDetail::from(&err)]),
        };

        let request = self.registration_request(&transaction, &data.context);
        let response = match self.register(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(transaction_id = %transaction.id, error = %err, "wirecard registration failed");
                return InitResult::failed(vec![ErrorDetail::from(&err)]);
            }
        };

        if !response.errors.is_empty() {
            for error in &response.errors {
                tracing::error!(
                    code = %error.code,
                    description = %error.description,
                    "wirecard init error"
                );
            }
            return InitResult::failed(
                response
                    .errors
                    .iter()
                    .map(|error| ErrorDetail::new(error.code.clone(), error.description.clone()))
                    .collect(),
            );
        }

        match response.payment_redirect_url {
            Some(redirect_url) if !redirect_url.is_empty() => InitResult::succeeded(redirect_url),
            _ => {
                tracing::error!("wirecard init error: no payment redirect url set");
                InitResult::failed(vec![ErrorDetail::new(
                    "wirecard.no_redirect_url",
                    "no payment redirect url set",
                )])
            }
        }
    }

    async fn handle_callback(&self, data: HandleCallbackData) -> HandleCallbackResult {
        let mut result = HandleCallbackResult::default();

        if !self.verifier.verify(&data.payload) {
            tracing::error!(transaction_id = %data.transaction.id, "wirecard callback rejected by verifier");
            return result;
        }

        let raw = match data.payload.form("response-base64") {
            Some(raw) => raw,
            None => return result,
        };

        let decoded = match BASE64.decode(raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::error!(error = %err, "wirecard callback is not valid base64");
                return result;
            }
        };

        let envelope: CallbackEnvelope = match serde_json::from_slice(&decoded) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(error = %err, "wirecard callback is not valid json");
                return result;
            }
        };

        let payment = match envelope.payment {
            Some(payment) => payment,
            None => return result,
        };

        if self.log_bodies {
            tracing::debug!(payment = ?payment, "wirecard callback payload");
        }

        // request id equality is the authenticity check of this protocol
        let transaction_id = data.transaction.id.to_string();
        if payment.request_id.as_deref() != Some(transaction_id.as_str()) {
            tracing::error!(transaction_id = %transaction_id, "wirecard callback request id mismatch");
            return result;
        }

        result.foreign_id = payment.transaction_id.clone();

        if data.callback_type == CallbackType::Cancel {
            result.status = TransactionStatus::Cancelled;
            return result;
        }

        result.status = match payment.transaction_state.as_deref() {
            Some("success") => TransactionStatus::Success,
            Some("failed") => TransactionStatus::Error,
            _ => {
                // unfinished provider state, reconcile out of band
                self.enqueue_reconciliation(data.transaction.id, result.foreign_id.clone())
                    .await;
                TransactionStatus::Pending
            }
        };

        result
    }
}
