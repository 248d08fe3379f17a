//! PayPal method handler.
//!
//! Creates the payment at the provider and hands the customer the
//! approval URL; the callback executes the approved payment. Unlike the
//! Wirecard handler, init persists nothing locally.

pub mod client;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{ConfigError, PayPalConfig};
use crate::domain::TransactionStatus;
use crate::payment::handler::{
    ErrorDetail, HandleCallbackData, HandleCallbackResult, InitData, InitResult, MethodHandler,
};
use crate::payment::{CallbackType, Method, CALLBACK_ROUTE};
use crate::ports::{CallbackUrlBuilder, ReconciliationJob, ReconciliationQueue};
use self::client::{
    Amount, AmountDetails, CreatePaymentRequest, PayPalClient, Payer, PaymentTransaction,
    RedirectUrls,
};

pub struct PayPalHandler {
    client: PayPalClient,
    url_builder: Arc<dyn CallbackUrlBuilder>,
    queue: Arc<dyn ReconciliationQueue>,
}

impl PayPalHandler {
    pub fn new(
        config: &PayPalConfig,
        url_builder: Arc<dyn CallbackUrlBuilder>,
        queue: Arc<dyn ReconciliationQueue>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client: PayPalClient::new(config)?,
            url_builder,
            queue,
        })
    }

    fn create_request(&self, data: &InitData) -> CreatePaymentRequest {
        let transaction = &data.transaction;
        let total = transaction.total_price.major_units().to_string();

        CreatePaymentRequest {
            intent: "sale",
            payer: Payer {
                payment_method: "paypal",
            },
            transactions: vec![PaymentTransaction {
                amount: Amount {
                    total: total.clone(),
                    currency: transaction.total_price.currency.clone(),
                    // no per-item decomposition, the subtotal is the total
                    details: AmountDetails { subtotal: total },
                },
                description: format!("Order {}", transaction.reference_number),
                invoice_number: transaction.reference_number.clone(),
            }],
            redirect_urls: RedirectUrls {
                return_url: self.callback_url(data, CallbackType::Success),
                cancel_url: self.callback_url(data, CallbackType::Cancel),
            },
        }
    }

    fn callback_url(&self, data: &InitData, callback_type: CallbackType) -> String {
        self.url_builder
            .build(
                &data.context,
                CALLBACK_ROUTE,
                data.transaction.id,
                Method::PayPal,
                callback_type,
            )
            .to_string()
    }

    async fn enqueue_reconciliation(&self, transaction_id: Uuid, foreign_id: &str) {
        let job = ReconciliationJob {
            transaction_id,
            method: Method::PayPal,
            foreign_id: Some(foreign_id.to_string()),
        };
        if let Err(err) = self.queue.enqueue(job).await {
            tracing::error!(%transaction_id, error = %err, "failed to enqueue reconciliation job");
        }
    }
}

#[async_trait]
impl MethodHandler for PayPalHandler {
    async fn init(&self, data: InitData) -> InitResult {
        let request = self.create_request(&data);

        match self.client.create_payment(&request).await {
            Ok(payment) => match payment.approval_url() {
                Some(redirect_url) => InitResult::succeeded(redirect_url),
                None => {
                    tracing::error!(payment_id = %payment.id, "paypal payment has no approval link");
                    InitResult::failed(vec![ErrorDetail::new(
                        "paypal.no_approval_url",
                        "payment has no approval link",
                    )])
                }
            },
            Err(err) => {
                tracing::error!(error = %err, "paypal payment creation failed");
                InitResult::failed(vec![ErrorDetail::from(&err)])
            }
        }
    }

    async fn handle_callback(&self, data: HandleCallbackData) -> HandleCallbackResult {
        let mut result = HandleCallbackResult::default();

        let payment_id = data.payload.query("paymentId").unwrap_or_default();
        let payer_id = data.payload.query("PayerID").unwrap_or_default();
        if payment_id.is_empty() || payer_id.is_empty() {
            return result;
        }

        if let Err(err) = self.client.payment(payment_id).await {
            tracing::error!(%payment_id, error = %err, "paypal payment lookup failed");
            return result;
        }

        match self.client.execute_payment(payment_id, payer_id).await {
            Ok(_) => {
                result.foreign_id = Some(payment_id.to_string());
                // the sale is finalized out of band, the callback only
                // confirms execution
                result.status = TransactionStatus::Pending;
                self.enqueue_reconciliation(data.transaction.id, payment_id)
                    .await;
            }
            Err(err) => {
                tracing::error!(%payment_id, error = %err, "paypal payment execution failed");
            }
        }

        result
    }
}
