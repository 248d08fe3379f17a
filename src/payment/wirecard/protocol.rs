//! Wirecard wire documents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of the payment registration request.
#[derive(Debug, Serialize)]
pub struct RegistrationRequest {
    pub payment: RegistrationPayment,
}

#[derive(Debug, Serialize)]
pub struct RegistrationPayment {
    #[serde(rename = "merchant-account-id")]
    pub merchant_account_id: MerchantAccountId,
    #[serde(rename = "request-id")]
    pub request_id: String,
    #[serde(rename = "transaction-type")]
    pub transaction_type: &'static str,
    #[serde(rename = "requested-amount")]
    pub requested_amount: RequestedAmount,
    #[serde(rename = "success-redirect-url")]
    pub success_redirect_url: String,
    #[serde(rename = "fail-redirect-url")]
    pub fail_redirect_url: String,
    #[serde(rename = "cancel-redirect-url")]
    pub cancel_redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct MerchantAccountId {
    pub value: String,
}

/// Amount in decimal major units, serialized as a JSON number.
#[derive(Debug, Serialize)]
pub struct RequestedAmount {
    pub value: Decimal,
    pub currency: String,
}

/// Body of the registration response: either a non-empty error list or a
/// redirect URL.
#[derive(Debug, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default)]
    pub errors: Vec<ProviderError>,
    #[serde(rename = "payment-redirect-url")]
    pub payment_redirect_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    pub code: String,
    pub description: String,
}

/// Decoded form of the `response-base64` callback field.
#[derive(Debug, Deserialize)]
pub struct CallbackEnvelope {
    pub payment: Option<CallbackPayment>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackPayment {
    #[serde(rename = "request-id")]
    pub request_id: Option<String>,
    #[serde(rename = "transaction-id")]
    pub transaction_id: Option<String>,
    #[serde(rename = "transaction-state")]
    pub transaction_state: Option<String>,
}
