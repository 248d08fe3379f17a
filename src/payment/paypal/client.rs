//! HTTP client for the PayPal REST payments API.

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{ConfigError, PayPalConfig};
use crate::payment::remote::{RemoteClient, RemoteError};

const DEFAULT_TOKEN_TTL_SECS: i64 = 300;

#[derive(Debug, Serialize)]
pub struct CreatePaymentRequest {
    pub intent: &'static str,
    pub payer: Payer,
    pub transactions: Vec<PaymentTransaction>,
    pub redirect_urls: RedirectUrls,
}

#[derive(Debug, Serialize)]
pub struct Payer {
    pub payment_method: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PaymentTransaction {
    pub amount: Amount,
    pub description: String,
    pub invoice_number: String,
}

#[derive(Debug, Serialize)]
pub struct Amount {
    pub total: String,
    pub currency: String,
    pub details: AmountDetails,
}

#[derive(Debug, Serialize)]
pub struct AmountDetails {
    pub subtotal: String,
}

#[derive(Debug, Serialize)]
pub struct RedirectUrls {
    pub return_url: String,
    pub cancel_url: String,
}

/// Payment resource as returned by create/get/execute.
#[derive(Debug, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Payment {
    /// URL the customer approves the payment on.
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "approval_url")
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest {
    payer_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    name: Option<String>,
    message: Option<String>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct PayPalClient {
    remote: RemoteClient,
    host: String,
    client_id: String,
    client_secret: String,
    log_bodies: bool,
    token: ArcSwapOption<CachedToken>,
}

impl PayPalClient {
    pub fn new(config: &PayPalConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            remote: RemoteClient::new(&config.http)?,
            host: config.host().trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            log_bodies: config.http.log_bodies,
            token: ArcSwapOption::empty(),
        })
    }

    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<Payment, RemoteError> {
        let token = self.access_token().await?;
        let builder = self
            .remote
            .request(
                reqwest::Method::POST,
                &format!("{}/v1/payments/payment", self.host),
            )
            .bearer_auth(token)
            .json(request);

        let response = self.remote.send(builder).await?;
        self.read_json(response).await
    }

    pub async fn payment(&self, payment_id: &str) -> Result<Payment, RemoteError> {
        let token = self.access_token().await?;
        let builder = self
            .remote
            .request(
                reqwest::Method::GET,
                &format!("{}/v1/payments/payment/{}", self.host, payment_id),
            )
            .bearer_auth(token);

        let response = self.remote.send(builder).await?;
        self.read_json(response).await
    }

    pub async fn execute_payment(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<Payment, RemoteError> {
        let token = self.access_token().await?;
        let builder = self
            .remote
            .request(
                reqwest::Method::POST,
                &format!("{}/v1/payments/payment/{}/execute", self.host, payment_id),
            )
            .bearer_auth(token)
            .json(&ExecuteRequest {
                payer_id: payer_id.to_string(),
            });

        let response = self.remote.send(builder).await?;
        self.read_json(response).await
    }

    async fn access_token(&self) -> Result<String, RemoteError> {
        if let Some(token) = self.token.load_full() {
            if token.expires_at > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let builder = self
            .remote
            .request(
                reqwest::Method::POST,
                &format!("{}/v1/oauth2/token", self.host),
            )
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")]);

        let response = self.remote.send(builder).await?;
        let token: TokenResponse = self.read_json(response).await?;

        // refresh one minute before the provider expires it
        let ttl = token
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS)
            .saturating_sub(60)
            .max(0);
        self.token.store(Some(Arc::new(CachedToken {
            value: token.access_token.clone(),
            expires_at: Utc::now() + chrono::Duration::seconds(ttl),
        })));

        Ok(token.access_token)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();
        let body = response.text().await.map_err(RemoteError::from)?;

        if self.log_bodies {
            tracing::debug!(status = %status, body = %body, "paypal response");
        }

        if !status.is_success() {
            let error: ApiError = serde_json::from_str(&body).unwrap_or_default();
            return Err(RemoteError::Rejected {
                code: error.name.unwrap_or_else(|| status.as_str().to_string()),
                description: error
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            });
        }

        serde_json::from_str(&body).map_err(RemoteError::from)
    }
}
