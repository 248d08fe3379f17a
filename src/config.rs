//! Typed, validated provider configuration.
//!
//! Loaded once from the environment and injected into the handler
//! registry; adapters hold their subtree immutably for their lifetime.

use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("http client could not be built: {0}")]
    HttpClient(String),
}

/// Remote HTTP behavior of one provider client.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpOptions {
    pub timeout_secs: u64,
    /// Extra transport attempts after a failed send. Provider rejections
    /// are never retried.
    pub retry: u32,
    /// Logs raw provider payloads at debug level when set.
    pub log_bodies: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry: 1,
            log_bodies: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub sandbox: bool,
    pub host_test: String,
    pub host_live: String,
    pub http: HttpOptions,
}

impl PayPalConfig {
    pub fn host(&self) -> &str {
        if self.sandbox {
            &self.host_test
        } else {
            &self.host_live
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require("paypal.client_id", &self.client_id)?;
        require("paypal.client_secret", &self.client_secret)?;
        validate_host("paypal.host_test", &self.host_test)?;
        validate_host("paypal.host_live", &self.host_live)?;
        validate_timeout("paypal.http.timeout_secs", self.http.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirecardConfig {
    pub merchant_account_id: String,
    pub username: String,
    pub password: String,
    pub sandbox: bool,
    pub host_test: String,
    pub host_live: String,
    pub http: HttpOptions,
}

impl WirecardConfig {
    pub fn host(&self) -> &str {
        if self.sandbox {
            &self.host_test
        } else {
            &self.host_live
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require("wirecard.merchant_account_id", &self.merchant_account_id)?;
        require("wirecard.username", &self.username)?;
        require("wirecard.password", &self.password)?;
        validate_host("wirecard.host_test", &self.host_test)?;
        validate_host("wirecard.host_live", &self.host_live)?;
        validate_timeout("wirecard.http.timeout_secs", self.http.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Base URL the callback URL builder appends the callback route to.
    pub callback_base_url: String,
    pub paypal: PayPalConfig,
    pub wirecard: WirecardConfig,
}

impl PaymentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let config = PaymentConfig {
            callback_base_url: env::var("CALLBACK_BASE_URL")?,
            paypal: PayPalConfig {
                client_id: env::var("PAYPAL_CLIENT_ID")?,
                client_secret: env::var("PAYPAL_CLIENT_SECRET")?,
                sandbox: env_parse("PAYPAL_SANDBOX", true)?,
                host_test: env_or("PAYPAL_HOST_TEST", "https://api.sandbox.paypal.com"),
                host_live: env_or("PAYPAL_HOST_LIVE", "https://api.paypal.com"),
                http: http_options_from_env("PAYPAL")?,
            },
            wirecard: WirecardConfig {
                merchant_account_id: env::var("WIRECARD_MERCHANT_ACCOUNT_ID")?,
                username: env::var("WIRECARD_USERNAME")?,
                password: env::var("WIRECARD_PASSWORD")?,
                sandbox: env_parse("WIRECARD_SANDBOX", true)?,
                host_test: env_or("WIRECARD_HOST_TEST", "https://api-test.wirecard.com"),
                host_live: env_or("WIRECARD_HOST_LIVE", "https://api.wirecard.com"),
                http: http_options_from_env("WIRECARD")?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_host("callback_base_url", &self.callback_base_url)?;
        self.paypal.validate()?;
        self.wirecard.validate()
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => Ok(value.parse()?),
        Err(_) => Ok(default),
    }
}

fn http_options_from_env(prefix: &str) -> anyhow::Result<HttpOptions> {
    let defaults = HttpOptions::default();
    Ok(HttpOptions {
        timeout_secs: env_parse(&format!("{prefix}_HTTP_TIMEOUT"), defaults.timeout_secs)?,
        retry: env_parse(&format!("{prefix}_HTTP_RETRY"), defaults.retry)?,
        log_bodies: env_parse(&format!("{prefix}_HTTP_LOG_BODIES"), defaults.log_bodies)?,
    })
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(field));
    }

    Ok(())
}

fn validate_host(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|err| ConfigError::Invalid {
        field,
        reason: err.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be an absolute http(s) url".to_string(),
        });
    }

    Ok(())
}

fn validate_timeout(field: &'static str, timeout_secs: u64) -> Result<(), ConfigError> {
    if timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "timeout must be positive".to_string(),
        });
    }

    Ok(())
}
