//! Shared remote-call wrapper for the provider clients.
//!
//! Wraps a reqwest client with the configured timeout, a bounded retry
//! loop for transport failures and a circuit breaker. Adapters branch on
//! the returned `RemoteError`, never on a caught panic.

use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigError, HttpOptions};
use crate::payment::handler::ErrorDetail;

const CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote call failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("remote request cannot be replayed")]
    NotReplayable,

    #[error("circuit breaker open, remote call rejected")]
    CircuitOpen,

    #[error("remote rejected the request: {code} - {description}")]
    Rejected { code: String, description: String },
}

impl From<&RemoteError> for ErrorDetail {
    fn from(error: &RemoteError) -> Self {
        match error {
            RemoteError::Transport(_) => ErrorDetail::new("remote.transport", error.to_string()),
            RemoteError::Decode(_) => ErrorDetail::new("remote.decode", error.to_string()),
            RemoteError::NotReplayable => {
                ErrorDetail::new("remote.not_replayable", error.to_string())
            }
            RemoteError::CircuitOpen => ErrorDetail::new("remote.circuit_open", error.to_string()),
            RemoteError::Rejected { code, description } => {
                ErrorDetail::new(code.clone(), description.clone())
            }
        }
    }
}

/// HTTP client shared by the provider adapters.
pub struct RemoteClient {
    client: Client,
    retries: u32,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl RemoteClient {
    pub fn new(options: &HttpOptions) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        let backoff = backoff::equal_jittered(Duration::from_secs(10), Duration::from_secs(60));
        let policy = failure_policy::consecutive_failures(CONSECUTIVE_FAILURES, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Ok(Self {
            client,
            retries: options.retry,
            circuit_breaker,
        })
    }

    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends a request, retrying transport failures up to the configured
    /// count. The breaker rejects outright once too many consecutive
    /// sends have failed.
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let request = match request.try_clone() {
                Some(request) => request,
                None => return Err(RemoteError::NotReplayable),
            };

            match self.circuit_breaker.call(request.send()).await {
                Ok(response) => return Ok(response),
                Err(FailsafeError::Rejected) => return Err(RemoteError::CircuitOpen),
                Err(FailsafeError::Inner(err)) if attempt <= self.retries => {
                    tracing::warn!(attempt, error = %err, "remote call failed, retrying");
                }
                Err(FailsafeError::Inner(err)) => return Err(RemoteError::Transport(err)),
            }
        }
    }
}
