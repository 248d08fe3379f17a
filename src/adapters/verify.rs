//! Callback authenticity verifiers.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::payment::handler::CallbackPayload;
use crate::ports::CallbackVerifier;

/// Accepts every payload, leaving request-id equality as the only
/// integrity check.
#[derive(Debug, Clone, Default)]
pub struct NoVerification;

impl CallbackVerifier for NoVerification {
    fn verify(&self, _payload: &CallbackPayload) -> bool {
        true
    }
}

/// Checks a hex HMAC-SHA256 of the raw `response-base64` form field
/// against the `response-signature` form field.
pub struct HmacSha256Verifier {
    key: Vec<u8>,
}

impl HmacSha256Verifier {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }
}

impl CallbackVerifier for HmacSha256Verifier {
    fn verify(&self, payload: &CallbackPayload) -> bool {
        let body = match payload.form("response-base64") {
            Some(body) => body,
            None => return false,
        };
        let signature = match payload.form("response-signature") {
            Some(signature) => signature,
            None => return false,
        };
        let signature = match hex::decode(signature) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let mut mac = match Hmac::<Sha256>::new_from_slice(&self.key) {
            Ok(mac) => mac,
            Err(_) => return false,
        };

        mac.update(body.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }
}
