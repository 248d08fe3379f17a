//! Payment gateway integration: provider identifiers, the method handler
//! contract and one adapter per external provider.

pub mod handler;
pub mod paypal;
pub mod registry;
pub mod remote;
pub mod wirecard;

pub use handler::{
    CallbackPayload, ErrorDetail, HandleCallbackData, HandleCallbackResult, InitData, InitResult,
    MethodHandler, RequestContext,
};
pub use registry::HandlerRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Route the excluded REST layer serves provider callbacks on. The
/// callback URL builder appends `transactionId`, `method` and `type`
/// query parameters to it.
pub const CALLBACK_ROUTE: &str = "payment/callback";

/// Enumerated payment provider identifier. Selects an adapter and its
/// configuration subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    PayPal,
    Wirecard,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::PayPal => "paypal",
            Method::Wirecard => "wirecard",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownMethod(String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "paypal" => Ok(Method::PayPal),
            "wirecard" => Ok(Method::Wirecard),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// Provider-classified intent of an inbound callback. Independent of the
/// transaction status the callback resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackType {
    Success,
    Cancel,
    Error,
}

impl CallbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackType::Success => "success",
            CallbackType::Cancel => "cancel",
            CallbackType::Error => "error",
        }
    }
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown callback type: {0}")]
pub struct UnknownCallbackType(String);

impl FromStr for CallbackType {
    type Err = UnknownCallbackType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(CallbackType::Success),
            "cancel" => Ok(CallbackType::Cancel),
            "error" => Ok(CallbackType::Error),
            other => Err(UnknownCallbackType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_string_round_trip() {
        for method in [Method::PayPal, Method::Wirecard] {
            assert_eq!(method.as_str().parse::<Method>(), Ok(method));
        }
        assert!("stripe".parse::<Method>().is_err());
    }

    #[test]
    fn test_callback_type_string_round_trip() {
        for callback_type in [
            CallbackType::Success,
            CallbackType::Cancel,
            CallbackType::Error,
        ] {
            assert_eq!(
                callback_type.as_str().parse::<CallbackType>(),
                Ok(callback_type)
            );
        }
        assert!("refund".parse::<CallbackType>().is_err());
    }
}
