//! Query-parameter implementation of CallbackUrlBuilder.

use url::Url;
use uuid::Uuid;

use crate::payment::handler::RequestContext;
use crate::payment::{CallbackType, Method};
use crate::ports::CallbackUrlBuilder;

/// Builds `{base}/{route}?transactionId=..&method=..&type=..` from the
/// ambient request context.
#[derive(Debug, Clone, Default)]
pub struct QueryCallbackUrlBuilder;

impl QueryCallbackUrlBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl CallbackUrlBuilder for QueryCallbackUrlBuilder {
    fn build(
        &self,
        context: &RequestContext,
        route: &str,
        transaction_id: Uuid,
        method: Method,
        callback_type: CallbackType,
    ) -> Url {
        let mut url = context.base_url.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(route.split('/'));
        }

        url.query_pairs_mut()
            .append_pair("transactionId", &transaction_id.to_string())
            .append_pair("method", method.as_str())
            .append_pair("type", callback_type.as_str());

        url
    }
}
