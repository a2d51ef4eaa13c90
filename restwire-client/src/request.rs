//! Request variants.
//!
//! A request variant carries the headers to send and knows how to encode its
//! payload into [`RequestContent`]:
//!
//! - [`EmptyRequest`]: headers only, no body
//! - [`StringRequest`]: a text body with a configurable media type
//! - [`JsonRequest`]: a JSON-serialized value

mod json;
mod string;

use std::future::Future;

use restwire_core::HeaderCollection;
use tokio_util::sync::CancellationToken;

use crate::ClientError;
use crate::content::RequestContent;

pub use json::JsonRequest;
pub use string::StringRequest;

/// The outgoing half of a message.
pub trait Request: Send + Sync {
    /// Headers applied to the wire request.
    fn headers(&self) -> &HeaderCollection;

    /// Mutable access to the headers, for adding entries before sending.
    fn headers_mut(&mut self) -> &mut HeaderCollection;

    /// Encode the body.
    ///
    /// Returns `None` when there is nothing to send. Encoding must not change
    /// the variant's visible state.
    fn create_content(
        &self,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<RequestContent>, ClientError>> + Send;
}

/// A request without a body.
#[derive(Clone, Debug, Default)]
pub struct EmptyRequest {
    headers: HeaderCollection,
}

impl EmptyRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request carrying `headers`.
    pub fn with_headers(headers: HeaderCollection) -> Self {
        Self { headers }
    }
}

impl Request for EmptyRequest {
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    async fn create_content(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Option<RequestContent>, ClientError> {
        Ok(None)
    }
}

pub(crate) fn check_canceled(cancel: &CancellationToken) -> Result<(), ClientError> {
    if cancel.is_cancelled() {
        return Err(ClientError::Canceled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_request_has_no_content() {
        let mut request = EmptyRequest::new();
        request.headers_mut().add([("X-Api-Key", "secret")]);

        let content = request.create_content(&CancellationToken::new()).await.unwrap();
        assert!(content.is_none());
        assert_eq!(request.headers().get("x-api-key"), Some("secret"));
    }
}
