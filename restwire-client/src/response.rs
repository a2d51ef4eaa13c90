//! Response variants.
//!
//! A response variant receives the response-level headers and decides, from the
//! content's media type, whether it can decode the body:
//!
//! - [`EmptyResponse`]: ignores the body
//! - [`StringResponse`]: textual media types
//! - [`JsonResponse`]: `application/json`
//! - [`StreamResponse`]: any body, copied verbatim into a stream
//! - [`HeadResponse`]: content headers only, never the body
//! - [`FlexibleResponse`]: the first of several candidates that accepts the content

mod flexible;
mod head;
mod json;
mod stream;
mod string;

use std::future::Future;

use restwire_core::HeaderCollection;
use tokio_util::sync::CancellationToken;

use crate::ClientError;
use crate::content::ResponseContent;

pub use flexible::{Candidate, FlexibleResponse};
pub use head::HeadResponse;
pub use json::JsonResponse;
pub use stream::{ResponseStream, StreamResponse};
pub use string::StringResponse;

/// The incoming half of a message.
pub trait Response: Send {
    /// Response-level headers of the reply.
    fn headers(&self) -> &HeaderCollection;

    /// Store the response-level headers. Called before content is consumed.
    fn set_headers(&mut self, headers: HeaderCollection);

    /// Try to decode `content`.
    ///
    /// Returns `Ok(false)` when there is no content or its media type is not one
    /// this variant handles; nothing is decoded in that case. Errors are reserved
    /// for content that matched but could not be read or decoded.
    fn consume_content(
        &mut self,
        content: Option<&mut ResponseContent>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<bool, ClientError>> + Send;
}

/// A response that ignores the body.
#[derive(Clone, Debug, Default)]
pub struct EmptyResponse {
    headers: HeaderCollection,
}

impl EmptyResponse {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Response for EmptyResponse {
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn set_headers(&mut self, headers: HeaderCollection) {
        self.headers = headers;
    }

    async fn consume_content(
        &mut self,
        _content: Option<&mut ResponseContent>,
        _cancel: &CancellationToken,
    ) -> Result<bool, ClientError> {
        Ok(true)
    }
}

/// Log a variant turning content down.
fn declined(variant: &'static str, content: &ResponseContent) {
    tracing::debug!(
        variant,
        media_type = content.media_type().as_deref().unwrap_or("<none>"),
        "response variant declined content"
    );
}
