use http::HeaderValue;
use restwire_core::HeaderCollection;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{Request, check_canceled};
use crate::ClientError;
use crate::content::RequestContent;

const APPLICATION_JSON_UTF8: &str = "application/json; charset=utf-8";

/// A request whose body is `T` serialized as JSON.
///
/// Field naming and value conversion follow `T`'s serde attributes.
/// [`pretty`](Self::pretty) switches to indented output.
#[derive(Clone, Debug, Default)]
pub struct JsonRequest<T> {
    headers: HeaderCollection,
    content: T,
    pretty: bool,
}

impl<T> JsonRequest<T> {
    pub fn new(content: T) -> Self {
        Self {
            headers: HeaderCollection::default(),
            content,
            pretty: false,
        }
    }

    /// Emit indented JSON.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_headers(mut self, headers: HeaderCollection) -> Self {
        self.headers = headers;
        self
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut T {
        &mut self.content
    }
}

impl<T> Request for JsonRequest<T>
where
    T: Serialize + Send + Sync,
{
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    async fn create_content(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<RequestContent>, ClientError> {
        check_canceled(cancel)?;

        let body = if self.pretty {
            serde_json::to_vec_pretty(&self.content)
        } else {
            serde_json::to_vec(&self.content)
        }
        .map_err(|e| ClientError::Encode(format!("failed to encode JSON body: {e}")))?;

        Ok(Some(RequestContent::new(
            HeaderValue::from_static(APPLICATION_JSON_UTF8),
            body,
        )))
    }
}
