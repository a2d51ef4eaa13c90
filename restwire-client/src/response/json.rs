use restwire_core::HeaderCollection;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::{Response, declined};
use crate::ClientError;
use crate::content::ResponseContent;

const APPLICATION_JSON: &str = "application/json";

/// A response whose body is JSON decoded into `T`.
///
/// Only `application/json` is accepted. A body that claims to be JSON but does
/// not parse as `T` is a [`ClientError::Decode`].
#[derive(Clone, Debug)]
pub struct JsonResponse<T> {
    headers: HeaderCollection,
    content: Option<T>,
}

impl<T> Default for JsonResponse<T> {
    fn default() -> Self {
        Self {
            headers: HeaderCollection::default(),
            content: None,
        }
    }
}

impl<T> JsonResponse<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded value, if content was accepted.
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn into_content(self) -> Option<T> {
        self.content
    }
}

impl<T> Response for JsonResponse<T>
where
    T: DeserializeOwned + Send,
{
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn set_headers(&mut self, headers: HeaderCollection) {
        self.headers = headers;
    }

    async fn consume_content(
        &mut self,
        content: Option<&mut ResponseContent>,
        cancel: &CancellationToken,
    ) -> Result<bool, ClientError> {
        let Some(content) = content else {
            return Ok(false);
        };

        if content.media_type().as_deref() != Some(APPLICATION_JSON) {
            declined("json", content);
            return Ok(false);
        }

        let bytes = content.read_to_bytes(cancel).await?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("failed to decode JSON body: {e}")))?;
        self.content = Some(value);
        Ok(true)
    }
}
