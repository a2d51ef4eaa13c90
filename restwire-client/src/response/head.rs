use restwire_core::HeaderCollection;
use tokio_util::sync::CancellationToken;

use super::Response;
use crate::ClientError;
use crate::content::ResponseContent;

/// A response that records content headers and never reads the body.
///
/// Suited to `HEAD` requests, where `Content-Length` and `Content-Type`
/// describe a body that is not sent.
#[derive(Clone, Debug, Default)]
pub struct HeadResponse {
    headers: HeaderCollection,
    content_headers: HeaderCollection,
}

impl HeadResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content-level headers such as `Content-Length`.
    pub fn content_headers(&self) -> &HeaderCollection {
        &self.content_headers
    }

    /// Response-level headers followed by content-level headers.
    pub fn all_headers(&self) -> HeaderCollection {
        self.headers.merged(&self.content_headers)
    }
}

impl Response for HeadResponse {
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn set_headers(&mut self, headers: HeaderCollection) {
        self.headers = headers;
    }

    async fn consume_content(
        &mut self,
        content: Option<&mut ResponseContent>,
        _cancel: &CancellationToken,
    ) -> Result<bool, ClientError> {
        match content {
            Some(content) => {
                self.content_headers = HeaderCollection::from_header_map(content.headers());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};

    #[tokio::test]
    async fn test_records_content_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        let mut content = ResponseContent::empty(headers);

        let mut response = HeadResponse::new();
        response.set_headers(HeaderCollection::unvalidated([("etag", "\"abc\"")]));
        let accepted = response
            .consume_content(Some(&mut content), &CancellationToken::new())
            .await
            .unwrap();

        assert!(accepted);
        assert_eq!(response.content_headers().get("Content-Length"), Some("1024"));
        assert_eq!(response.headers().get("Content-Length"), None);

        let all = response.all_headers();
        assert_eq!(all.len(), 3);
        assert_eq!(all.get("etag"), Some("\"abc\""));
        assert_eq!(all.get("content-type"), Some("image/png"));
    }

    #[tokio::test]
    async fn test_absent_content() {
        let mut response = HeadResponse::new();
        let accepted = response
            .consume_content(None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!accepted);
        assert!(response.content_headers().is_empty());
    }
}
