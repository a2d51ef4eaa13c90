//! Wire content carried by requests and responses.
//!
//! [`RequestContent`] is what a request variant produces: encoded body bytes plus
//! the content headers describing them. [`ResponseContent`] is what a response
//! variant consumes: the content-level headers of the reply plus a body that can
//! be buffered or streamed exactly once.

use bytes::Bytes;
use encoding_rs::Encoding;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http_body_util::BodyExt;
use mime::Mime;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::ClientError;
use crate::transport::{ResponseBody, empty_body};

/// Headers that describe the content rather than the response.
const CONTENT_HEADERS: &[&str] = &[
    "allow",
    "content-disposition",
    "content-encoding",
    "content-language",
    "content-length",
    "content-location",
    "content-md5",
    "content-range",
    "content-type",
    "expires",
    "last-modified",
];

/// Returns true if `name` is a content-level header.
pub fn is_content_header(name: &HeaderName) -> bool {
    CONTENT_HEADERS.contains(&name.as_str())
}

/// Split wire response headers into `(response-level, content-level)` maps.
pub(crate) fn split_content_headers(headers: HeaderMap) -> (HeaderMap, HeaderMap) {
    let mut response = HeaderMap::new();
    let mut content = HeaderMap::new();
    let mut current: Option<HeaderName> = None;

    for (name, value) in headers {
        // Follow-up values of a multi-value header arrive without a name
        if let Some(name) = name {
            current = Some(name);
        }
        if let Some(name) = &current {
            let target = if is_content_header(name) {
                &mut content
            } else {
                &mut response
            };
            target.append(name.clone(), value);
        }
    }

    (response, content)
}

/// Encoded outgoing body.
#[derive(Clone, Debug)]
pub struct RequestContent {
    headers: HeaderMap,
    body: Bytes,
}

impl RequestContent {
    /// Create content with the given `Content-Type`.
    pub fn new(content_type: HeaderValue, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Content headers sent with the body.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the content headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The encoded body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (HeaderMap, Bytes) {
        (self.headers, self.body)
    }
}

enum BodyState {
    Pending(ResponseBody),
    Buffered(Bytes),
    Consumed,
}

/// Incoming body together with its content-level headers.
///
/// The body can be read repeatedly with [`read_to_bytes`](Self::read_to_bytes),
/// which buffers it on first use. [`copy_to`](Self::copy_to) on an unbuffered
/// body streams it instead, after which the body is gone.
pub struct ResponseContent {
    headers: HeaderMap,
    body: BodyState,
}

impl std::fmt::Debug for ResponseContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            BodyState::Pending(_) => "pending",
            BodyState::Buffered(_) => "buffered",
            BodyState::Consumed => "consumed",
        };
        f.debug_struct("ResponseContent")
            .field("headers", &self.headers)
            .field("body", &body)
            .finish()
    }
}

impl ResponseContent {
    pub fn new(headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            headers,
            body: BodyState::Pending(body),
        }
    }

    /// Content whose body is already in memory.
    pub fn from_bytes(headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: BodyState::Buffered(body.into()),
        }
    }

    /// Content with headers only, as in a reply to `HEAD`.
    pub fn empty(headers: HeaderMap) -> Self {
        Self::new(headers, empty_body())
    }

    /// Content-level headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The parsed `Content-Type`, if present and well-formed.
    pub fn mime(&self) -> Option<Mime> {
        self.headers
            .get(CONTENT_TYPE)?
            .to_str()
            .ok()?
            .parse::<Mime>()
            .ok()
    }

    /// The lowercase media type of `Content-Type`, without parameters.
    pub fn media_type(&self) -> Option<String> {
        self.mime()
            .map(|mime| mime.essence_str().to_ascii_lowercase())
    }

    /// The `charset` parameter of `Content-Type`, if any.
    pub fn charset(&self) -> Option<String> {
        let mime = self.mime()?;
        mime.get_param(mime::CHARSET)
            .map(|charset| charset.as_str().trim_matches('"').to_string())
    }

    /// The encoding named by the `charset` parameter, if it is a known label.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        Encoding::for_label(self.charset()?.as_bytes())
    }

    /// Read the whole body into memory.
    ///
    /// The bytes are kept, so later reads return the same data.
    pub async fn read_to_bytes(&mut self, cancel: &CancellationToken) -> Result<Bytes, ClientError> {
        let body = match std::mem::replace(&mut self.body, BodyState::Consumed) {
            BodyState::Buffered(bytes) => {
                self.body = BodyState::Buffered(bytes.clone());
                return Ok(bytes);
            }
            BodyState::Consumed => {
                return Err(ClientError::Decode(
                    "response body was already streamed".into(),
                ));
            }
            BodyState::Pending(body) => body,
        };

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Canceled),
            collected = body.collect() => collected?.to_bytes(),
        };

        self.body = BodyState::Buffered(bytes.clone());
        Ok(bytes)
    }

    /// Write the body into `writer`, returning the number of bytes written.
    pub async fn copy_to<W>(
        &mut self,
        writer: &mut W,
        cancel: &CancellationToken,
    ) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut body = match std::mem::replace(&mut self.body, BodyState::Consumed) {
            BodyState::Buffered(bytes) => {
                let written = write_checked(writer, &bytes, cancel).await;
                self.body = BodyState::Buffered(bytes);
                return written;
            }
            BodyState::Consumed => {
                return Err(ClientError::Decode(
                    "response body was already streamed".into(),
                ));
            }
            BodyState::Pending(body) => body,
        };

        let mut written = 0;
        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::Canceled),
                frame = body.frame() => frame,
            };
            let Some(frame) = frame else { break };
            if let Ok(data) = frame?.into_data() {
                written += write_checked(writer, &data, cancel).await?;
            }
        }
        writer.flush().await?;

        Ok(written)
    }
}

async fn write_checked<W>(
    writer: &mut W,
    data: &[u8],
    cancel: &CancellationToken,
) -> Result<u64, ClientError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Canceled),
        result = writer.write_all(data) => {
            result?;
            Ok(data.len() as u64)
        }
    }
}
