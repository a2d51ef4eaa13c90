use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use http::HeaderValue;
use mime::Mime;
use restwire_core::HeaderCollection;
use tokio_util::sync::CancellationToken;

use super::{Request, check_canceled};
use crate::ClientError;
use crate::content::RequestContent;

/// A request whose body is text.
///
/// The body is encoded as UTF-8 unless another encoding is set, and the
/// content type always names the charset actually used.
///
/// # Example
///
/// ```ignore
/// let request = StringRequest::new("<ping/>")
///     .with_media_type("text/xml")
///     .with_encoding(encoding_rs::WINDOWS_1252);
/// ```
#[derive(Clone, Debug)]
pub struct StringRequest {
    headers: HeaderCollection,
    content: String,
    media_type: String,
    encoding: &'static Encoding,
}

impl Default for StringRequest {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl StringRequest {
    /// Media type used unless overridden.
    pub const DEFAULT_MEDIA_TYPE: &'static str = "text/plain";

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            headers: HeaderCollection::default(),
            content: content.into(),
            media_type: Self::DEFAULT_MEDIA_TYPE.to_string(),
            encoding: UTF_8,
        }
    }

    /// Set the media type, e.g. `text/html`.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Set the character encoding of the body.
    ///
    /// Text that the encoding cannot represent fails with
    /// [`ClientError::Encode`] when the content is created.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_headers(mut self, headers: HeaderCollection) -> Self {
        self.headers = headers;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

fn content_type(media_type: &str, encoding: &'static Encoding) -> Result<HeaderValue, ClientError> {
    let mime = media_type
        .parse::<Mime>()
        .map_err(|e| ClientError::Encode(format!("invalid media type {media_type:?}: {e}")))?;
    if mime.params().next().is_some() {
        return Err(ClientError::Encode(format!(
            "media type {media_type:?} must not carry parameters"
        )));
    }

    let charset = encoding.name().to_ascii_lowercase();
    HeaderValue::try_from(format!("{}; charset={charset}", mime.essence_str()))
        .map_err(|e| ClientError::Encode(format!("invalid media type {media_type:?}: {e}")))
}

fn encode(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>, ClientError> {
    // encoding_rs only encodes into ASCII-compatible encodings
    if encoding == UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }

    let (bytes, used, unmappable) = encoding.encode(text);
    if unmappable || used != encoding {
        return Err(ClientError::Encode(format!(
            "text cannot be represented in {}",
            encoding.name()
        )));
    }
    Ok(bytes.into_owned())
}

impl Request for StringRequest {
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
        let content_type = content_type(&self.media_type, self.encoding)?;
        let body = encode(&self.content, self.encoding)?;
        Ok(Some(RequestContent::new(content_type, body)))
    }
}
