use encoding_rs::{Encoding, UTF_8};
use restwire_core::HeaderCollection;
use tokio_util::sync::CancellationToken;

use super::{Response, declined};
use crate::ClientError;
use crate::content::ResponseContent;

/// Media types a [`StringResponse`] accepts.
pub(crate) const TEXT_MEDIA_TYPES: &[&str] = &["text/plain", "text/html", "text/xml", "text/richtext"];

/// A response whose body is text.
///
/// Only plain text, HTML, XML and rich text are accepted. The body is decoded
/// with the charset from `Content-Type`, falling back to UTF-8 when none is
/// declared or the label is unknown. A byte order mark overrides the declared
/// charset. Invalid sequences are replaced rather than rejected.
#[derive(Clone, Debug, Default)]
pub struct StringResponse {
    headers: HeaderCollection,
    content: Option<String>,
}

impl StringResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded text, if content was accepted.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn into_content(self) -> Option<String> {
        self.content
    }
}

fn decode(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    let (text, _, _) = encoding.unwrap_or(UTF_8).decode(bytes);
    text.into_owned()
}

impl Response for StringResponse {
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

        let accepted = content
            .media_type()
            .is_some_and(|media_type| TEXT_MEDIA_TYPES.contains(&media_type.as_str()));
        if !accepted {
            declined("string", content);
            return Ok(false);
        }

        let bytes = content.read_to_bytes(cancel).await?;
        self.content = Some(decode(&bytes, content.encoding()));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

    fn content(content_type: &'static str, body: &'static [u8]) -> ResponseContent {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        ResponseContent::from_bytes(headers, body)
    }

    #[tokio::test]
    async fn test_accepts_plain_text() {
        let mut response = StringResponse::new();
        let mut body = content("text/plain", b"OK");

        let accepted = response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();
        assert!(accepted);
        assert_eq!(response.content(), Some("OK"));
    }

    #[tokio::test]
    async fn test_rejects_octet_stream() {
        let mut response = StringResponse::new();
        let mut body = content("application/octet-stream", b"OK");

        let accepted = response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!accepted);
        assert_eq!(response.content(), None);
    }

    #[tokio::test]
    async fn test_media_type_is_case_insensitive() {
        for media_type in ["TEXT/HTML", "text/xml; charset=utf-8", "Text/RichText"] {
            let mut response = StringResponse::new();
            let mut body = content(media_type, b"<x/>");
            let accepted = response
                .consume_content(Some(&mut body), &CancellationToken::new())
                .await
                .unwrap();
            assert!(accepted, "{media_type}");
        }
    }

    #[tokio::test]
    async fn test_absent_content() {
        let mut response = StringResponse::new();
        let accepted = response
            .consume_content(None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn test_latin1_charset() {
        let mut response = StringResponse::new();
        let mut body = content("text/plain; charset=ISO-8859-1", b"caf\xe9");

        response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.content(), Some("café"));
    }

    #[tokio::test]
    async fn test_declared_charsets() {
        let cases: [(&'static str, &'static [u8], &str); 4] = [
            ("text/plain; charset=windows-1252", b"\x80 caf\xe9", "\u{20ac} caf\u{e9}"),
            ("text/plain; charset=utf-16le", b"O\0K\0", "OK"),
            ("text/html; charset=shift_jis", b"\x82\xa0", "\u{3042}"),
            ("text/xml; charset=utf-8", "\u{fc}".as_bytes(), "\u{fc}"),
        ];

        for (content_type, bytes, expected) in cases {
            let mut response = StringResponse::new();
            let mut body = content(content_type, bytes);
            response
                .consume_content(Some(&mut body), &CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(response.content(), Some(expected), "{content_type}");
        }
    }

    #[test]
    fn test_decode_fallbacks() {
        assert_eq!(decode("\u{fc}".as_bytes(), None), "\u{fc}");
        assert_eq!(decode(b"\xff", None), "\u{fffd}");
        assert_eq!(decode(b"\xef\xbb\xbfOK", Some(encoding_rs::WINDOWS_1252)), "OK");
    }
}
