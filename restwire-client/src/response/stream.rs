use std::io::{Cursor, SeekFrom};

use restwire_core::HeaderCollection;
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWrite};
use tokio_util::sync::CancellationToken;

use super::Response;
use crate::ClientError;
use crate::content::ResponseContent;

/// A seekable byte stream a [`StreamResponse`] can write into.
pub trait ResponseStream: AsyncRead + AsyncWrite + AsyncSeek + Unpin + Send {}

impl<S> ResponseStream for S where S: AsyncRead + AsyncWrite + AsyncSeek + Unpin + Send {}

/// A response that copies the body verbatim into a stream.
///
/// Any present content is accepted regardless of media type. After the copy the
/// stream is rewound to its start. The stream is owned by the response and is
/// dropped with it unless taken with [`into_stream`](Self::into_stream).
///
/// # Example
///
/// ```ignore
/// let file = tokio::fs::File::options().read(true).write(true).create(true).open(path).await?;
/// let mut message = Message::<StreamResponse>::with_factories(
///     Method::GET,
///     "files/report.pdf",
///     || Some(EmptyRequest::new()),
///     move || Some(StreamResponse::with_stream(file)),
/// );
/// ```
pub struct StreamResponse {
    headers: HeaderCollection,
    stream: Box<dyn ResponseStream>,
}

impl Default for StreamResponse {
    fn default() -> Self {
        Self::with_stream(Cursor::new(Vec::new()))
    }
}

impl std::fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResponse")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl StreamResponse {
    /// Create a response backed by an in-memory buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a response that writes into `stream`.
    pub fn with_stream<S: ResponseStream + 'static>(stream: S) -> Self {
        Self {
            headers: HeaderCollection::default(),
            stream: Box::new(stream),
        }
    }

    pub fn stream_mut(&mut self) -> &mut (dyn ResponseStream + 'static) {
        self.stream.as_mut()
    }

    /// Take ownership of the stream.
    pub fn into_stream(self) -> Box<dyn ResponseStream> {
        self.stream
    }
}

impl Response for StreamResponse {
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

        let written = content.copy_to(self.stream.as_mut(), cancel).await?;
        self.stream.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(written, "copied response body into stream");
        Ok(true)
    }
}
