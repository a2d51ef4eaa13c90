use restwire_core::HeaderCollection;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::{EmptyResponse, HeadResponse, JsonResponse, Response, StreamResponse, StringResponse};
use crate::ClientError;
use crate::content::ResponseContent;

/// One of the response variants a [`FlexibleResponse`] can pick from.
#[derive(Debug)]
pub enum Candidate<T> {
    Json(JsonResponse<T>),
    Text(StringResponse),
    Stream(StreamResponse),
    Head(HeadResponse),
    Empty(EmptyResponse),
}

impl<T> Candidate<T> {
    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Candidate::Json(_) => "json",
            Candidate::Text(_) => "text",
            Candidate::Stream(_) => "stream",
            Candidate::Head(_) => "head",
            Candidate::Empty(_) => "empty",
        }
    }

    pub fn as_json(&self) -> Option<&JsonResponse<T>> {
        match self {
            Candidate::Json(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&StringResponse> {
        match self {
            Candidate::Text(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&StreamResponse> {
        match self {
            Candidate::Stream(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_stream_mut(&mut self) -> Option<&mut StreamResponse> {
        match self {
            Candidate::Stream(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_head(&self) -> Option<&HeadResponse> {
        match self {
            Candidate::Head(r) => Some(r),
            _ => None,
        }
    }
}

impl<T> From<JsonResponse<T>> for Candidate<T> {
    fn from(response: JsonResponse<T>) -> Self {
        Candidate::Json(response)
    }
}

impl<T> From<StringResponse> for Candidate<T> {
    fn from(response: StringResponse) -> Self {
        Candidate::Text(response)
    }
}

impl<T> From<StreamResponse> for Candidate<T> {
    fn from(response: StreamResponse) -> Self {
        Candidate::Stream(response)
    }
}

impl<T> From<HeadResponse> for Candidate<T> {
    fn from(response: HeadResponse) -> Self {
        Candidate::Head(response)
    }
}

impl<T> From<EmptyResponse> for Candidate<T> {
    fn from(response: EmptyResponse) -> Self {
        Candidate::Empty(response)
    }
}

impl<T> Response for Candidate<T>
where
    T: DeserializeOwned + Send,
{
    fn headers(&self) -> &HeaderCollection {
        match self {
            Candidate::Json(r) => r.headers(),
            Candidate::Text(r) => r.headers(),
            Candidate::Stream(r) => r.headers(),
            Candidate::Head(r) => r.headers(),
            Candidate::Empty(r) => r.headers(),
        }
    }

    fn set_headers(&mut self, headers: HeaderCollection) {
        match self {
            Candidate::Json(r) => r.set_headers(headers),
            Candidate::Text(r) => r.set_headers(headers),
            Candidate::Stream(r) => r.set_headers(headers),
            Candidate::Head(r) => r.set_headers(headers),
            Candidate::Empty(r) => r.set_headers(headers),
        }
    }

    async fn consume_content(
        &mut self,
        content: Option<&mut ResponseContent>,
        cancel: &CancellationToken,
    ) -> Result<bool, ClientError> {
        match self {
            Candidate::Json(r) => r.consume_content(content, cancel).await,
            Candidate::Text(r) => r.consume_content(content, cancel).await,
            Candidate::Stream(r) => r.consume_content(content, cancel).await,
            Candidate::Head(r) => r.consume_content(content, cancel).await,
            Candidate::Empty(r) => r.consume_content(content, cancel).await,
        }
    }
}

/// A response that offers the content to several candidates in order.
///
/// The first candidate that accepts the content is the picked one; later
/// candidates are not consulted. Candidates that read the body before deciding
/// (streams, empty responses) accept everything, so put them last.
///
/// The default candidate list is JSON, then text, then stream.
///
/// # Example
///
/// ```ignore
/// let mut message = Message::<FlexibleResponse<Profile>>::new(Method::GET, "profile");
/// client.send(&mut message).await?;
///
/// match message.response().and_then(|r| r.picked()) {
///     Some(Candidate::Json(json)) => println!("{:?}", json.content()),
///     Some(Candidate::Text(text)) => println!("{:?}", text.content()),
///     _ => {}
/// }
/// ```
#[derive(Debug)]
pub struct FlexibleResponse<T> {
    headers: HeaderCollection,
    candidates: Vec<Candidate<T>>,
    picked: Option<usize>,
}

impl<T> Default for FlexibleResponse<T> {
    fn default() -> Self {
        Self::new([
            Candidate::Json(JsonResponse::new()),
            Candidate::Text(StringResponse::new()),
            Candidate::Stream(StreamResponse::new()),
        ])
    }
}

impl<T> FlexibleResponse<T> {
    /// Create a response over `candidates`, tried in the given order.
    pub fn new<I>(candidates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Candidate<T>>,
    {
        Self {
            headers: HeaderCollection::default(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            picked: None,
        }
    }

    /// The candidate that accepted the content.
    pub fn picked(&self) -> Option<&Candidate<T>> {
        self.picked.and_then(|index| self.candidates.get(index))
    }

    pub fn picked_mut(&mut self) -> Option<&mut Candidate<T>> {
        self.picked.and_then(|index| self.candidates.get_mut(index))
    }

    /// Position of the picked candidate in the candidate list.
    pub fn picked_index(&self) -> Option<usize> {
        self.picked
    }

    pub fn candidates(&self) -> &[Candidate<T>] {
        &self.candidates
    }

    pub fn into_picked(self) -> Option<Candidate<T>> {
        let index = self.picked?;
        self.candidates.into_iter().nth(index)
    }
}

impl<T> Response for FlexibleResponse<T>
where
    T: DeserializeOwned + Send,
{
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn set_headers(&mut self, headers: HeaderCollection) {
        for candidate in &mut self.candidates {
            candidate.set_headers(headers.clone());
        }
        self.headers = headers;
    }

    async fn consume_content(
        &mut self,
        mut content: Option<&mut ResponseContent>,
        cancel: &CancellationToken,
    ) -> Result<bool, ClientError> {
        self.picked = None;

        for (index, candidate) in self.candidates.iter_mut().enumerate() {
            if candidate.consume_content(content.as_deref_mut(), cancel).await? {
                tracing::debug!(index, kind = candidate.kind(), "picked response candidate");
                self.picked = Some(index);
                return Ok(true);
            }
        }

        tracing::debug!(
            candidates = self.candidates.len(),
            "no response candidate accepted content"
        );
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: String,
    }

    fn content(content_type: &'static str, body: &'static str) -> ResponseContent {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        ResponseContent::from_bytes(headers, body)
    }

    #[tokio::test]
    async fn test_picks_text_for_plain_text() {
        let mut response = FlexibleResponse::<Payload>::default();
        let mut body = content("text/plain", "hello");

        let accepted = response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();

        assert!(accepted);
        assert_eq!(response.picked_index(), Some(1));
        let text = response.picked().and_then(Candidate::as_text).unwrap();
        assert_eq!(text.content(), Some("hello"));
        assert!(response.candidates()[0].as_json().unwrap().content().is_none());
    }

    #[tokio::test]
    async fn test_picks_json_for_json() {
        let mut response = FlexibleResponse::<Payload>::default();
        let mut body = content("application/json", r#"{"value":"x"}"#);

        response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();

        let json = response.picked().and_then(Candidate::as_json).unwrap();
        assert_eq!(json.content().unwrap().value, "x");
    }

    #[tokio::test]
    async fn test_falls_through_to_stream() {
        let mut response = FlexibleResponse::<Payload>::default();
        let mut body = content("image/png", "png");

        response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.picked().map(Candidate::kind), Some("stream"));
    }

    #[tokio::test]
    async fn test_no_candidate_accepts() {
        let mut response = FlexibleResponse::<Payload>::new([Candidate::Json(JsonResponse::new())]);
        let mut body = content("text/plain", "nope");

        let accepted = response
            .consume_content(Some(&mut body), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!accepted);
        assert!(response.picked().is_none());
    }

    #[tokio::test]
    async fn test_headers_reach_candidates() {
        let mut response = FlexibleResponse::<Payload>::new([
            Candidate::from(StringResponse::new()),
            Candidate::from(HeadResponse::new()),
        ]);
        response.set_headers(HeaderCollection::unvalidated([("x-id", "1")]));

        assert_eq!(response.headers().get("x-id"), Some("1"));
        for candidate in response.candidates() {
            assert_eq!(candidate.headers().get("x-id"), Some("1"));
        }
    }
}
