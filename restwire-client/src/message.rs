//! Typed HTTP exchanges.
//!
//! A [`Message`] describes one exchange: an endpoint, a method, and factories for
//! the request and response variants. Driving it through a
//! [`RestClient`](crate::RestClient) builds the wire request, sends it, and decodes
//! the reply into the response variant before the status code is classified, so an
//! error body is always available after a failed send.
//!
//! # Example
//!
//! ```ignore
//! use restwire_client::{JsonResponse, Message, Method, QueryParameters};
//!
//! let mut message = Message::<JsonResponse<Vec<User>>>::query(Method::GET, "users", || {
//!     Some(QueryParameters::from_pairs([("page", "2")]))
//! });
//! client.send(&mut message).await?;
//! let users = message.response().and_then(|r| r.content());
//! ```

use http::{Method, StatusCode};
use restwire_core::{HeaderCollection, QueryParameters};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::ClientError;
use crate::content::{ResponseContent, split_content_headers};
use crate::request::{EmptyRequest, Request};
use crate::response::Response;
use crate::transport::{ResponseBody, TransportBody};

type Factory<T> = Box<dyn FnOnce() -> Option<T> + Send>;

/// Where a message is in its single pass through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageState {
    /// Not sent yet.
    Created,
    /// The wire request exists.
    RequestBuilt,
    /// The transport returned a response.
    Sent,
    /// The response variant has consumed the reply.
    ResponseBuilt,
    /// The status code indicated success.
    Succeeded,
    /// Something failed, including a non-success status.
    Failed,
}

/// One HTTP exchange with a typed request and response.
///
/// `Res` and `Req` are the response and request variants. Each factory runs at
/// most once and may return `None`, in which case that side is skipped: no
/// request headers or body are sent, or the reply body is not decoded.
///
/// A message is single use. Sending it a second time is a
/// [`ClientError::InvalidState`] error.
pub struct Message<Res, Req = EmptyRequest> {
    method: Method,
    endpoint: String,
    request_factory: Option<Factory<Req>>,
    response_factory: Option<Factory<Res>>,
    query_factory: Option<Factory<QueryParameters>>,
    // Outlives `query_factory`, which is taken when the request is built
    is_query: bool,
    status: Option<StatusCode>,
    request: Option<Req>,
    response: Option<Res>,
    state: MessageState,
}

impl<Res, Req> std::fmt::Debug for Message<Res, Req> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .field("is_query", &self.is_query)
            .field("status", &self.status)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<Res, Req> Message<Res, Req>
where
    Res: Default + Send + 'static,
    Req: Default + Send + 'static,
{
    /// Create a message whose variants are built with `Default`.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self::with_factories(
            method,
            endpoint,
            || Some(Req::default()),
            || Some(Res::default()),
        )
    }

    /// Create a query message.
    ///
    /// The rendered query is appended to the endpoint as `?{query}` before URI
    /// resolution.
    pub fn query<F>(method: Method, endpoint: impl Into<String>, query: F) -> Self
    where
        F: FnOnce() -> Option<QueryParameters> + Send + 'static,
    {
        Self::new(method, endpoint).with_query(query)
    }
}

impl<Res, Req> Message<Res, Req> {
    /// Create a message with explicit variant factories.
    pub fn with_factories<FReq, FRes>(
        method: Method,
        endpoint: impl Into<String>,
        request: FReq,
        response: FRes,
    ) -> Self
    where
        FReq: FnOnce() -> Option<Req> + Send + 'static,
        FRes: FnOnce() -> Option<Res> + Send + 'static,
    {
        Self {
            method,
            endpoint: endpoint.into(),
            request_factory: Some(Box::new(request)),
            response_factory: Some(Box::new(response)),
            query_factory: None,
            is_query: false,
            status: None,
            request: None,
            response: None,
            state: MessageState::Created,
        }
    }

    /// Turn this into a query message.
    ///
    /// Building the request fails with [`ClientError::InvalidState`] if `query`
    /// returns `None`.
    pub fn with_query<F>(mut self, query: F) -> Self
    where
        F: FnOnce() -> Option<QueryParameters> + Send + 'static,
    {
        self.query_factory = Some(Box::new(query));
        self.is_query = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns true for query messages.
    pub fn is_query(&self) -> bool {
        self.is_query
    }

    /// The wire status code, recorded for every reply including failures.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn state(&self) -> MessageState {
        self.state
    }

    /// The request variant that was sent.
    pub fn request(&self) -> Option<&Req> {
        self.request.as_ref()
    }

    /// The response variant, populated even when the status indicated failure.
    pub fn response(&self) -> Option<&Res> {
        self.response.as_ref()
    }

    pub fn response_mut(&mut self) -> Option<&mut Res> {
        self.response.as_mut()
    }

    /// Take the response variant, dropping everything else.
    pub fn into_response(self) -> Option<Res> {
        self.response
    }

    pub(crate) fn mark_sent(&mut self) {
        self.state = MessageState::Sent;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.state = MessageState::Failed;
    }

    fn resolve_uri(&mut self, base: Option<&Url>) -> Result<http::Uri, ClientError> {
        let endpoint = if self.is_query {
            let query = self
                .query_factory
                .take()
                .and_then(|factory| factory())
                .ok_or_else(|| {
                    ClientError::InvalidState("query message has no query parameters".into())
                })?;
            format!("{}?{}", self.endpoint, query)
        } else {
            self.endpoint.clone()
        };

        let mut url = match base {
            Some(base) => base.join(&endpoint),
            None => Url::parse(&endpoint),
        }
        .map_err(|e| ClientError::InvalidUri(format!("cannot resolve {endpoint:?}: {e}")))?;

        // Fragments never go on the wire
        url.set_fragment(None);

        url.as_str()
            .parse()
            .map_err(|e| ClientError::InvalidUri(format!("{url}: {e}")))
    }
}

impl<Res, Req> Message<Res, Req>
where
    Res: Response,
    Req: Request,
{
    /// Build the wire request.
    ///
    /// The endpoint is resolved against `base` following RFC 3986; an absolute
    /// endpoint ignores the base, and without a base the endpoint must be absolute.
    /// Request headers are applied first, then the content headers, which replace
    /// request headers of the same name.
    pub async fn build_request(
        &mut self,
        base: Option<&Url>,
        cancel: &CancellationToken,
    ) -> Result<http::Request<TransportBody>, ClientError> {
        if self.state != MessageState::Created {
            return Err(ClientError::InvalidState(format!(
                "message was already sent (state: {:?})",
                self.state
            )));
        }

        match self.assemble_request(base, cancel).await {
            Ok(request) => {
                self.state = MessageState::RequestBuilt;
                Ok(request)
            }
            Err(err) => {
                self.state = MessageState::Failed;
                Err(err)
            }
        }
    }

    async fn assemble_request(
        &mut self,
        base: Option<&Url>,
        cancel: &CancellationToken,
    ) -> Result<http::Request<TransportBody>, ClientError> {
        let uri = self.resolve_uri(base)?;

        let mut wire = http::Request::new(TransportBody::empty());
        *wire.method_mut() = self.method.clone();
        *wire.uri_mut() = uri;

        self.request = self.request_factory.take().and_then(|factory| factory());

        if let Some(request) = &self.request {
            request.headers().apply_to(wire.headers_mut())?;

            if let Some(content) = request.create_content(cancel).await? {
                let (headers, body) = content.into_parts();
                for name in headers.keys() {
                    wire.headers_mut().remove(name);
                }
                for (name, value) in &headers {
                    wire.headers_mut().append(name.clone(), value.clone());
                }
                *wire.body_mut() = TransportBody::full(body);
            }
        }

        Ok(wire)
    }

    /// Decode the wire response and classify its status.
    ///
    /// The status is recorded and the content consumed before classification,
    /// so the response variant holds the decoded error body when this returns
    /// [`ClientError::Status`].
    pub async fn build_response(
        &mut self,
        wire: http::Response<ResponseBody>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode, ClientError> {
        if !matches!(self.state, MessageState::RequestBuilt | MessageState::Sent) {
            return Err(ClientError::InvalidState(format!(
                "no request is awaiting a response (state: {:?})",
                self.state
            )));
        }

        let (parts, body) = wire.into_parts();
        self.status = Some(parts.status);

        if let Err(err) = self.consume(parts.headers, body, cancel).await {
            self.state = MessageState::Failed;
            return Err(err);
        }
        self.state = MessageState::ResponseBuilt;

        if !parts.status.is_success() {
            tracing::debug!(status = %parts.status, "response status indicates failure");
            self.state = MessageState::Failed;
            return Err(ClientError::status_error(parts.status));
        }

        self.state = MessageState::Succeeded;
        Ok(parts.status)
    }

    async fn consume(
        &mut self,
        headers: http::HeaderMap,
        body: ResponseBody,
        cancel: &CancellationToken,
    ) -> Result<(), ClientError> {
        self.response = self.response_factory.take().and_then(|factory| factory());

        if let Some(response) = self.response.as_mut() {
            let (headers, content_headers) = split_content_headers(headers);
            response.set_headers(HeaderCollection::from_header_map(&headers));

            let mut content = ResponseContent::new(content_headers, body);
            response.consume_content(Some(&mut content), cancel).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{JsonRequest, StringRequest};
    use crate::response::{EmptyResponse, JsonResponse, StringResponse};
    use crate::transport::full_body;
    use http::header::{CONTENT_TYPE, HeaderValue};
    use http_body_util::BodyExt;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Deserialize)]
    struct ErrorEnvelope {
        code: u32,
        message: String,
    }

    #[derive(Serialize)]
    struct NewItem {
        name: &'static str,
    }

    fn wire_response(status: StatusCode, content_type: &'static str, body: &'static str) -> http::Response<ResponseBody> {
        let mut response = http::Response::new(full_body(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response.headers_mut().insert("x-request-id", HeaderValue::from_static("42"));
        response
    }

    fn base() -> Url {
        Url::parse("https://api.example.com/v1/").unwrap()
    }

    #[tokio::test]
    async fn test_relative_endpoint_joins_base() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::new(Method::GET, "items/7");

        let request = message.build_request(Some(&base()), &cancel).await.unwrap();
        assert_eq!(request.uri(), "https://api.example.com/v1/items/7");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(message.state(), MessageState::RequestBuilt);
    }

    #[tokio::test]
    async fn test_absolute_endpoint_wins() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::new(Method::GET, "http://other.test/ping#top");

        let request = message.build_request(Some(&base()), &cancel).await.unwrap();
        assert_eq!(request.uri(), "http://other.test/ping");
    }

    #[tokio::test]
    async fn test_relative_endpoint_without_base() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::new(Method::GET, "items");

        let err = message.build_request(None, &cancel).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidUri(_)));
        assert_eq!(message.state(), MessageState::Failed);
    }

    #[tokio::test]
    async fn test_query_is_appended() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::query(Method::GET, "search", || {
            Some(QueryParameters::from_pairs([("q", "foo bar"), ("lang", "en")]))
        });
        assert!(message.is_query());

        let request = message.build_request(Some(&base()), &cancel).await.unwrap();
        assert_eq!(
            request.uri(),
            "https://api.example.com/v1/search?q=foo+bar&lang=en"
        );
        assert!(message.is_query());
        assert!(!Message::<EmptyResponse>::new(Method::GET, "search").is_query());
    }

    #[tokio::test]
    async fn test_query_message_without_query() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::query(Method::GET, "search", || None);

        let err = message.build_request(Some(&base()), &cancel).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_headers_and_content() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse, JsonRequest<NewItem>>::with_factories(
            Method::POST,
            "items",
            || {
                let mut request = JsonRequest::new(NewItem { name: "lamp" });
                request.headers_mut().add([
                    ("Accept", "application/json"),
                    ("X-Tag", "a"),
                    ("X-Tag", "b"),
                    ("Content-Type", "text/plain"),
                ]);
                Some(request)
            },
            || Some(EmptyResponse::new()),
        );

        let request = message.build_request(Some(&base()), &cancel).await.unwrap();
        let headers = request.headers();
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers.get_all("x-tag").iter().count(), 2);
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers[CONTENT_TYPE], "application/json; charset=utf-8");

        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), br#"{"name":"lamp"}"#);

        // The realized request stays inspectable
        assert_eq!(message.request().unwrap().content().name, "lamp");
    }

    #[tokio::test]
    async fn test_missing_request_sends_nothing() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse, StringRequest>::with_factories(
            Method::PUT,
            "https://api.example.com/items",
            || None,
            || None,
        );

        let request = message.build_request(None, &cancel).await.unwrap();
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
        assert!(message.request().is_none());
    }

    #[tokio::test]
    async fn test_strict_header_error() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::with_factories(
            Method::GET,
            "items",
            || {
                Some(EmptyRequest::with_headers(HeaderCollection::validated([(
                    "Bad Header",
                    "x",
                )])))
            },
            || Some(EmptyResponse::new()),
        );

        let err = message.build_request(Some(&base()), &cancel).await.unwrap_err();
        assert!(matches!(err, ClientError::Header(_)));
    }

    #[tokio::test]
    async fn test_single_use() {
        let cancel = CancellationToken::new();
        let mut message = Message::<EmptyResponse>::new(Method::GET, "items");
        message.build_request(Some(&base()), &cancel).await.unwrap();

        let err = message.build_request(Some(&base()), &cancel).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_error_body_is_decoded_before_status_error() {
        let cancel = CancellationToken::new();
        let mut message = Message::<JsonResponse<ErrorEnvelope>>::new(Method::GET, "items");
        message.build_request(Some(&base()), &cancel).await.unwrap();

        let wire = wire_response(
            StatusCode::BAD_REQUEST,
            "application/json",
            r#"{"code":17,"message":"name is required"}"#,
        );
        let err = message.build_response(wire, &cancel).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(message.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(message.state(), MessageState::Failed);

        let envelope = message.response().and_then(|r| r.content()).unwrap();
        assert_eq!(envelope.code, 17);
        assert_eq!(envelope.message, "name is required");
    }

    #[tokio::test]
    async fn test_success_splits_headers() {
        let cancel = CancellationToken::new();
        let mut message = Message::<StringResponse>::new(Method::GET, "items");
        message.build_request(Some(&base()), &cancel).await.unwrap();

        let status = message
            .build_response(wire_response(StatusCode::OK, "text/plain", "OK"), &cancel)
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(message.state(), MessageState::Succeeded);

        let response = message.into_response().unwrap();
        assert_eq!(response.content(), Some("OK"));
        assert_eq!(response.headers().get("x-request-id"), Some("42"));
        assert_eq!(response.headers().get("content-type"), None);
    }

    #[tokio::test]
    async fn test_response_before_request() {
        let cancel = CancellationToken::new();
        let mut message = Message::<StringResponse>::new(Method::GET, "items");

        let err = message
            .build_response(wire_response(StatusCode::OK, "text/plain", "OK"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidState(_)));
        assert_eq!(message.status(), None);
    }
}
