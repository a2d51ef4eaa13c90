//! In-process transport for unit tests.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use http::{Method, StatusCode, Uri};
use http_body::{Body, Frame};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;

use crate::ClientError;
use crate::transport::{ResponseBody, Transport, TransportBody, full_body};

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug)]
struct Reply {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: &'static str,
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<Reply>,
    requests: Vec<RecordedRequest>,
}

/// Records every request and answers with queued replies, or `200 OK` with no
/// body once the queue is empty.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn reply(self, status: StatusCode, content_type: Option<&'static str>, body: &'static str) -> Self {
        self.state.lock().unwrap().replies.push_back(Reply {
            status,
            content_type,
            body,
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Transport for MockTransport {
    async fn send(
        &self,
        request: http::Request<TransportBody>,
        cancel: &CancellationToken,
    ) -> Result<http::Response<ResponseBody>, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Canceled);
        }

        let (parts, body) = request.into_parts();
        let body = body.collect().await?.to_bytes();

        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(RecordedRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
            state.replies.pop_front()
        };

        let reply = reply.unwrap_or(Reply {
            status: StatusCode::OK,
            content_type: None,
            body: "",
        });

        let mut response = http::Response::new(full_body(reply.body));
        *response.status_mut() = reply.status;
        if let Some(content_type) = reply.content_type {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        Ok(response)
    }
}

/// Which part of the exchange a [`StalledTransport`] never finishes.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Stall {
    /// The send itself never completes.
    Send,
    /// A `200 OK` JSON reply arrives, but its body never yields a frame.
    Body,
}

/// A transport that only ever ends through cancellation.
#[derive(Clone, Debug)]
pub(crate) struct StalledTransport {
    stall: Stall,
}

impl StalledTransport {
    pub fn new(stall: Stall) -> Self {
        Self { stall }
    }
}

struct StalledBody;

impl Body for StalledBody {
    type Data = Bytes;
    type Error = ClientError;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Pending
    }
}

impl Transport for StalledTransport {
    async fn send(
        &self,
        _request: http::Request<TransportBody>,
        _cancel: &CancellationToken,
    ) -> Result<http::Response<ResponseBody>, ClientError> {
        match self.stall {
            Stall::Send => std::future::pending().await,
            Stall::Body => {
                let mut response = http::Response::new(StalledBody.boxed_unsync());
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Ok(response)
            }
        }
    }
}
