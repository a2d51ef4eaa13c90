//! The message driver.
//!
//! [`RestClient`] owns an optional base URI and a shared transport, and drives
//! one [`Message`] at a time through request building, sending and response
//! decoding. It holds no per-call state, so one client can serve any number of
//! concurrent messages.

use http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug_span};
use url::Url;

use crate::ClientError;
use crate::builder::ClientBuilder;
use crate::message::Message;
use crate::request::Request;
use crate::response::Response;
use crate::transport::Transport;

/// Sends typed messages through a [`Transport`].
///
/// # Example
///
/// ```ignore
/// use restwire_client::{JsonResponse, Message, Method, RestClient, transport::HyperTransport};
///
/// let client = RestClient::new(
///     HyperTransport::new()?,
///     Some("https://api.example.com/v1/".parse()?),
/// );
///
/// let mut message = Message::<JsonResponse<Profile>>::new(Method::GET, "profile");
/// match client.send(&mut message).await {
///     Ok(status) => println!("{status}: {:?}", message.response()),
///     Err(err) if err.is_status() => println!("failed, body: {:?}", message.response()),
///     Err(err) => return Err(err.into()),
/// }
/// ```
#[derive(Clone, Debug)]
pub struct RestClient<T> {
    transport: T,
    base_uri: Option<Url>,
}

impl<T: Transport> RestClient<T> {
    /// Create a client. Without a base URI every endpoint must be absolute.
    pub fn new(transport: T, base_uri: Option<Url>) -> Self {
        Self {
            transport,
            base_uri,
        }
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder<T> {
        ClientBuilder::new()
    }

    pub fn base_uri(&self) -> Option<&Url> {
        self.base_uri.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `message` and return the success status code.
    pub async fn send<Res, Req>(&self, message: &mut Message<Res, Req>) -> Result<StatusCode, ClientError>
    where
        Res: Response,
        Req: Request,
    {
        self.send_with_cancellation(message, &CancellationToken::new())
            .await
    }

    /// Send `message`, stopping when `cancel` fires.
    ///
    /// A token that is already canceled fails with [`ClientError::Canceled`]
    /// before anything is built or sent. Once the token fires, the pending
    /// transport call or body read is abandoned and the message fails with
    /// [`ClientError::Canceled`], even if the body would have failed to decode. A non-success status fails with
    /// [`ClientError::Status`] after the response content was decoded into the
    /// message.
    pub async fn send_with_cancellation<Res, Req>(
        &self,
        message: &mut Message<Res, Req>,
        cancel: &CancellationToken,
    ) -> Result<StatusCode, ClientError>
    where
        Res: Response,
        Req: Request,
    {
        if cancel.is_cancelled() {
            return Err(ClientError::Canceled);
        }

        let span = debug_span!(
            "restwire.send",
            method = %message.method(),
            endpoint = message.endpoint(),
            uri = tracing::field::Empty,
        );

        async move {
            let request = message.build_request(self.base_uri.as_ref(), cancel).await?;
            tracing::Span::current().record("uri", tracing::field::display(request.uri()));
            tracing::debug!("sending request");

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ClientError::Canceled),
                sent = self.transport.send(request, cancel) => sent,
            };
            let response = match sent {
                Ok(response) => response,
                Err(err) => {
                    tracing::debug!(error = %err, "transport failed");
                    message.mark_failed();
                    return Err(err);
                }
            };
            message.mark_sent();

            let status = message.build_response(response, cancel).await?;
            tracing::debug!(%status, "message succeeded");
            Ok(status)
        }
        .instrument(span)
        .await
    }
}
