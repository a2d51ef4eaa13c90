//! Typed HTTP messaging for Rust.
//!
//! This crate turns declarative message descriptions into HTTP exchanges. A
//! [`Message`] pairs an endpoint and a method with a request variant and a
//! response variant; a [`RestClient`] builds the wire request, sends it through a
//! [`Transport`], decodes the reply and classifies the status code.
//!
//! ## Features
//!
//! - Request bodies: none, text, or JSON
//! - Response bodies: text, JSON, raw stream, headers only, or content-negotiated
//!   between several of those ([`FlexibleResponse`])
//! - Ordered multi-value headers with strict or lenient validation
//! - Canonical query string encoding from pairs or any `Serialize` value
//! - Error bodies decoded before a non-success status is reported
//! - Cancellation at every suspension point
//!
//! ## Example
//!
//! ```ignore
//! use restwire_client::{JsonRequest, JsonResponse, Message, Method, RestClient};
//! use restwire_client::transport::HyperTransport;
//!
//! let client = RestClient::builder()
//!     .base_uri("https://api.example.com/v1/")
//!     .transport(HyperTransport::new()?)
//!     .build()?;
//!
//! let mut message = Message::<JsonResponse<Order>, JsonRequest<NewOrder>>::with_factories(
//!     Method::POST,
//!     "orders",
//!     move || Some(JsonRequest::new(new_order)),
//!     || Some(JsonResponse::new()),
//! );
//!
//! match client.send(&mut message).await {
//!     Ok(status) => println!("{status}: {:?}", message.response().and_then(|r| r.content())),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! ## Cancellation
//!
//! [`RestClient::send_with_cancellation`] takes a [`CancellationToken`]. A token
//! canceled before the call fails immediately without touching the transport;
//! a token canceled mid-flight stops the network exchange or body decoding with
//! [`ClientError::Canceled`].

mod builder;
mod client;
pub mod content;
mod error;
pub mod message;
pub mod request;
pub mod response;
pub mod transport;

#[cfg(test)]
mod testing;

pub use builder::{ClientBuildError, ClientBuilder};
pub use client::RestClient;
pub use error::ClientError;
pub use message::{Message, MessageState};

pub use content::{RequestContent, ResponseContent};
pub use request::{EmptyRequest, JsonRequest, Request, StringRequest};
pub use response::{
    Candidate, EmptyResponse, FlexibleResponse, HeadResponse, JsonResponse, Response,
    ResponseStream, StreamResponse, StringResponse,
};

// Re-export transport types at the top level for convenience
pub use transport::{HyperTransport, HyperTransportBuilder, TlsClientConfig, Transport, TransportBody};

// Re-export core types that users need
pub use restwire_core::{
    HeaderCollection, HeaderEntry, HeaderError, HeaderValidation, ParameterError, QueryParameters,
};

pub use http::{Method, StatusCode};
pub use encoding_rs::Encoding;
pub use tokio_util::sync::CancellationToken;
pub use url::Url;
