//! HTTP transport layer.
//!
//! The message pipeline talks to the network through the narrow [`Transport`]
//! contract: send one fully-formed request, get one response back, and stop early
//! when the cancellation token fires. Connection pooling, TLS, redirects and
//! retries belong to the transport, not to this crate.
//!
//! [`HyperTransport`] is the default implementation, built on hyper_util's legacy
//! client. It supports:
//!
//! - HTTP/1.1 and HTTP/2 with automatic protocol negotiation
//! - TLS with rustls (feature-gated)
//! - Connection pooling
//!
//! # Feature Flags
//!
//! TLS support requires enabling the appropriate features:
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Root certificates
//!
//! # Example
//!
//! ```ignore
//! use restwire_client::transport::HyperTransport;
//! use std::time::Duration;
//!
//! let transport = HyperTransport::builder()
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

mod body;
mod connector;
mod hyper;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::ClientError;

pub use body::{ResponseBody, TransportBody, empty_body, full_body};
pub use connector::{build_https_connector, default_tls_config, has_tls_support};
pub use hyper::{HyperTransport, HyperTransportBuilder};

// Re-export rustls types that users might need for TLS configuration
pub use rustls::ClientConfig as TlsClientConfig;

/// Sends one request and returns one response.
///
/// Implementations must be safe to share between concurrently executing
/// messages, and should return [`ClientError::Canceled`] once `cancel` fires.
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the response head.
    fn send(
        &self,
        request: http::Request<TransportBody>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<http::Response<ResponseBody>, ClientError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: http::Request<TransportBody>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<http::Response<ResponseBody>, ClientError>> + Send {
        (**self).send(request, cancel)
    }
}
