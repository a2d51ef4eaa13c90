//! Client builder.
//!
//! Provides a fluent API for configuring and building a [`RestClient`].

use url::Url;

use crate::client::RestClient;
use crate::transport::Transport;

/// Builder for creating a [`RestClient`].
///
/// # Example
///
/// ```ignore
/// use restwire_client::{RestClient, transport::HyperTransport};
///
/// let client = RestClient::builder()
///     .base_uri("https://api.example.com/v1/")
///     .transport(HyperTransport::new()?)
///     .build()?;
/// ```
pub struct ClientBuilder<T> {
    /// Base URI relative endpoints are resolved against.
    base_uri: Option<String>,
    /// Transport used to send requests.
    transport: Option<T>,
}

impl<T> Default for ClientBuilder<T> {
    fn default() -> Self {
        Self {
            base_uri: None,
            transport: None,
        }
    }
}

impl<T> std::fmt::Debug for ClientBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_uri", &self.base_uri)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl<T: Transport> ClientBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URI.
    ///
    /// Endpoints are resolved against it following RFC 3986, so a base path
    /// should end with `/` for relative endpoints to extend it:
    /// `https://host/v1/` + `users` is `https://host/v1/users`, while
    /// `https://host/v1` + `users` is `https://host/users`.
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    /// Set the transport. Required.
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport was set, or if the base URI is not an
    /// absolute `http`/`https` URI.
    pub fn build(self) -> Result<RestClient<T>, ClientBuildError> {
        let transport = self.transport.ok_or(ClientBuildError::MissingTransport)?;

        let base_uri = self.base_uri.map(|uri| parse_base_uri(&uri)).transpose()?;

        Ok(RestClient::new(transport, base_uri))
    }
}

fn parse_base_uri(uri: &str) -> Result<Url, ClientBuildError> {
    let invalid = |reason: String| ClientBuildError::InvalidBaseUri {
        uri: uri.to_string(),
        reason,
    };

    let url = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be a base".into()));
    }
    Ok(url)
}

/// Error type for client building failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClientBuildError {
    /// No transport was supplied.
    #[error("a transport is required")]
    MissingTransport,

    /// The base URI is not usable.
    #[error("invalid base uri {uri:?}: {reason}")]
    InvalidBaseUri { uri: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::<MockTransport>::new();
        assert!(builder.base_uri.is_none());
        assert!(builder.transport.is_none());
    }

    #[test]
    fn test_missing_transport() {
        let err = ClientBuilder::<MockTransport>::new()
            .base_uri("http://localhost:3000/")
            .build()
            .unwrap_err();
        assert_eq!(err, ClientBuildError::MissingTransport);
    }

    #[test]
    fn test_base_uri_is_optional() {
        let client = ClientBuilder::new()
            .transport(MockTransport::default())
            .build()
            .unwrap();
        assert!(client.base_uri().is_none());
    }

    #[test]
    fn test_base_uri_is_parsed() {
        let client = ClientBuilder::new()
            .base_uri("http://localhost:3000/api/")
            .transport(MockTransport::default())
            .build()
            .unwrap();
        assert_eq!(
            client.base_uri().map(Url::as_str),
            Some("http://localhost:3000/api/")
        );
    }

    #[test]
    fn test_invalid_base_uri() {
        for uri in ["not a uri", "api/v1", "mailto:someone@example.com", "ftp://files.test/"] {
            let err = ClientBuilder::new()
                .base_uri(uri)
                .transport(MockTransport::default())
                .build()
                .unwrap_err();
            assert!(matches!(err, ClientBuildError::InvalidBaseUri { .. }), "{uri}");
        }
    }
}
