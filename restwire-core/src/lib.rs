//! Core building blocks for restwire.
//!
//! This crate provides the transport-independent pieces shared by the
//! `restwire-client` message pipeline:
//!
//! - [`headers`]: Ordered multi-value header collections with strict or lenient injection
//! - [`query`]: Canonical, form-style query string encoding and parsing
//! - [`params`]: Conversion of serializable values into name/value pairs
//! - [`error`]: Error types for the above

pub mod error;
pub mod headers;
pub mod params;
pub mod query;

pub use error::{HeaderError, ParameterError};
pub use headers::{HeaderCollection, HeaderEntry, HeaderValidation};
pub use params::to_pairs;
pub use query::QueryParameters;
