//! Error types for header and parameter handling.
//!
//! - [`HeaderError`]: Malformed header names or values under strict injection
//! - [`ParameterError`]: Values that cannot be turned into name/value pairs

/// A header could not be applied to a wire request.
///
/// Only raised by collections built with [`HeaderValidation::Strict`](crate::HeaderValidation::Strict);
/// lenient collections drop malformed headers instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    /// The header name is not a valid HTTP field name.
    #[error("invalid header name: {0:?}")]
    InvalidName(String),

    /// A header value contains bytes that are not allowed in an HTTP field value.
    #[error("invalid value for header {name:?}: {value:?}")]
    InvalidValue { name: String, value: String },
}

/// A value could not be converted into name/value pairs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// The value serialized to something other than a map or struct.
    #[error("expected a struct or map, found {0}")]
    NotAnObject(&'static str),

    /// The value's `Serialize` implementation failed.
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for ParameterError {
    fn from(err: serde_json::Error) -> Self {
        ParameterError::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_error_display() {
        let err = HeaderError::InvalidName("bad name".into());
        assert_eq!(err.to_string(), "invalid header name: \"bad name\"");

        let err = HeaderError::InvalidValue {
            name: "x-test".into(),
            value: "a\nb".into(),
        };
        assert_eq!(err.to_string(), "invalid value for header \"x-test\": \"a\\nb\"");
    }

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::NotAnObject("null");
        assert_eq!(err.to_string(), "expected a struct or map, found null");
    }
}
