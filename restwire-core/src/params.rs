//! Conversion of serializable values into name/value pairs.
//!
//! [`to_pairs`] is the bridge used by [`HeaderCollection::create`](crate::HeaderCollection::create)
//! and [`QueryParameters::create`](crate::QueryParameters::create). Any struct or map that
//! implements [`Serialize`] can be flattened into `(name, value)` pairs, one per field, in
//! declaration order.
//!
//! Per-field overrides are attached where the field is declared, using serde attributes:
//!
//! - `#[serde(rename = "...")]` changes the emitted name
//! - `#[serde(serialize_with = "...")]` replaces the value conversion; serializing `None`
//!   (or unit) drops the value
//!
//! # Example
//!
//! ```
//! use restwire_core::to_pairs;
//! use serde::{Serialize, Serializer};
//!
//! fn labelled<S: Serializer>(value: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
//!     match value {
//!         Some(v) => s.serialize_str(&format!("Value-is({v})")),
//!         None => s.serialize_none(),
//!     }
//! }
//!
//! #[derive(Serialize)]
//! struct Search {
//!     #[serde(rename = "q")]
//!     text: String,
//!     #[serde(serialize_with = "labelled")]
//!     page: Option<i32>,
//! }
//!
//! let pairs = to_pairs(&Search { text: "rust".into(), page: Some(2) }).unwrap();
//! assert_eq!(pairs, vec![
//!     ("q".to_string(), Some("rust".to_string())),
//!     ("page".to_string(), Some("Value-is(2)".to_string())),
//! ]);
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::ParameterError;

/// Flatten a struct or map into `(name, value)` pairs.
///
/// Values are rendered as follows:
///
/// | JSON form | Result |
/// |-----------|--------|
/// | string | the string itself |
/// | number, bool | display form (`42`, `2.5`, `true`) |
/// | null | `None` |
/// | array, object | compact JSON text |
///
/// # Errors
///
/// Returns [`ParameterError::NotAnObject`] when `value` does not serialize to a map
/// (including `None` and unit), and [`ParameterError::Serialize`] when serialization fails.
pub fn to_pairs<T>(value: &T) -> Result<Vec<(String, Option<String>)>, ParameterError>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, stringify(value)))
            .collect()),
        other => Err(ParameterError::NotAnObject(kind(&other))),
    }
}

fn stringify(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other @ (Value::Array(_) | Value::Object(_)) => Some(other.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
