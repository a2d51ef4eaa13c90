//! Canonical query string encoding.
//!
//! [`QueryParameters`] is an immutable, ordered list of key/value pairs rendered as a
//! form-style query string:
//!
//! - Pairs are joined with `&`, each rendered as `key=value`
//! - ASCII letters, digits and `-_.!*()` are emitted verbatim
//! - Space is emitted as `+`
//! - Every other byte of the UTF-8 encoding is emitted as `%xx` with lowercase hex
//!
//! Pairs keep their input order and duplicate keys stay separate pairs.
//!
//! # Example
//!
//! ```
//! use restwire_core::QueryParameters;
//!
//! let query = QueryParameters::from_pairs([("q", "foo bar"), ("sort", "a&b")]);
//! assert_eq!(query.to_string(), "q=foo+bar&sort=a%26b");
//!
//! // Re-parsing a rendered query is lossless.
//! let reparsed = QueryParameters::parse(&query.to_string());
//! assert_eq!(reparsed.to_string(), query.to_string());
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode;
use serde::Serialize;

use crate::{ParameterError, params};

const HEX: &[u8; 16] = b"0123456789abcdef";

#[derive(Clone, Debug, PartialEq, Eq)]
struct QueryPair {
    /// `None` for a bare segment (no `=`) read from a raw query string.
    key: Option<String>,
    value: String,
}

/// An ordered set of query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pairs: Vec<QueryPair>,
}

impl QueryParameters {
    /// Parse an already-encoded query string.
    ///
    /// A leading `?` is ignored and an empty string yields no parameters. Segments
    /// without `=` are kept as bare values. `+` decodes to a space and malformed
    /// `%` escapes are kept literally.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        if query.is_empty() {
            return Self::default();
        }

        let mut segments: Vec<&str> = query.split('&').collect();
        if segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }

        let pairs = segments
            .into_iter()
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => QueryPair {
                    key: Some(decode(key)),
                    value: decode(value),
                },
                None => QueryPair {
                    key: None,
                    value: decode(segment),
                },
            })
            .collect();

        Self { pairs }
    }

    /// Build from unencoded key/value pairs.
    ///
    /// Pairs whose key is empty or whitespace-only are dropped. Empty values are kept
    /// and render as `key=`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::from_optional_pairs(pairs.into_iter().map(|(k, v)| (k, Some(v))))
    }

    /// Build from unencoded key/value pairs whose values may be absent.
    ///
    /// Same as [`from_pairs`](Self::from_pairs), and additionally drops pairs whose
    /// value is `None`.
    pub fn from_optional_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .filter(|(key, _)| !key.as_ref().trim().is_empty())
            .filter_map(|(key, value)| {
                value.map(|value| QueryPair {
                    key: Some(key.as_ref().to_string()),
                    value: value.into(),
                })
            })
            .collect();

        Self { pairs }
    }

    /// Build from the fields of a struct or map, in declaration order.
    ///
    /// See [`params::to_pairs`] for naming and conversion rules. Fields that convert
    /// to `None` are dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] if `value` is not a struct or map.
    pub fn create<T: Serialize + ?Sized>(value: &T) -> Result<Self, ParameterError> {
        Ok(Self::from_optional_pairs(params::to_pairs(value)?))
    }

    /// Iterate over decoded `(key, value)` pairs. Bare segments have no key.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.pairs
            .iter()
            .map(|pair| (pair.key.as_deref(), pair.value.as_str()))
    }

    /// All values stored under `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |pair| pair.key.as_deref() == Some(key))
            .map(|pair| pair.value.as_str())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (index, pair) in self.pairs.iter().enumerate() {
            if index > 0 {
                out.push('&');
            }
            if let Some(key) = &pair.key {
                encode_into(key, &mut out);
                out.push('=');
            }
            encode_into(&pair.value, &mut out);
        }
        f.write_str(&out)
    }
}

impl FromStr for QueryParameters {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'*' | b'(' | b')')
}

fn encode_into(input: &str, out: &mut String) {
    for &byte in input.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else if byte == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0f) as usize] as char);
        }
    }
}

fn decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    percent_decode(spaced.as_bytes()).decode_utf8_lossy().into_owned()
}
