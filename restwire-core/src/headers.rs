//! Ordered multi-value header collections.
//!
//! [`HeaderCollection`] stores headers as an ordered list of `(name, values)` entries.
//! Names are never deduplicated: adding the same name twice keeps two entries, and both
//! are applied to the wire request, where values accumulate additively.
//!
//! A collection is either [strict](HeaderValidation::Strict) or
//! [lenient](HeaderValidation::Lenient). The mode only matters when the collection is
//! applied to a wire request via [`HeaderCollection::apply_to`]:
//!
//! - Strict collections fail with a [`HeaderError`] on the first malformed name or value
//! - Lenient collections silently drop whatever the wire layer would reject
//!
//! # Example
//!
//! ```
//! use restwire_core::HeaderCollection;
//! use http::HeaderMap;
//!
//! let mut headers = HeaderCollection::unvalidated([("accept", "text/plain")]);
//! headers.add([("accept", "application/json")]);
//!
//! let mut wire = HeaderMap::new();
//! headers.apply_to(&mut wire).unwrap();
//!
//! let accepted: Vec<_> = wire.get_all("accept").iter().collect();
//! assert_eq!(accepted, ["text/plain", "application/json"]);
//! ```

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::{HeaderError, ParameterError, params};

/// How malformed headers are treated when a collection is applied to a wire request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeaderValidation {
    /// Malformed names or values fail with a [`HeaderError`].
    Strict,
    /// Malformed names or values are dropped.
    #[default]
    Lenient,
}

/// A single header name with zero or more values.
///
/// `values` is `None` when the value was absent at the source (for example a `None`
/// field converted through [`HeaderCollection::create`]). Such entries are kept in the
/// collection but never applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderEntry {
    name: String,
    values: Option<Vec<String>>,
}

impl HeaderEntry {
    /// Create an entry with a single value.
    pub fn single<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            values: Some(vec![value.into()]),
        }
    }

    /// Create an entry with several values.
    pub fn multi<N, I, V>(name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Create an entry whose value is absent.
    pub fn absent<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            values: None,
        }
    }

    /// The header name as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The header values, or `None` if absent.
    pub fn values(&self) -> Option<&[String]> {
        self.values.as_deref()
    }
}

impl<K: Into<String>> From<(K, String)> for HeaderEntry {
    fn from((name, value): (K, String)) -> Self {
        HeaderEntry::single(name, value)
    }
}

impl<'a, K: Into<String>> From<(K, &'a str)> for HeaderEntry {
    fn from((name, value): (K, &'a str)) -> Self {
        HeaderEntry::single(name, value)
    }
}

impl<K: Into<String>> From<(K, Option<String>)> for HeaderEntry {
    fn from((name, value): (K, Option<String>)) -> Self {
        match value {
            Some(value) => HeaderEntry::single(name, value),
            None => HeaderEntry::absent(name),
        }
    }
}

impl<'a, K: Into<String>> From<(K, Option<&'a str>)> for HeaderEntry {
    fn from((name, value): (K, Option<&'a str>)) -> Self {
        match value {
            Some(value) => HeaderEntry::single(name, value),
            None => HeaderEntry::absent(name),
        }
    }
}

impl<K: Into<String>> From<(K, Vec<String>)> for HeaderEntry {
    fn from((name, values): (K, Vec<String>)) -> Self {
        HeaderEntry::multi(name, values)
    }
}

impl<'a, K: Into<String>> From<(K, Vec<&'a str>)> for HeaderEntry {
    fn from((name, values): (K, Vec<&'a str>)) -> Self {
        HeaderEntry::multi(name, values)
    }
}

/// An ordered collection of headers with multi-value entries.
///
/// Owned by exactly one request or response. Entries can be appended with
/// [`add`](Self::add) but never removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<HeaderEntry>,
    validation: HeaderValidation,
}

impl HeaderCollection {
    /// Create a collection from any sequence of entries.
    ///
    /// Accepts `(name, value)`, `(name, Option<value>)` and `(name, Vec<value>)` pairs,
    /// so slices of tuples, `HashMap<String, String>` and `BTreeMap<String, Vec<String>>`
    /// all work directly.
    pub fn new<I, E>(entries: I, validation: HeaderValidation) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<HeaderEntry>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            validation,
        }
    }

    /// Create a strict collection.
    pub fn validated<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<HeaderEntry>,
    {
        Self::new(entries, HeaderValidation::Strict)
    }

    /// Create a lenient collection.
    pub fn unvalidated<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<HeaderEntry>,
    {
        Self::new(entries, HeaderValidation::Lenient)
    }

    /// Create a lenient collection from the fields of a struct or map.
    ///
    /// Field naming and value conversion follow [`params::to_pairs`]; fields whose
    /// value is `None` become absent entries and are never applied.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] if `value` is not a struct or map.
    pub fn create<T: Serialize + ?Sized>(value: &T) -> Result<Self, ParameterError> {
        Ok(Self::unvalidated(params::to_pairs(value)?))
    }

    /// Capture the headers of a wire message.
    ///
    /// Values of the same name are grouped into one entry, in wire order. Non-UTF-8
    /// bytes are replaced lossily. The result is lenient.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let entries = headers
            .keys()
            .map(|name| {
                HeaderEntry::multi(
                    name.as_str(),
                    headers
                        .get_all(name)
                        .iter()
                        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
                )
            })
            .collect();

        Self {
            entries,
            validation: HeaderValidation::Lenient,
        }
    }

    /// Append more entries after the existing ones.
    pub fn add<I, E>(&mut self, entries: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<HeaderEntry>,
    {
        self.entries.extend(entries.into_iter().map(Into::into));
    }

    /// A lenient collection holding this collection's entries followed by `other`'s.
    pub fn merged(&self, other: &HeaderCollection) -> HeaderCollection {
        HeaderCollection::unvalidated(self.entries.iter().chain(&other.entries).cloned())
    }

    /// The validation mode.
    pub fn validation(&self) -> HeaderValidation {
        self.validation
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, HeaderEntry> {
        self.entries.iter()
    }

    /// Number of entries (not values).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All values stored under `name`, compared case-insensitively, in insertion order.
    pub fn get_all<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
        self.entries
            .iter()
            .filter(move |entry| entry.name.eq_ignore_ascii_case(name))
            .filter_map(|entry| entry.values.as_deref())
            .flatten()
            .map(String::as_str)
    }

    /// The first value stored under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Append every entry to `target`.
    ///
    /// Values are appended, never replaced, so repeated names accumulate. Entries
    /// with absent values are skipped.
    ///
    /// # Errors
    ///
    /// Strict collections return a [`HeaderError`] for the first malformed name or
    /// value. The offending entry is not applied at all; entries before it already are.
    pub fn apply_to(&self, target: &mut HeaderMap) -> Result<(), HeaderError> {
        for entry in &self.entries {
            let Some(values) = entry.values.as_deref() else {
                continue;
            };

            match self.validation {
                HeaderValidation::Strict => apply_strict(&entry.name, values, target)?,
                HeaderValidation::Lenient => apply_lenient(&entry.name, values, target),
            }
        }
        Ok(())
    }
}

fn apply_strict(name: &str, values: &[String], target: &mut HeaderMap) -> Result<(), HeaderError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| HeaderError::InvalidName(name.to_string()))?;

    let parsed = values
        .iter()
        .map(|value| {
            HeaderValue::from_str(value).map_err(|_| HeaderError::InvalidValue {
                name: name.to_string(),
                value: value.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for value in parsed {
        target.append(header_name.clone(), value);
    }
    Ok(())
}

fn apply_lenient(name: &str, values: &[String], target: &mut HeaderMap) {
    let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
        tracing::debug!(header = %name, "dropping header with malformed name");
        return;
    };

    for value in values {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                target.append(header_name.clone(), value);
            }
            Err(_) => tracing::debug!(header = %name, "dropping malformed header value"),
        }
    }
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<E: Into<HeaderEntry>> Extend<E> for HeaderCollection {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.add(iter);
    }
}
