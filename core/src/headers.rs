//! Header sets and request header assembly.
//!
//! # Design
//! Headers are kept as ordered `(name, value)` pairs, the same shape the
//! test vectors use. Lookups and replacement compare names
//! case-insensitively; the spelling of the most recent insert is kept.

use serde::{Deserialize, Serialize};

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const ODATA_MAX_VERSION: &str = "OData-MaxVersion";
pub const ODATA_VERSION: &str = "OData-Version";

pub const APPLICATION_JSON: &str = "application/json";

/// Ordered collection of header name/value pairs.
///
/// Deserialization goes through [`HeaderSet::insert`], so names that differ
/// only in case collapse to the last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed OData defaults sent with every request.
    pub fn odata_defaults() -> Self {
        let mut headers = Self::new();
        headers.insert(ACCEPT, APPLICATION_JSON);
        headers.insert(ODATA_MAX_VERSION, "4.0");
        headers.insert(ODATA_VERSION, "4.0");
        headers
    }

    /// Set `name` to `value`, replacing any entry with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.0[i] = (name, value),
            None => self.0.push((name, value)),
        }
    }

    /// Add `value` under `name`, joining onto an existing entry with `", "`.
    pub fn append(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into();
        match self.position(&name) {
            Some(i) => {
                let existing = &mut self.0[i].1;
                existing.push_str(", ");
                existing.push_str(value.as_ref());
            }
            None => self.0.push((name, value.as_ref().to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.0[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Apply every entry of `other` on top of `self`.
    pub fn extend(&mut self, other: &HeaderSet) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl From<Vec<(String, String)>> for HeaderSet {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<HeaderSet> for Vec<(String, String)> {
    fn from(headers: HeaderSet) -> Self {
        headers.0
    }
}

/// Merge defaults, body-derived headers, then caller overrides.
///
/// `Content-Length` is the UTF-8 byte length of `body`, not its character
/// count.
pub fn assemble(defaults: &HeaderSet, body: Option<&str>, overrides: Option<&HeaderSet>) -> HeaderSet {
    let mut headers = defaults.clone();
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        headers.insert(CONTENT_TYPE, APPLICATION_JSON);
        headers.insert(CONTENT_LENGTH, body.len().to_string());
    }
    if let Some(overrides) = overrides {
        headers.extend(overrides);
    }
    headers
}
