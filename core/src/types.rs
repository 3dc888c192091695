//! Request, response and configuration values.
//!
//! Everything here is request-scoped and owned; nothing is shared between
//! calls.

use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::headers::HeaderSet;
use crate::http::HttpMethod;
use crate::revive::JsonValue;

/// One request to issue: method, URI, optional pre-serialized JSON body and
/// optional header overrides.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub uri: String,
    pub body: Option<String>,
    pub headers: Option<HeaderSet>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
            headers: None,
        }
    }

    /// Build a spec from textual parts, validating the method name.
    pub fn from_parts(
        method: &str,
        uri: impl Into<String>,
        body: Option<String>,
        headers: Option<HeaderSet>,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            method: method.parse()?,
            uri: uri.into(),
            body,
            headers,
        })
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, uri)
    }

    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, uri)
    }

    pub fn patch(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, uri)
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, uri)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, RequestError> {
        let body = serde_json::to_string(value).map_err(RequestError::Serialization)?;
        Ok(self.with_body(body))
    }

    /// Add a header override. Overrides are applied after the defaults.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.get_or_insert_with(HeaderSet::new).insert(name, value);
        self
    }
}

/// A successful response: status in {200, 201, 204, 304}.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Parsed body with dates revived, or `None` when the body was empty.
    pub data: Option<JsonValue>,
    pub headers: HeaderSet,
    pub status: u16,
}

/// Static configuration for an `ODataClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Headers sent with every request before body headers and overrides.
    #[serde(default = "HeaderSet::odata_defaults")]
    pub default_headers: HeaderSet,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_headers: HeaderSet::odata_defaults(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
