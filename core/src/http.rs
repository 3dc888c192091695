//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data.
//! `ODataClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; an `HttpClient` backend performs the actual
//! round-trip in between.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::RequestError;
use crate::headers::HeaderSet;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = RequestError;

    /// Method names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(RequestError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport selected by the URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain TCP.
    Http,
    /// TLS.
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn is_secure(self) -> bool {
        matches!(self, Scheme::Https)
    }
}

/// A request URI decomposed into the parts the transport needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path plus query string, always starting with `/`.
    pub path: String,
    url: Url,
}

impl Target {
    /// Parse `uri`, rejecting anything that is not `http` or `https`.
    pub fn parse(uri: &str) -> Result<Self, RequestError> {
        let url = Url::parse(uri)?;
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(RequestError::UnsupportedScheme(other.to_string())),
        };
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(RequestError::InvalidUri(url::ParseError::EmptyHost))?
            .to_string();
        let port = url.port().unwrap_or_else(|| scheme.default_port());
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        Ok(Self {
            scheme,
            host,
            port,
            path,
            url,
        })
    }

    /// The full, normalized URL.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ODataClient::build_request`. An `HttpClient` backend executes
/// it against the network and returns the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub target: Target,
    pub headers: HeaderSet,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn url(&self) -> &str {
        self.target.as_str()
    }
}

/// An HTTP response described as plain data.
///
/// The body has already been buffered in full and decoded as UTF-8 text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderSet,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = "FETCH".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(err, RequestError::InvalidMethod(m) if m == "FETCH"));
    }

    #[test]
    fn http_target_uses_default_port() {
        let target = Target::parse("http://api.example.com/items").unwrap();
        assert_eq!(target.scheme, Scheme::Http);
        assert_eq!(target.host, "api.example.com");
        assert_eq!(target.port, 80);
        assert_eq!(target.path, "/items");
        assert!(!target.scheme.is_secure());
    }

    #[test]
    fn https_target_keeps_explicit_port_and_query() {
        let target =
            Target::parse("https://org.example.com:8443/api/data/v9.2/accounts?$top=5").unwrap();
        assert_eq!(target.scheme, Scheme::Https);
        assert_eq!(target.port, 8443);
        assert_eq!(target.path, "/api/data/v9.2/accounts?$top=5");
    }

    #[test]
    fn unsupported_scheme_is_a_configuration_error() {
        let err = Target::parse("ftp://files.example.com/data").unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn garbage_uri_is_rejected() {
        let err = Target::parse("not a uri").unwrap_err();
        assert!(matches!(err, RequestError::InvalidUri(_)));
    }
}
