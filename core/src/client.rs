//! Stateless request builder and response classifier for OData JSON APIs.
//!
//! # Design
//! `ODataClient` holds only its default headers and carries no mutable state
//! between calls. `build_request` turns a `RequestSpec` into an `HttpRequest`
//! and `parse_response` turns an `HttpResponse` into the final outcome. The
//! round-trip in between belongs to an `HttpClient` backend, which keeps this
//! half deterministic and free of I/O.

use tracing::warn;

use crate::error::{ErrorResult, RequestError};
use crate::headers::{self, HeaderSet};
use crate::http::{HttpRequest, HttpResponse, Target};
use crate::revive;
use crate::types::{ClientConfig, RequestSpec, Response};

/// Statuses treated as success. Everything else is an error.
pub const SUCCESS_STATUSES: [u16; 4] = [200, 201, 204, 304];

pub fn is_success(status: u16) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

#[derive(Debug, Clone, Default)]
pub struct ODataClient {
    config: ClientConfig,
}

impl ODataClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn default_headers(&self) -> &HeaderSet {
        &self.config.default_headers
    }

    /// Resolve the target and assemble headers for `spec`.
    ///
    /// An empty body is treated as no body at all.
    pub fn build_request(&self, spec: RequestSpec) -> Result<HttpRequest, RequestError> {
        let target = Target::parse(&spec.uri)?;
        let body = spec.body.filter(|b| !b.is_empty());
        let headers = headers::assemble(&self.config.default_headers, body.as_deref(), spec.headers.as_ref());
        validate_headers(&headers)?;
        Ok(HttpRequest {
            method: spec.method,
            target,
            headers,
            body,
        })
    }

    /// Classify a buffered response by status.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Response, RequestError> {
        let HttpResponse { status, headers, body } = response;
        if !is_success(status) {
            let error = ErrorResult::from_body(status, &body);
            if error.is_unexpected() {
                warn!(status, "error response carried no usable error payload");
            }
            return Err(RequestError::Http(error));
        }

        let data = if body.is_empty() {
            None
        } else {
            let value = revive::parse(&body).map_err(|source| {
                warn!(status, error = %source, "success response body is not valid JSON");
                RequestError::Parse { status, source }
            })?;
            Some(value)
        };

        Ok(Response { data, headers, status })
    }
}

fn validate_headers(headers: &HeaderSet) -> Result<(), RequestError> {
    for (name, value) in headers.iter() {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(RequestError::InvalidHeader(format!("invalid header name {name:?}")));
        }
        if value.bytes().any(is_forbidden_value_byte) {
            return Err(RequestError::InvalidHeader(format!("invalid value for header {name}")));
        }
    }
    Ok(())
}

/// Control characters other than horizontal tab, and DEL.
fn is_forbidden_value_byte(b: u8) -> bool {
    (b < 0x20 && b != b'\t') || b == 0x7f
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorPayload, UNEXPECTED_ERROR};
    use crate::http::{HttpMethod, Scheme};
    use crate::revive::JsonValue;

    fn client() -> ODataClient {
        ODataClient::default()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: [("content-type", "application/json")].into_iter().collect(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_produces_default_headers_only() {
        let req = client().build_request(RequestSpec::get("http://api.example.com/items")).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url(), "http://api.example.com/items");
        assert_eq!(req.target.scheme, Scheme::Http);
        assert_eq!(req.headers, HeaderSet::odata_defaults());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_post_adds_content_headers() {
        let spec = RequestSpec::post("https://api.example.com/items").with_body(r#"{"name":"é"}"#);
        let req = client().build_request(spec).unwrap();
        assert_eq!(req.headers.get("Content-Type"), Some("application/json"));
        assert_eq!(req.headers.get("Content-Length"), Some("13"));
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"é"}"#));
    }

    #[test]
    fn empty_body_is_dropped() {
        let req = client()
            .build_request(RequestSpec::post("http://localhost/items").with_body(""))
            .unwrap();
        assert!(req.body.is_none());
        assert!(!req.headers.contains("Content-Length"));
    }

    #[test]
    fn custom_defaults_replace_odata_defaults() {
        let config = ClientConfig {
            default_headers: [("Accept", "text/plain")].into_iter().collect(),
        };
        let req = ODataClient::new(config)
            .build_request(RequestSpec::get("http://localhost/"))
            .unwrap();
        assert_eq!(req.headers.len(), 1);
        assert!(!req.headers.contains("OData-Version"));
    }

    #[test]
    fn config_with_case_variant_defaults_sends_one_override() {
        let config = ClientConfig::from_json_str(r#"{"default_headers":[["Accept","a"],["accept","b"]]}"#).unwrap();
        let req = ODataClient::new(config)
            .build_request(RequestSpec::get("http://localhost/").with_header("Accept", "x"))
            .unwrap();
        let accepts: Vec<_> = req.headers.iter().filter(|(n, _)| n.eq_ignore_ascii_case("accept")).collect();
        assert_eq!(accepts, vec![("Accept", "x")]);
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn build_rejects_unsupported_scheme() {
        let err = client().build_request(RequestSpec::get("file:///etc/hosts")).unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedScheme(s) if s == "file"));
    }

    #[test]
    fn build_rejects_header_injection() {
        let spec = RequestSpec::get("http://localhost/").with_header("X-Test", "a\r\nInjected: 1");
        let err = client().build_request(spec).unwrap_err();
        assert!(matches!(err, RequestError::InvalidHeader(_)));

        let spec = RequestSpec::get("http://localhost/").with_header("Bad Name", "x");
        let err = client().build_request(spec).unwrap_err();
        assert!(matches!(err, RequestError::InvalidHeader(_)));

        for value in ["a\u{1}b", "a\u{7f}b", "nul\0"] {
            let spec = RequestSpec::get("http://127.0.0.1:1/").with_header("X-Test", value);
            let err = client().build_request(spec).unwrap_err();
            assert!(matches!(err, RequestError::InvalidHeader(_)), "{value:?}");
        }

        let spec = RequestSpec::get("http://localhost/").with_header("X-Test", "tab\tis fine");
        assert!(client().build_request(spec).is_ok());
    }

    #[test]
    fn success_with_body_revives_dates() {
        let resp = client()
            .parse_response(response(200, r#"{"id":1,"createdAt":"2024-01-01T00:00:00.000Z"}"#))
            .unwrap();
        assert_eq!(resp.status, 200);
        let data = resp.data.unwrap();
        assert_eq!(data.get("id").and_then(JsonValue::as_i64), Some(1));
        let created = data.get("createdAt").and_then(JsonValue::as_date).unwrap();
        assert_eq!(created.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(resp.headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn every_success_status_with_empty_body_has_no_data() {
        for status in SUCCESS_STATUSES {
            let resp = client().parse_response(response(status, "")).unwrap();
            assert_eq!(resp.status, status);
            assert!(resp.data.is_none());
        }
    }

    #[test]
    fn malformed_success_body_is_a_parse_error() {
        let err = client().parse_response(response(201, "{\"id\":")).unwrap_err();
        assert!(matches!(err, RequestError::Parse { status: 201, .. }));
    }

    #[test]
    fn not_found_carries_service_error() {
        let err = client()
            .parse_response(response(404, r#"{"error":{"message":"Not Found"}}"#))
            .unwrap_err();
        let result = err.as_error_result().unwrap();
        assert_eq!(result.status, 404);
        assert_eq!(result.message(), "Not Found");
        assert_eq!(
            result.payload,
            ErrorPayload::Service(serde_json::json!({"message": "Not Found"}))
        );
    }

    #[test]
    fn server_error_with_text_body_is_unexpected() {
        let err = client().parse_response(response(500, "not json")).unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.as_error_result().unwrap().message(), UNEXPECTED_ERROR);
    }

    #[test]
    fn redirects_and_informational_statuses_are_errors() {
        for status in [100, 202, 301, 302, 307, 401, 503] {
            let err = client().parse_response(response(status, "")).unwrap_err();
            assert_eq!(err.status(), Some(status));
        }
    }
}
