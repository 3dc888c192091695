//! Single-request helper for OData-style JSON APIs.
//!
//! # Overview
//! Issues one HTTP or HTTPS request with the standard OData headers, buffers
//! the response, parses JSON with date revival and classifies the outcome by
//! status code.
//!
//! # Design
//! - `ODataClient` is stateless: `build_request` produces an `HttpRequest`,
//!   `parse_response` consumes an `HttpResponse`. No I/O happens there.
//! - `HttpClient` backends (`ReqwestClient`, `UreqClient`) perform the
//!   round-trip and never interpret the status.
//! - `RequestExecutor` composes both and returns `Result<Response,
//!   RequestError>`, so exactly one outcome exists per request.

pub mod client;
pub mod error;
pub mod executor;
pub mod headers;
pub mod http;
pub mod revive;
pub mod transport;
pub mod types;

pub use client::{is_success, ODataClient, SUCCESS_STATUSES};
pub use error::{ErrorPayload, ErrorResult, RequestError, TransportError, UNEXPECTED_ERROR};
pub use executor::RequestExecutor;
pub use headers::HeaderSet;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Scheme, Target};
pub use revive::JsonValue;
#[cfg(feature = "reqwest-client")]
pub use transport::ReqwestClient;
#[cfg(feature = "ureq-client")]
pub use transport::UreqClient;
pub use transport::HttpClient;
pub use types::{ClientConfig, RequestSpec, Response};
