//! Pluggable HTTP transports.
//!
//! A transport performs exactly one round-trip: send the request, buffer the
//! whole body as UTF-8 text, and hand it back without looking at the status.
//! Redirects are never followed.

use std::future::Future;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "reqwest-client")]
mod reqwest_client;
#[cfg(feature = "reqwest-client")]
pub use reqwest_client::ReqwestClient;

#[cfg(feature = "ureq-client")]
mod ureq_client;
#[cfg(feature = "ureq-client")]
pub use ureq_client::UreqClient;

/// Trait for HTTP client backends.
pub trait HttpClient: Send + Sync {
    /// Send `request` and return the buffered response, whatever its status.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
