//! Ureq-based transport (blocking).
//!
//! ureq is synchronous, so each request runs on tokio's blocking pool and the
//! async caller only awaits the join handle.

use std::io::Read as _;

use tracing::debug;
use ureq::http;

use crate::error::TransportError;
use crate::headers::HeaderSet;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::HttpClient;

/// An [`HttpClient`] backed by [`ureq`].
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            // Status classification happens in `ODataClient`.
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(
            method = %request.method,
            secure = request.target.scheme.is_secure(),
            host = %request.target.host,
            port = request.target.port,
            path = %request.target.path,
            "sending request via ureq"
        );

        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || run_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::Other(Box::new(e)))?
    }
}

fn run_blocking(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = http::Request::builder()
        .method(request.method.as_str())
        .uri(request.url());
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }

    let result = match request.body {
        Some(body) => {
            let req = builder
                .body(body.into_bytes())
                .map_err(|e| TransportError::Other(Box::new(e)))?;
            agent.run(req)
        }
        None => {
            let req = builder.body(()).map_err(|e| TransportError::Other(Box::new(e)))?;
            agent.run(req)
        }
    };

    match result {
        Ok(resp) => convert_response(resp),
        Err(ureq::Error::Timeout(_)) => Err(TransportError::Timeout),
        Err(ureq::Error::HostNotFound) => Err(TransportError::Connection("host not found".to_owned())),
        Err(ureq::Error::ConnectionFailed) => Err(TransportError::Connection("connection failed".to_owned())),
        Err(ureq::Error::Io(e)) => Err(TransportError::Connection(e.to_string())),
        Err(e) => Err(TransportError::Other(Box::new(e))),
    }
}

fn convert_response(response: http::Response<ureq::Body>) -> Result<HttpResponse, TransportError> {
    let (parts, body) = response.into_parts();

    let mut headers = HeaderSet::new();
    for (name, value) in &parts.headers {
        headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }

    let mut bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    Ok(HttpResponse {
        status: parts.status.as_u16(),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
