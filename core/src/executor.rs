//! Single-shot request execution.
//!
//! `RequestExecutor` glues the pure `ODataClient` to an `HttpClient`
//! transport. Each `execute` call builds, sends and classifies one request;
//! calls share only the immutable client configuration and the transport
//! handle, so they can run concurrently without interfering.

use tracing::{debug, instrument};

use crate::client::ODataClient;
use crate::error::RequestError;
use crate::headers::HeaderSet;
use crate::transport::HttpClient;
use crate::types::{ClientConfig, RequestSpec, Response};

#[derive(Debug, Clone)]
pub struct RequestExecutor<C> {
    client: ODataClient,
    transport: C,
}

impl<C: HttpClient> RequestExecutor<C> {
    pub fn new(config: ClientConfig, transport: C) -> Self {
        Self {
            client: ODataClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &ODataClient {
        &self.client
    }

    /// Issue `spec` and resolve to exactly one outcome.
    ///
    /// Configuration errors are returned before anything is sent. No retries
    /// and no timeout; dropping the future abandons the request.
    #[instrument(level = "debug", skip_all, fields(method = %spec.method, uri = %spec.uri))]
    pub async fn execute(&self, spec: RequestSpec) -> Result<Response, RequestError> {
        let request = self.client.build_request(spec)?;
        let response = self.transport.send(request).await?;
        debug!(status = response.status, bytes = response.body.len(), "response received");
        self.client.parse_response(response)
    }

    /// Issue a request from its textual parts.
    pub async fn execute_parts(
        &self,
        method: &str,
        uri: &str,
        body: Option<&str>,
        headers: Option<&HeaderSet>,
    ) -> Result<Response, RequestError> {
        let spec = RequestSpec::from_parts(method, uri, body.map(str::to_string), headers.cloned())?;
        self.execute(spec).await
    }
}

#[cfg(feature = "reqwest-client")]
impl RequestExecutor<crate::transport::ReqwestClient> {
    /// An executor with OData default headers over reqwest.
    pub fn with_reqwest() -> Result<Self, RequestError> {
        Ok(Self::new(ClientConfig::default(), crate::transport::ReqwestClient::new()?))
    }
}
