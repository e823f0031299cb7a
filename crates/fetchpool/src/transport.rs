//! Transport contract and the default HTTP implementation.
//!
//! Workers never talk to the network directly. Each worker owns one value
//! implementing [`Transport`] and hands it fully built [`TransportRequest`]s.
//! Transports are not shared between workers, so implementations need no
//! internal locking beyond what `Send + Sync` already demands.

use crate::error::{Error, Result};
use bytes::Bytes;
use core::time::Duration;
use reqwest::{Method, Url, header::HeaderMap};

/// A request ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Serialized payload. `None` sends no body at all.
    pub body: Option<Bytes>,
}

/// The raw result of a transport call.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status_code: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes a single request/response cycle.
///
/// Implementations must bound every call with their own timeout and report
/// expiry as [`Error::Network`]. A non-2xx status is not a transport failure.
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send;
}

/// [`Transport`] backed by a private [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a client whose calls are cut off after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the TLS backend or resolver cannot
    /// be initialized.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// The per-call timeout this transport enforces.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status_code = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status_code,
            headers,
            body,
        })
    }
}
