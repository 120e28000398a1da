use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Proxy,
    header::{HeaderName, HeaderValue},
};
use tracing::error;

use crate::{
    args::DEFAULT_USER_AGENT,
    error::{AppError, AppResult, HttpError},
};

use super::execution::{drain_response_body, into_failure};
use super::{RequestSpec, Transport, TransportFailure};

/// Connection-level settings for the shared client.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
        }
    }
}

/// `reqwest`-backed transport. One client (and one connection pool) is shared
/// by every worker.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the shared client for `spec`, validating its headers and proxy.
    ///
    /// # Errors
    ///
    /// Returns an error when a header name/value is invalid, the proxy cannot
    /// be configured, or the client fails to build.
    pub fn new(spec: &RequestSpec, settings: &TransportSettings) -> AppResult<Self> {
        for (key, value) in spec.headers() {
            HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderName {
                    header: key.clone(),
                    source: err,
                })
            })?;
            HeaderValue::from_str(value).map_err(|err| {
                AppError::http(HttpError::InvalidHeaderValue {
                    header: key.clone(),
                    source: err,
                })
            })?;
        }

        let mut client_builder = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .user_agent(DEFAULT_USER_AGENT);

        if let Some(proxy_spec) = spec.proxy() {
            let mut proxy = Proxy::all(proxy_spec.url().as_str()).map_err(|err| {
                error!("Invalid proxy URL '{}': {}", proxy_spec.url(), err);
                AppError::http(HttpError::InvalidProxyUrl {
                    url: proxy_spec.url().to_string(),
                    source: err,
                })
            })?;
            if let Some(credentials) = proxy_spec.credentials() {
                proxy = proxy.basic_auth(&credentials.username, &credentials.password);
            }
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::http(HttpError::BuildClientFailed { source: err })
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        spec: &RequestSpec,
        timeout: Duration,
    ) -> Result<u16, TransportFailure> {
        let mut request_builder = self
            .client
            .request(spec.method().to_reqwest(), spec.url().clone())
            .timeout(timeout);
        for (key, value) in spec.headers() {
            request_builder = request_builder.header(key, value);
        }
        if let Some(body) = spec.body() {
            request_builder = request_builder.body(body.to_vec());
        }

        let response = request_builder
            .send()
            .await
            .map_err(|err| into_failure(&err))?;
        let status = response.status().as_u16();
        drain_response_body(response)
            .await
            .map_err(|err| into_failure(&err))?;
        Ok(status)
    }
}
