// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Thin HTTP seam used by the transport, so it can be exercised without a
//! real network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::debug;

use crate::constants::{DEFAULT_TIMEOUT_SECS, TENANT_HEADER};
use crate::errors::TransportError;

#[async_trait]
pub trait LokiHttpClient: Send + Sync {
    /// POSTs `body` to `path`, relative to the client's base address.
    /// Any non-2xx status is an error.
    async fn post(&self, path: &str, body: Vec<u8>, content_type: &str)
        -> Result<(), TransportError>;
}

/// Builds the HTTP client for a resolved endpoint. Called once per target,
/// the first time a transport is needed.
pub type HttpClientFactory =
    Arc<dyn Fn(&Url) -> Result<Arc<dyn LokiHttpClient>, TransportError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub https_proxy: Option<String>,
    pub tenant_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            https_proxy: None,
            tenant_id: None,
            username: None,
            password: None,
        }
    }
}

impl HttpClientConfig {
    /// Factory producing [`ReqwestLokiClient`]s with this configuration.
    pub fn into_factory(self) -> HttpClientFactory {
        Arc::new(move |base: &Url| {
            let client = ReqwestLokiClient::new(base.clone(), &self)?;
            Ok(Arc::new(client) as Arc<dyn LokiHttpClient>)
        })
    }
}

/// Joins `path` onto `base`, keeping any path prefix of the base.
pub fn join_url(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub struct ReqwestLokiClient {
    client: reqwest::Client,
    base: Url,
    tenant_id: Option<String>,
    basic_auth: Option<(String, Option<String>)>,
}

impl ReqwestLokiClient {
    pub fn new(base: Url, config: &HttpClientConfig) -> Result<Self, TransportError> {
        let client = build_client(config.https_proxy.as_deref(), config.timeout)?;
        debug!(url = %base, "Loki HTTP client initialized");

        Ok(Self {
            client,
            base,
            tenant_id: config.tenant_id.clone(),
            basic_auth: config
                .username
                .clone()
                .map(|username| (username, config.password.clone())),
        })
    }
}

/// rustls client with the request timeout and an optional HTTPS proxy.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout);
    if let Some(proxy) = proxy_url {
        let proxy = reqwest::Proxy::https(proxy)
            .map_err(|e| TransportError::Client(format!("invalid proxy '{proxy}': {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| TransportError::Client(e.to_string()))
}

#[async_trait]
impl LokiHttpClient for ReqwestLokiClient {
    async fn post(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TransportError> {
        let mut request = self
            .client
            .post(join_url(&self.base, path))
            .header(CONTENT_TYPE, content_type)
            .body(body);

        if let Some(tenant_id) = &self.tenant_id {
            request = request.header(TENANT_HEADER, tenant_id);
        }
        if let Some((username, password)) = &self.basic_auth {
            request = request.basic_auth(username, password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Response {
                status: status.as_u16(),
                body,
            })
        }
    }
}
