// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Endpoint resolution and transport selection.

use reqwest::Url;
use tracing::warn;

use crate::errors::{ConfigError, TransportError};
use crate::http::HttpClientFactory;
use crate::transport::{HttpTransport, NullTransport, Transport};

/// Parses `endpoint` as an absolute http or https URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(endpoint.trim()).map_err(|_| ConfigError::InvalidEndpoint(endpoint.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

/// Picks the transport for a rendered endpoint.
///
/// An unusable endpoint yields [`Transport::Null`] and a warning. Only a
/// failure to build the HTTP client is returned as an error.
pub fn create_transport(
    endpoint: &str,
    client_factory: &HttpClientFactory,
) -> Result<Transport, TransportError> {
    match parse_endpoint(endpoint) {
        Ok(url) => {
            let client = client_factory(&url)?;
            Ok(Transport::Http(HttpTransport::new(client)))
        }
        Err(e) => {
            warn!(
                "Unable to create a valid Loki endpoint URI from '{}': {}. Log events will be dropped.",
                endpoint, e
            );
            Ok(Transport::Null(NullTransport))
        }
    }
}
