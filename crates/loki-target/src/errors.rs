// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Label construction preconditions. These are programming errors in the
/// target configuration and are returned as soon as they are detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    #[error("label name must not be empty")]
    EmptyName,

    #[error("duplicate label name: {0}")]
    DuplicateName(String),
}

/// Failure to resolve the configured endpoint into an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid endpoint URI '{0}'")]
    InvalidEndpoint(String),

    #[error("unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
}

/// Delivery failures. Every variant is reported once to the caller, which
/// owns any retry policy.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to serialize push request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Loki returned error: {status} - {body}")]
    Response { status: u16, body: String },

    #[error("push cancelled")]
    Cancelled,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
