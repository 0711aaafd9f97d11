// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Target configuration.
//!
//! Label values, the line and the endpoint are `${...}` templates (see
//! [`crate::layout::SimpleLayout`]). When `layout` is unset, lines are
//! rendered by [`default_line_layout`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chrono::SecondsFormat;
use serde::Deserialize;

use crate::constants::DEFAULT_TIMEOUT_SECS;
use crate::hostname::get_username;
use crate::http::HttpClientConfig;
use crate::layout::{FnLayout, JsonAttribute, JsonLayout, SimpleLayout};
use crate::record::LogRecord;
use crate::timestamp::MonotonicClock;

const DEFAULT_SERVICE_NAME: &str = "unknown_service";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelConfig {
    pub name: String,
    pub layout: String,
}

impl LabelConfig {
    pub fn new(name: impl Into<String>, layout: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: layout.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LokiTargetConfig {
    /// Base URL of Loki, e.g. `http://loki:3100`.
    pub endpoint: String,
    pub labels: Vec<LabelConfig>,
    pub layout: Option<String>,
    pub timeout_secs: u64,
    pub https_proxy: Option<String>,
    /// Sent as `X-Scope-OrgID` for multi-tenant Loki.
    pub tenant_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for LokiTargetConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            labels: Vec::new(),
            layout: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            https_proxy: None,
            tenant_id: None,
            username: None,
            password: None,
        }
    }
}

impl LokiTargetConfig {
    /// Ready-made configuration: `machine`, `user`, `service_name` and
    /// `level` labels with the default JSON line layout.
    pub fn with_defaults(endpoint: impl Into<String>, service_name: &str) -> Self {
        Self {
            endpoint: endpoint.into(),
            labels: vec![
                LabelConfig::new("machine", "${machinename:lowercase=true}"),
                LabelConfig::new("user", get_username()),
                LabelConfig::new("service_name", service_name),
                LabelConfig::new("level", "${level:lowercase=true}"),
            ],
            ..Default::default()
        }
    }

    /// Reads `LOKI_ENDPOINT`, `LOKI_SERVICE_NAME`, `LOKI_TIMEOUT_SECS`,
    /// `LOKI_HTTPS_PROXY`, `LOKI_TENANT_ID`, `LOKI_USERNAME` and
    /// `LOKI_PASSWORD` on top of [`LokiTargetConfig::with_defaults`].
    pub fn from_env() -> Self {
        let service_name =
            env::var("LOKI_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

        Self {
            timeout_secs: env::var("LOKI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            https_proxy: env::var("LOKI_HTTPS_PROXY").ok(),
            tenant_id: env::var("LOKI_TENANT_ID").ok(),
            username: env::var("LOKI_USERNAME").ok(),
            password: env::var("LOKI_PASSWORD").ok(),
            ..Self::with_defaults(env::var("LOKI_ENDPOINT").unwrap_or_default(), &service_name)
        }
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            https_proxy: self.https_proxy.clone(),
            tenant_id: self.tenant_id.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// JSON line with a monotonic `time`, `level`, `logger`, `message`, the
/// event `properties` and the `exception`, if any.
pub fn default_line_layout(clock: Arc<MonotonicClock>) -> JsonLayout {
    let time = FnLayout(move |record: &LogRecord| {
        clock
            .next(record.timestamp())
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
    });

    JsonLayout::new(vec![
        JsonAttribute::new("time", time),
        JsonAttribute::new("level", SimpleLayout::new("${level}")),
        JsonAttribute::new("logger", SimpleLayout::new("${logger}")),
        JsonAttribute::new("message", SimpleLayout::new("${message}")),
        JsonAttribute::raw("properties", JsonLayout::event_properties()),
        JsonAttribute::raw(
            "exception",
            JsonLayout::new(vec![
                JsonAttribute::new("type", SimpleLayout::new("${exception:format=type}")),
                JsonAttribute::new("message", SimpleLayout::new("${exception:format=message}")),
                JsonAttribute::new(
                    "stacktrace",
                    SimpleLayout::new("${exception:format=tostring}"),
                ),
            ]),
        ),
    ])
}
