// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Path of the push API, relative to the configured endpoint.
pub const PUSH_PATH: &str = "loki/api/v1/push";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Multi-tenant Loki reads the tenant from this header.
pub const TENANT_HEADER: &str = "X-Scope-OrgID";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Keys probed, in order, for an embedded timestamp in JSON lines.
pub const TIMESTAMP_KEYS: [&str; 2] = ["time", "timestamp"];
