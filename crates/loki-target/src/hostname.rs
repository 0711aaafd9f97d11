// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Machine and user identity used by the default label set.

use std::env;
use tracing::warn;

const UNKNOWN: &str = "unknown";

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Host name of the machine.
///
/// Tries, in order: `HOSTNAME`, `COMPUTERNAME`, the system host name and
/// finally `"unknown"`.
#[must_use]
pub fn get_hostname() -> String {
    if let Some(hostname) = non_empty_var("HOSTNAME").or_else(|| non_empty_var("COMPUTERNAME")) {
        return hostname;
    }

    #[cfg(unix)]
    match nix::unistd::gethostname() {
        Ok(hostname) => {
            if let Some(hostname) = hostname.to_str().filter(|h| !h.is_empty()) {
                return hostname.to_string();
            }
        }
        Err(e) => {
            warn!("Failed to get system hostname: {}", e);
        }
    }

    warn!("Could not determine hostname, using '{UNKNOWN}'");
    UNKNOWN.to_string()
}

/// Name of the user running the process, from `USER` or `USERNAME`.
#[must_use]
pub fn get_username() -> String {
    non_empty_var("USER")
        .or_else(|| non_empty_var("USERNAME"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}
