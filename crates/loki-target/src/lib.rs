// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log target that converts structured log records into Loki push requests.
//!
//! A [`target::LokiTarget`] renders the label set and line of every
//! [`record::LogRecord`], optionally lifts a timestamp out of a JSON line and
//! hands the resulting [`event::LokiEvent`]s to a lazily resolved
//! [`transport::Transport`]. The HTTP transport groups events into streams and
//! POSTs them to `<endpoint>/loki/api/v1/push`.
//!
//! Batching cadence and retries are left to the caller.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod constants;
pub mod endpoint;
pub mod errors;
pub mod event;
pub mod hostname;
pub mod http;
pub mod label;
pub mod layout;
pub mod push;
pub mod record;
pub mod target;
pub mod timestamp;
pub mod transport;
