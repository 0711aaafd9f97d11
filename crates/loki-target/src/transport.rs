// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery of event batches.
//!
//! The set of transports is closed: [`Transport::Http`] pushes to Loki,
//! [`Transport::Null`] stands in when no valid endpoint is configured so that
//! callers never special-case misconfiguration. Neither retries.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::constants::{CONTENT_TYPE_JSON, PUSH_PATH};
use crate::errors::TransportError;
use crate::event::LokiEvent;
use crate::http::LokiHttpClient;
use crate::push::LokiPushRequest;

pub enum Transport {
    Null(NullTransport),
    Http(HttpTransport),
}

impl Transport {
    pub async fn write_events(
        &self,
        events: &[LokiEvent],
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        match self {
            Transport::Null(null) => null.write_events(events).await,
            Transport::Http(http) => http.write_events(events, cancel).await,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Transport::Null(_))
    }
}

/// Drops every batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl NullTransport {
    pub async fn write_events(&self, _events: &[LokiEvent]) -> Result<(), TransportError> {
        Ok(())
    }
}

pub struct HttpTransport {
    client: Arc<dyn LokiHttpClient>,
}

impl HttpTransport {
    pub fn new(client: Arc<dyn LokiHttpClient>) -> Self {
        Self { client }
    }

    /// Groups the batch into streams and sends it in a single POST.
    ///
    /// Cancelling `cancel` drops the in-flight request.
    pub async fn write_events(
        &self,
        events: &[LokiEvent],
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        if events.is_empty() {
            return Ok(());
        }
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let request = LokiPushRequest::from_events(events);
        let streams = request.streams.len();
        let body = request.to_json()?;

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.client.post(PUSH_PATH, body, CONTENT_TYPE_JSON) => result,
        };

        match &result {
            Ok(()) => debug!(streams, entries = events.len(), "Pushed logs to Loki"),
            Err(e) => debug!(streams, entries = events.len(), error = %e, "Loki push failed"),
        }
        result
    }
}
