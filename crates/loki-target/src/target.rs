// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The log target: record rendering plus a lazily resolved transport.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::config::{default_line_layout, LokiTargetConfig};
use crate::endpoint::create_transport;
use crate::errors::{LabelError, TransportError};
use crate::event::LokiEvent;
use crate::http::HttpClientFactory;
use crate::label::{Label, LabelSet};
use crate::layout::{Layout, SharedLayout, SimpleLayout};
use crate::record::LogRecord;
use crate::timestamp::{resolve_timestamp, MonotonicClock};
use crate::transport::Transport;

/// A label whose value is rendered per record.
pub struct LabelTemplate {
    name: String,
    layout: SharedLayout,
}

impl LabelTemplate {
    pub fn new(name: impl Into<String>, layout: impl Layout + 'static) -> Result<Self, LabelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }
        Ok(Self {
            name,
            layout: Arc::new(layout),
        })
    }
}

pub struct LokiTarget {
    endpoint: SharedLayout,
    labels: Vec<LabelTemplate>,
    layout: SharedLayout,
    client_factory: HttpClientFactory,
    transport: OnceCell<Transport>,
}

impl LokiTarget {
    /// `endpoint` is rendered once, against an empty record, when the first
    /// batch is written.
    pub fn new(
        endpoint: impl Layout + 'static,
        labels: Vec<LabelTemplate>,
        layout: impl Layout + 'static,
        client_factory: HttpClientFactory,
    ) -> Result<Self, LabelError> {
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.name.as_str()) {
                return Err(LabelError::DuplicateName(label.name.clone()));
            }
        }

        Ok(Self {
            endpoint: Arc::new(endpoint),
            labels,
            layout: Arc::new(layout),
            client_factory,
            transport: OnceCell::new(),
        })
    }

    pub fn from_config(config: &LokiTargetConfig) -> Result<Self, LabelError> {
        let labels = config
            .labels
            .iter()
            .map(|l| LabelTemplate::new(l.name.clone(), SimpleLayout::new(&l.layout)))
            .collect::<Result<Vec<_>, _>>()?;

        let layout: SharedLayout = match &config.layout {
            Some(template) => Arc::new(SimpleLayout::new(template)),
            None => Arc::new(default_line_layout(Arc::new(MonotonicClock::new()))),
        };

        Self::new(
            SimpleLayout::new(&config.endpoint),
            labels,
            layout,
            config.http_client_config().into_factory(),
        )
    }

    /// Renders the label set and line of `record`.
    ///
    /// The event takes its time from a `time`/`timestamp` member of a JSON
    /// line when there is a parseable one, and from the record otherwise.
    pub fn event_for(&self, record: &LogRecord) -> LokiEvent {
        let labels = LabelSet::from_unique(
            self.labels
                .iter()
                .map(|t| Label::from_checked(t.name.clone(), t.layout.render(record)))
                .collect(),
        );
        let line = self.layout.render(record);
        let timestamp = resolve_timestamp(&line, record.timestamp());

        LokiEvent::new(labels, timestamp, line)
    }

    /// The transport for this target, resolved on first use.
    ///
    /// A client construction failure is returned to the caller that ran the
    /// factory only. Callers waiting on that attempt run the factory again
    /// themselves. Any other outcome is kept for the lifetime of the target.
    pub async fn transport(&self) -> Result<&Transport, TransportError> {
        self.transport
            .get_or_try_init(|| async {
                let endpoint = self.endpoint.render(&LogRecord::default());
                create_transport(&endpoint, &self.client_factory)
            })
            .await
    }

    pub async fn write(
        &self,
        record: &LogRecord,
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        let event = self.event_for(record);
        self.transport()
            .await?
            .write_events(std::slice::from_ref(&event), cancel)
            .await
    }

    pub async fn write_batch(
        &self,
        records: &[LogRecord],
        cancel: &CancellationToken,
    ) -> Result<(), TransportError> {
        let events: Vec<LokiEvent> = records.iter().map(|r| self.event_for(r)).collect();
        self.transport().await?.write_events(&events, cancel).await
    }
}
