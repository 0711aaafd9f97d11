// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Loki push API payload.
//!
//! ```text
//! {"streams":[{"stream":{"<label>":"<value>"},
//!              "values":[["<unix-nanos>","<line>"], ...]}]}
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::event::LokiEvent;
use crate::label::LabelSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiPushRequest {
    pub streams: Vec<LokiStream>,
}

/// Entries sharing one label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiStream {
    pub stream: BTreeMap<String, String>,
    pub values: Vec<[String; 2]>,
}

impl LokiPushRequest {
    /// Groups events by label set.
    ///
    /// Streams appear in the order their label set is first seen, and the
    /// values of each stream keep the submission order of the batch.
    pub fn from_events(events: &[LokiEvent]) -> Self {
        let mut index: HashMap<&LabelSet, usize> = HashMap::new();
        let mut groups: Vec<(&LabelSet, Vec<[String; 2]>)> = Vec::new();

        for event in events {
            let position = *index.entry(event.labels()).or_insert_with(|| {
                groups.push((event.labels(), Vec::new()));
                groups.len() - 1
            });
            groups[position]
                .1
                .push([event.timestamp_nanos(), event.line().to_string()]);
        }

        Self {
            streams: groups
                .into_iter()
                .map(|(labels, values)| LokiStream {
                    stream: labels.to_map(),
                    values,
                })
                .collect(),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.streams.iter().map(|s| s.values.len()).sum()
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
