// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Stream identity: labels and label sets.
//!
//! A [`LabelSet`] keeps the order in which labels were configured, but two
//! sets compare (and hash) equal whenever they hold the same name/value pairs,
//! regardless of order. Names are unique within a set.

use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::errors::LabelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    name: String,
    value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, LabelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// For names already checked to be non-empty.
    pub(crate) fn from_checked(name: String, value: String) -> Self {
        Self { name, value }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new(labels: impl IntoIterator<Item = Label>) -> Result<Self, LabelError> {
        let labels: Vec<Label> = labels.into_iter().collect();
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.name.as_str()) {
                return Err(LabelError::DuplicateName(label.name.clone()));
            }
        }
        Ok(Self { labels })
    }

    /// For labels whose names are already known to be unique.
    pub(crate) fn from_unique(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// Flat name -> value mapping, as sent in the `stream` object.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.labels
            .iter()
            .map(|l| (l.name.clone(), l.value.clone()))
            .collect()
    }

    fn sorted(&self) -> Vec<&Label> {
        let mut sorted: Vec<&Label> = self.labels.iter().collect();
        sorted.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        sorted
    }
}

impl PartialEq for LabelSet {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len() && self.sorted() == other.sorted()
    }
}

impl Eq for LabelSet {}

impl Hash for LabelSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.sorted() {
            label.hash(state);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn label(name: &str, value: &str) -> Label {
        Label::new(name, value).unwrap()
    }

    fn hash_of(set: &LabelSet) -> u64 {
        let mut hasher = DefaultHasher::new();
        set.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(Label::new("", "x"), Err(LabelError::EmptyName));
    }

    #[test]
    fn test_empty_value_allowed() {
        let l = label("user", "");
        assert_eq!(l.value(), "");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = LabelSet::new([label("level", "info"), label("level", "warn")]);
        assert_eq!(result.unwrap_err(), LabelError::DuplicateName("level".into()));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = LabelSet::new([label("app", "web"), label("level", "info")]).unwrap();
        let b = LabelSet::new([label("level", "info"), label("app", "web")]).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_inequality_on_value_or_name() {
        let a = LabelSet::new([label("app", "web"), label("level", "info")]).unwrap();
        let b = LabelSet::new([label("app", "web"), label("level", "warn")]).unwrap();
        let c = LabelSet::new([label("app", "web")]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_iteration_keeps_configured_order() {
        let set = LabelSet::new([label("z", "1"), label("a", "2")]).unwrap();
        let names: Vec<&str> = set.iter().map(Label::name).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(set.get("a"), Some("2"));
        assert_eq!(set.get("missing"), None);
    }
}
