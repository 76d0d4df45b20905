//! Filter indices derived from the current node set.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::graph::{services, Element};

/// Something that can rebuild a lookup index from the element collection.
/// Rebuilds are always full, never incremental.
pub trait FilterIndex {
    fn rebuild(&mut self, elements: &[Element]);
}

/// Unique labels across all services, in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelIndex {
    values: IndexSet<String>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.values.contains(label)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FilterIndex for LabelIndex {
    fn rebuild(&mut self, elements: &[Element]) {
        self.values.clear();
        for service in services(elements) {
            for label in &service.labels {
                self.values.insert(label.clone());
            }
        }
    }
}

/// Unique owners/teams across all services, in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerIndex {
    values: IndexSet<String>,
}

impl OwnerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn contains(&self, owner: &str) -> bool {
        self.values.contains(owner)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FilterIndex for OwnerIndex {
    fn rebuild(&mut self, elements: &[Element]) {
        self.values.clear();
        for service in services(elements) {
            if let Some(owner) = &service.owner {
                self.values.insert(owner.clone());
            }
        }
    }
}
