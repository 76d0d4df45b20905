//! The key-value persistence contract for the element collection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::graph::Element;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored elements could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Write through without re-triggering snapshot recording.
    pub skip_history: bool,
}

pub trait ElementStore {
    fn load(&mut self) -> Result<Option<Vec<Element>>, StoreError>;
    fn save(&mut self, elements: &[Element], options: SaveOptions) -> Result<(), StoreError>;
}

/// In-process store; also records how it was last called, which the tests
/// lean on to observe write-through behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    elements: Option<Vec<Element>>,
    save_count: usize,
    last_options: Option<SaveOptions>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.save_count
    }

    pub fn last_options(&self) -> Option<SaveOptions> {
        self.last_options
    }
}

impl ElementStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Vec<Element>>, StoreError> {
        Ok(self.elements.clone())
    }

    fn save(&mut self, elements: &[Element], options: SaveOptions) -> Result<(), StoreError> {
        self.elements = Some(elements.to_vec());
        self.save_count += 1;
        self.last_options = Some(options);
        Ok(())
    }
}

/// Durable store backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ElementStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<Vec<Element>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&mut self, elements: &[Element], options: SaveOptions) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(elements)?;
        crate::common::write_string_to_file(&self.path, &content)?;
        debug!(
            "Persisted {} element(s) to {} (skip_history: {})",
            elements.len(),
            self.path.display(),
            options.skip_history
        );
        Ok(())
    }
}
