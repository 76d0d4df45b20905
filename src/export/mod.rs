//! Outbound renderers for the element collection.

pub mod to_csv;
pub mod to_json;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::graph::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
}

pub fn render(elements: &[Element], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv::render(elements),
        ExportFormat::Json => to_json::render(elements),
    }
}
