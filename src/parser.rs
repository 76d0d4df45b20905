//! CSV ingestion: raw delimited text to a validated graph-element collection.
//!
//! Malformed *data* never raises; every data-quality failure is reported as a
//! normal [`ParseOutcome`] with an error kind and presentation hints. Only
//! engine-internal faults (the tokenizer giving up on the header, a lost
//! worker task) surface as [`ParseErrorKind::EngineFault`].

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::{shape_class, DependencyEdge, Element, ServiceRecord, DEFAULT_TIER};

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorKind {
    #[error("the input is empty")]
    EmptyInput,
    #[error("the file has no data rows")]
    NoDataRows,
    #[error("required columns are missing")]
    MissingColumns,
    #[error("no usable rows were found")]
    NoValidRows,
    #[error("the CSV tokenizer failed: {0}")]
    EngineFault(String),
}

/// The full result of one ingestion attempt, success or diagnosed failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub elements: Vec<Element>,
    pub skipped_count: usize,
    pub error_kind: Option<ParseErrorKind>,
    pub hints: Vec<String>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.error_kind.is_none()
    }

    fn failure(kind: ParseErrorKind, hints: Vec<String>) -> Self {
        Self {
            elements: Vec::new(),
            skipped_count: 0,
            error_kind: Some(kind),
            hints,
        }
    }
}

// Resolved header positions, including the legacy aliases.
struct ColumnMap {
    id: Option<usize>,
    name: Option<usize>,
    label: Option<usize>,
    labels: Option<usize>,
    domain: Option<usize>,
    tier: Option<usize>,
    owner: Option<usize>,
    app_code: Option<usize>,
    repo_url: Option<usize>,
    comment: Option<usize>,
    verified: Option<usize>,
    depends_on: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |column: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(column))
        };
        Self {
            id: find("id"),
            name: find("name"),
            label: find("label"),
            labels: find("labels"),
            domain: find("domain"),
            tier: find("tier"),
            owner: find("owner"),
            app_code: find("app_code"),
            repo_url: find("repo_url"),
            comment: find("comment"),
            verified: find("verified"),
            depends_on: find("depends_on"),
        }
    }
}

/// Parse delimited text into services and dependency edges.
pub fn parse(csv_text: &str) -> ParseOutcome {
    let trimmed = csv_text.trim();
    if trimmed.is_empty() {
        return ParseOutcome::failure(
            ParseErrorKind::EmptyInput,
            vec!["The file appears to be empty.".to_string()],
        );
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(trimmed.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!("Header tokenization failed: {}", e);
            return ParseOutcome::failure(ParseErrorKind::EngineFault(e.to_string()), Vec::new());
        }
    };

    // Structural parse: row-level malformations become warnings, not errors.
    let mut warnings = Vec::new();
    let mut records = Vec::new();
    for (offset, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => warnings.push(format!("Row {}: {}", offset + 2, e)),
        }
    }

    if records.is_empty() {
        return ParseOutcome::failure(ParseErrorKind::NoDataRows, warnings);
    }

    let columns = ColumnMap::from_headers(&headers);
    let has_id = columns.id.is_some();
    let has_name = columns.name.is_some() || columns.label.is_some();
    if !has_id || !has_name {
        let mut hints = Vec::new();
        if !has_id {
            hints.push("Missing required column: 'id'".to_string());
        }
        if !has_name {
            hints.push("Missing required column: 'name' (or 'label')".to_string());
        }
        hints.push(format!(
            "Found columns: {}",
            headers.iter().map(str::trim).collect::<Vec<_>>().join(", ")
        ));
        hints.push("Required: id, name (or label)".to_string());
        return ParseOutcome::failure(ParseErrorKind::MissingColumns, hints);
    }

    let mut elements = Vec::new();
    let mut skipped_count = 0usize;
    let mut service_count = 0usize;

    for record in &records {
        let field = |index: Option<usize>| index.and_then(|i| record.get(i));

        let id = field(columns.id).map(str::trim).unwrap_or("");
        // Value-level fallback: an empty name cell still picks up the legacy label.
        let name = field(columns.name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| field(columns.label).map(str::trim))
            .unwrap_or("");

        if id.is_empty() || name.is_empty() {
            skipped_count += 1;
            continue;
        }

        let labels = field(columns.labels)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| field(columns.domain).map(str::trim))
            .map(split_list)
            .unwrap_or_default();

        let tier = field(columns.tier)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| value.parse::<i32>().unwrap_or(DEFAULT_TIER))
            .unwrap_or(DEFAULT_TIER);

        let service = ServiceRecord {
            id: id.to_string(),
            name: name.to_string(),
            labels,
            tier,
            owner: optional_field(field(columns.owner)),
            app_code: optional_field(field(columns.app_code)),
            repo_url: optional_field(field(columns.repo_url)),
            comment: comment_field(field(columns.comment)),
            verified: is_verified(field(columns.verified).unwrap_or("")),
            shape_class: shape_class(id, name),
        };

        let depends_on = field(columns.depends_on).map(split_list).unwrap_or_default();

        elements.push(Element::Service(service));
        service_count += 1;

        // Dangling targets are permitted here; duplicates produce duplicate edges.
        for target in &depends_on {
            elements.push(Element::Dependency(DependencyEdge::new(id, target)));
        }
    }

    if service_count == 0 {
        let hints = vec![
            format!("{} data row(s) were skipped.", skipped_count),
            "Each row needs at least 'id' and 'name' values.".to_string(),
            "Check that each row lines up with the header columns.".to_string(),
        ];
        return ParseOutcome {
            elements: Vec::new(),
            skipped_count,
            error_kind: Some(ParseErrorKind::NoValidRows),
            hints,
        };
    }

    debug!(
        "Parsed {} element(s), skipped {} row(s)",
        elements.len(),
        skipped_count
    );

    ParseOutcome {
        elements,
        skipped_count,
        error_kind: None,
        hints: warnings,
    }
}

/// Asynchronous facade over [`parse`] so large files do not block the caller's
/// event loop. The computation itself is unchanged.
pub async fn parse_async(csv_text: String) -> ParseOutcome {
    match tokio::task::spawn_blocking(move || parse(&csv_text)).await {
        Ok(outcome) => outcome,
        Err(e) => ParseOutcome::failure(ParseErrorKind::EngineFault(e.to_string()), Vec::new()),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Comments keep embedded newlines; only horizontal whitespace is trimmed.
fn comment_field(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim_matches(|c| c == ' ' || c == '\t'))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_verified(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.eq_ignore_ascii_case("true") || trimmed == "1"
}
