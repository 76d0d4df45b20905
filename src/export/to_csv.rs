use anyhow::Result;
use csv::Writer;

use crate::graph::{dependencies, services, Element};

/// Render the collection back to the canonical CSV column layout, with
/// `depends_on` re-aggregated per source service.
pub fn render(elements: &[Element]) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "name",
        "labels",
        "tier",
        "owner",
        "app_code",
        "repo_url",
        "comment",
        "verified",
        "depends_on",
    ])?;

    let edges = dependencies(elements);
    for service in services(elements) {
        let depends_on: Vec<&str> = edges
            .iter()
            .filter(|edge| edge.source == service.id)
            .map(|edge| edge.target.as_str())
            .collect();

        wtr.write_record(&[
            service.id.clone(),
            service.name.clone(),
            service.labels.join(";"),
            service.tier.to_string(),
            service.owner.clone().unwrap_or_default(),
            service.app_code.clone().unwrap_or_default(),
            service.repo_url.clone().unwrap_or_default(),
            service.comment.clone().unwrap_or_default(),
            service.verified.to_string(),
            depends_on.join(";"),
        ])?;
    }

    let data = wtr.into_inner()?;
    let csv_string = String::from_utf8(data)?;

    Ok(csv_string)
}
