use anyhow::Result;

use crate::graph::{dependencies, services, Element};

pub fn render(elements: &[Element]) -> Result<String> {
    use serde_json::json;

    let doc = json!({
        "services": services(elements),
        "dependencies": dependencies(elements),
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}
