//! Stored extracts exposed as MCP resources

use crate::protocol::ResourceContent;
use anyhow::Result;
use regscope_core::{Extract, Storage};
use serde_json::Value;

const URI_PREFIX: &str = "regscope://extracts/";

fn extract_uri(id: u32) -> String {
    format!("{}{}", URI_PREFIX, id)
}

/// Descriptor for every stored extract
pub async fn list_resources(storage: &dyn Storage) -> Result<Vec<Value>> {
    let extracts = storage.all_extracts().await?;
    Ok(extracts
        .iter()
        .map(|e| {
            serde_json::json!({
                "uri": extract_uri(e.id),
                "name": e.title,
                "description": format!("{} ({})", e.source, e.category),
                "mimeType": "text/markdown"
            })
        })
        .collect())
}

/// Read an extract by `regscope://extracts/{id}`
pub async fn read_resource(storage: &dyn Storage, uri: &str) -> Result<ResourceContent> {
    let id: u32 = uri
        .strip_prefix(URI_PREFIX)
        .and_then(|rest| rest.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid URI: {}", uri))?;

    let extract = storage
        .extract_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Extract not found: {}", uri))?;

    Ok(ResourceContent {
        uri: uri.to_string(),
        name: format!("extract-{}", extract.id),
        title: Some(extract.title.clone()),
        mime_type: "text/markdown".to_string(),
        text: render_extract(&extract),
    })
}

fn render_extract(extract: &Extract) -> String {
    let mut text = format!(
        "# {}\n\n**Source:** {}  \n**Category:** {}  \n**Jurisdiction:** {}  \n**Priority:** {}\n",
        extract.title, extract.source, extract.category, extract.jurisdiction, extract.priority
    );
    if let Some(date) = &extract.effective_date {
        text.push_str(&format!("**Effective:** {}\n", date));
    }
    text.push_str(&format!("\n{}\n", extract.excerpt));
    if !extract.full_text.is_empty() {
        text.push_str(&format!("\n{}\n", extract.full_text));
    }
    text
}
