//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::Result;
use regscope_core::catalog::{ContentSearch, KeywordProvider, RegulatoryCatalog, SummaryOptions};
use regscope_core::text::preview;
use regscope_core::{ExtractFilter, ResearchWorkflow, Storage};
use serde_json::Value;

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing {}", key))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

pub fn query_gen_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "query_gen".to_string(),
        description: "Generate optimized search queries for regulatory compliance research"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "userQuery": {
                    "type": "string",
                    "description": "The research question to expand"
                },
                "context": {
                    "type": "string",
                    "description": "Extra context appended to each generated query"
                }
            },
            "required": ["userQuery"]
        }),
    }
}

pub fn content_search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "content_search".to_string(),
        description: "Search regulatory content across the built-in catalog".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search terms; empty returns the whole catalog"
                },
                "filters": {
                    "type": "object",
                    "description": "Filters echoed back with the results"
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn keywords_gen_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "keywords_gen".to_string(),
        description: "Generate relevant keywords and tags for regulatory content".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "Text to generate keywords for"
                },
                "category": {
                    "type": "string",
                    "description": "Keyword baseline category (default: banking_regulation)"
                }
            },
            "required": ["content"]
        }),
    }
}

pub fn summary_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "summary".to_string(),
        description: "Create comprehensive summaries of regulatory content".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Texts to summarize"
                },
                "options": {
                    "type": "object",
                    "properties": {
                        "style": { "type": "string", "default": "executive" },
                        "length": { "type": "string", "default": "detailed" }
                    }
                }
            },
            "required": ["content"]
        }),
    }
}

pub fn search_extracts_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_extracts".to_string(),
        description: "Full-text search over stored regulatory extracts".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search terms; an extract matches when any term occurs"
                },
                "categories": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Only keep extracts in these categories"
                },
                "jurisdictions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Only keep extracts from these jurisdictions"
                },
                "priorities": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Only keep extracts with these priorities"
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn research_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "research".to_string(),
        description: "Answer a compliance question with keyword generation, retrieval, \
                      quality assessment and answer synthesis"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The compliance question"
                }
            },
            "required": ["question"]
        }),
    }
}

pub async fn handle_query_gen(catalog: &RegulatoryCatalog, args: Value) -> Result<ToolResult> {
    let query = required_str(&args, "userQuery")?;
    let plan = catalog.query_gen(query, optional_str(&args, "context"));

    let text = plan
        .generated_queries
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ToolResult::text(text, serde_json::to_value(&plan)?))
}

pub async fn handle_content_search(catalog: &RegulatoryCatalog, args: Value) -> Result<ToolResult> {
    let query = required_str(&args, "query")?;
    let results = catalog.content_search(query, args.get("filters")).await?;

    let mut text = format!("Found {} documents", results.total_results);
    for doc in &results.results {
        text.push_str(&format!(
            "\n- {} ({})",
            doc.title,
            doc.source.as_deref().unwrap_or("unknown source")
        ));
    }

    Ok(ToolResult::text(text, serde_json::to_value(&results)?))
}

pub async fn handle_keywords_gen(catalog: &RegulatoryCatalog, args: Value) -> Result<ToolResult> {
    let content = required_str(&args, "content")?;
    let suggestions = catalog
        .keywords_gen(content, optional_str(&args, "category"))
        .await?;

    let keywords = &suggestions.keywords;
    let text = format!(
        "Primary: {}\nSecondary: {}\nEmerging: {}",
        keywords.primary.join(", "),
        keywords.secondary.join(", "),
        keywords.emerging.join(", ")
    );

    Ok(ToolResult::text(text, serde_json::to_value(&suggestions)?))
}

pub async fn handle_summary(catalog: &RegulatoryCatalog, args: Value) -> Result<ToolResult> {
    let content: Vec<String> = args
        .get("content")
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("Missing content"))?;
    let options: SummaryOptions = args
        .get("options")
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .unwrap_or_default();

    let summary = catalog.summary(&content, &options);
    let text = format!(
        "{}\n\nKey points:\n{}",
        summary.summary.overview,
        summary
            .summary
            .key_points
            .iter()
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n")
    );

    Ok(ToolResult::text(text, serde_json::to_value(&summary)?))
}

pub async fn handle_search_extracts(storage: &dyn Storage, args: Value) -> Result<ToolResult> {
    let query = required_str(&args, "query")?;
    let filter: ExtractFilter = serde_json::from_value(args.clone())?;

    let extracts: Vec<_> = storage
        .search_extracts(query)
        .await?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect();

    let mut text = format!("Found {} extracts for '{}'", extracts.len(), query);
    for extract in &extracts {
        text.push_str(&format!(
            "\n\n#{} {} [{}]\n{}",
            extract.id,
            extract.title,
            extract.priority,
            preview(&extract.excerpt, 200)
        ));
    }

    Ok(ToolResult::text(
        text,
        serde_json::json!({
            "query": query,
            "total": extracts.len(),
            "results": extracts,
        }),
    ))
}

pub async fn handle_research(workflow: &ResearchWorkflow, args: Value) -> Result<ToolResult> {
    let question = required_str(&args, "question")?;
    let outcome = workflow.process_question(question, None).await?;

    let structured = serde_json::json!({
        "answer": outcome.answer,
        "steps": outcome.steps,
        "visualizations": outcome.visualizations,
        "memory": outcome.memory.summary(),
    });

    Ok(ToolResult::text(outcome.answer, structured))
}
