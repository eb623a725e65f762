//! CSV output formatter

use regscope_core::{Extract, Keyword, ResearchOutcome, Summary};

fn write_table<I, R>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    if let Err(e) = write_rows(&mut writer, header, rows) {
        tracing::warn!("Failed to render CSV: {}", e);
    }
    writer
        .into_inner()
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

fn write_rows<I, R>(writer: &mut csv::Writer<Vec<u8>>, header: &[&str], rows: I) -> csv::Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn format_extracts(extracts: &[Extract]) -> String {
    write_table(
        &[
            "id",
            "title",
            "source",
            "category",
            "jurisdiction",
            "priority",
            "effectiveDate",
            "relevanceScore",
            "keywords",
        ],
        extracts.iter().map(|e| {
            vec![
                e.id.to_string(),
                e.title.clone(),
                e.source.clone(),
                e.category.clone(),
                e.jurisdiction.clone(),
                e.priority.clone(),
                e.effective_date.clone().unwrap_or_default(),
                e.relevance_score.to_string(),
                e.keywords.join(", "),
            ]
        }),
    )
}

pub fn format_keywords(keywords: &[Keyword]) -> String {
    write_table(
        &["id", "term", "category", "usageCount"],
        keywords.iter().map(|k| {
            vec![
                k.id.to_string(),
                k.term.clone(),
                k.category.clone(),
                k.usage_count.to_string(),
            ]
        }),
    )
}

pub fn format_summary(summary: &Summary) -> String {
    let extract_ids = summary
        .extract_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    write_table(
        &["id", "title", "content", "extractIds", "keywords", "createdAt"],
        [vec![
            summary.id.to_string(),
            summary.title.clone(),
            summary.content.clone(),
            extract_ids,
            summary.keywords.join(", "),
            summary.created_at.to_rfc3339(),
        ]],
    )
}

pub fn format_steps(outcome: &ResearchOutcome) -> String {
    write_table(
        &["step", "name", "status", "message"],
        outcome.steps.iter().map(|s| {
            vec![
                s.step.to_string(),
                s.name.clone(),
                s.status.to_string(),
                s.message.clone(),
            ]
        }),
    )
}
