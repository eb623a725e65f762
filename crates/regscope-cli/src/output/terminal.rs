//! Terminal output formatter

use regscope_core::{Extract, Keyword, ResearchOutcome, Summary};

pub fn format_extracts(extracts: &[Extract]) -> String {
    let mut output = String::new();

    for e in extracts {
        output.push_str(&format!(
            "{:>3}% #{:<3} {} [{}]\n",
            e.relevance_score, e.id, e.title, e.priority
        ));
        output.push_str(&format!("       {} | {}\n", e.source, e.category));
    }

    output
}

pub fn format_extract(e: &Extract) -> String {
    let mut output = format!("#{} {}\n", e.id, e.title);
    output.push_str(&format!("Source:        {}\n", e.source));
    output.push_str(&format!("Category:      {}\n", e.category));
    output.push_str(&format!("Jurisdiction:  {}\n", e.jurisdiction));
    output.push_str(&format!("Priority:      {}\n", e.priority));
    output.push_str(&format!(
        "Effective:     {}\n",
        e.effective_date.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!("Keywords:      {}\n", e.keywords.join(", ")));
    output.push_str(&format!("\n{}\n", e.excerpt));
    output
}

pub fn format_keywords(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .map(|k| format!("{:<32} {:<20} {:>5}\n", k.term, k.category, k.usage_count))
        .collect()
}

pub fn format_summary(summary: &Summary) -> String {
    let mut output = format!("#{} {}\n", summary.id, summary.title);
    output.push_str(&format!(
        "Created: {}\n",
        summary.created_at.format("%Y-%m-%d %H:%M")
    ));
    if !summary.extract_ids.is_empty() {
        let ids: Vec<String> = summary.extract_ids.iter().map(|id| id.to_string()).collect();
        output.push_str(&format!("Extracts: {}\n", ids.join(", ")));
    }
    output.push_str(&format!("\n{}\n", summary.content));
    output
}

pub fn format_outcome(outcome: &ResearchOutcome) -> String {
    let mut output = format!("{}\n", outcome.answer.trim_end());

    let documents = outcome.memory.documents();
    if !documents.is_empty() {
        output.push_str("\nSources:\n");
        for doc in documents {
            output.push_str(&format!(
                "  {:>3}% {} ({})\n",
                doc.relevance_score, doc.title, doc.source
            ));
        }
    }

    output
}
