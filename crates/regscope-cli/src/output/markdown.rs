//! Markdown output formatter

use regscope_core::{Extract, Keyword, ResearchOutcome, Summary};

pub fn format_extracts(extracts: &[Extract]) -> String {
    let mut output = String::from("# Regulatory Extracts\n\n");

    for (i, e) in extracts.iter().enumerate() {
        output.push_str(&format!(
            "## {}. {} (Relevance: {}%)\n\n",
            i + 1,
            e.title,
            e.relevance_score
        ));
        output.push_str(&format!("- **ID**: {}\n", e.id));
        output.push_str(&format!("- **Source**: {}\n", e.source));
        output.push_str(&format!("- **Category**: {}\n", e.category));
        output.push_str(&format!("- **Jurisdiction**: {}\n", e.jurisdiction));
        output.push_str(&format!("- **Priority**: {}\n", e.priority));
        output.push_str(&format!("\n{}\n\n---\n\n", e.excerpt));
    }

    if extracts.is_empty() {
        output.push_str("*No extracts found*\n");
    }

    output
}

pub fn format_extract(e: &Extract) -> String {
    let mut output = format!("# {}\n\n", e.title);
    output.push_str(&format!("- **Source**: {}\n", e.source));
    output.push_str(&format!("- **Category**: {}\n", e.category));
    output.push_str(&format!("- **Jurisdiction**: {}\n", e.jurisdiction));
    output.push_str(&format!("- **Priority**: {}\n", e.priority));
    if let Some(date) = &e.effective_date {
        output.push_str(&format!("- **Effective**: {}\n", date));
    }
    if !e.keywords.is_empty() {
        output.push_str(&format!("- **Keywords**: {}\n", e.keywords.join(", ")));
    }
    output.push_str(&format!("\n> {}\n", e.excerpt));
    if !e.full_text.is_empty() {
        output.push_str(&format!("\n{}\n", e.full_text));
    }
    output
}

pub fn format_keywords(keywords: &[Keyword]) -> String {
    let mut output = String::from("| Term | Category | Usage |\n|---|---|---|\n");
    for k in keywords {
        output.push_str(&format!("| {} | {} | {} |\n", k.term, k.category, k.usage_count));
    }
    output
}

pub fn format_summary(summary: &Summary) -> String {
    let mut output = format!("# {}\n\n{}\n", summary.title, summary.content);
    if !summary.keywords.is_empty() {
        output.push_str(&format!("\n**Keywords**: {}\n", summary.keywords.join(", ")));
    }
    output.push_str(&format!(
        "\n*Saved {}*\n",
        summary.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output
}

pub fn format_outcome(outcome: &ResearchOutcome) -> String {
    let memory = outcome.memory.summary();
    let mut output = format!("# Answer\n\n{}\n\n## Research Trail\n\n", outcome.answer);
    for step in &outcome.steps {
        output.push_str(&format!(
            "{}. **{}** ({}): {}\n",
            step.step, step.name, step.status, step.message
        ));
    }
    output.push_str(&format!(
        "\n*{} documents, quality {}/100, {} attempt(s)*\n",
        memory.documents_count, memory.quality_score, memory.attempts
    ));
    output
}
