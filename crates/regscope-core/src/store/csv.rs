//! CSV-file storage
//!
//! Each table is a headed CSV file under the data directory. List columns
//! (keywords, extract ids) are stored comma-joined inside one quoted field.

use super::{
    extract_matches_query, keyword_matches_query, Extract, ExtractFilter, Keyword, NewExtract,
    NewSummary, Storage, Summary,
};
use crate::error::{RegscopeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const EXTRACTS_FILE: &str = "extracts.csv";
const KEYWORDS_FILE: &str = "keywords.csv";
const SUMMARIES_FILE: &str = "summaries.csv";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ExtractRow {
    id: String,
    title: String,
    source: String,
    excerpt: String,
    category: String,
    jurisdiction: String,
    priority: String,
    effective_date: String,
    last_updated: String,
    relevance_score: String,
    keywords: String,
    full_text: String,
    created_by: String,
    updated_by: String,
    created_date: String,
    updated_date: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct KeywordRow {
    id: String,
    term: String,
    category: String,
    frequency: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryRow {
    id: String,
    title: String,
    content: String,
    extract_ids: String,
    keywords: String,
    created_at: String,
    updated_at: String,
}

fn non_empty(s: String) -> Option<String> {
    (!s.trim().is_empty()).then_some(s)
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_id(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

/// Relevance on the 0-100 scale; decimal fractions such as `0.95` are scaled up
fn parse_score(s: &str) -> u32 {
    let s = s.trim();
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => {
            let n = if s.contains('.') && n <= 1.0 { n * 100.0 } else { n };
            n.round().clamp(0.0, 100.0) as u32
        }
        _ => 0,
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<ExtractRow> for Extract {
    fn from(row: ExtractRow) -> Self {
        Extract {
            id: parse_id(&row.id),
            relevance_score: parse_score(&row.relevance_score),
            keywords: split_list(&row.keywords),
            title: row.title,
            source: row.source,
            excerpt: row.excerpt,
            category: row.category,
            jurisdiction: row.jurisdiction,
            priority: row.priority,
            effective_date: non_empty(row.effective_date),
            last_updated: row.last_updated,
            full_text: row.full_text,
            created_by: non_empty(row.created_by),
            updated_by: non_empty(row.updated_by),
            created_date: non_empty(row.created_date),
            updated_date: non_empty(row.updated_date),
        }
    }
}

impl From<&Extract> for ExtractRow {
    fn from(e: &Extract) -> Self {
        ExtractRow {
            id: e.id.to_string(),
            title: e.title.clone(),
            source: e.source.clone(),
            excerpt: e.excerpt.clone(),
            category: e.category.clone(),
            jurisdiction: e.jurisdiction.clone(),
            priority: e.priority.clone(),
            effective_date: e.effective_date.clone().unwrap_or_default(),
            last_updated: e.last_updated.clone(),
            relevance_score: e.relevance_score.to_string(),
            keywords: e.keywords.join(","),
            full_text: e.full_text.clone(),
            created_by: e.created_by.clone().unwrap_or_default(),
            updated_by: e.updated_by.clone().unwrap_or_default(),
            created_date: e.created_date.clone().unwrap_or_default(),
            updated_date: e.updated_date.clone().unwrap_or_default(),
        }
    }
}

impl From<KeywordRow> for Keyword {
    fn from(row: KeywordRow) -> Self {
        Keyword {
            id: parse_id(&row.id),
            usage_count: parse_id(&row.frequency),
            term: row.term,
            category: row.category,
        }
    }
}

impl From<SummaryRow> for Summary {
    fn from(row: SummaryRow) -> Self {
        Summary {
            id: parse_id(&row.id),
            extract_ids: split_list(&row.extract_ids)
                .iter()
                .filter_map(|id| id.parse().ok())
                .collect(),
            keywords: split_list(&row.keywords),
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            title: row.title,
            content: row.content,
        }
    }
}

impl From<&Summary> for SummaryRow {
    fn from(s: &Summary) -> Self {
        SummaryRow {
            id: s.id.to_string(),
            title: s.title.clone(),
            content: s.content.clone(),
            extract_ids: s
                .extract_ids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
            keywords: s.keywords.join(","),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

/// Storage backed by CSV files in a data directory
pub struct CsvStorage {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvStorage {
    /// Use `data_dir`, creating it if needed
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Read every row of `file`; a missing file reads as empty
    fn read_rows<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RegscopeError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read CSV file {:?}: {}", path, e),
                )))
            }
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for (row_num, result) in reader.deserialize().enumerate() {
            let row: T = result.map_err(|e| {
                RegscopeError::Parse(format!(
                    "Failed to parse {} row {}: {}",
                    file,
                    row_num + 1,
                    e
                ))
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rewrite `file` with `rows` via a temp file and rename
    fn write_rows<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<()> {
        let path = self.data_dir.join(file);
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = WriterBuilder::new().has_headers(true).from_path(&tmp)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn extracts(&self) -> Result<Vec<Extract>> {
        Ok(self
            .read_rows::<ExtractRow>(EXTRACTS_FILE)?
            .into_iter()
            .map(Extract::from)
            .collect())
    }

    fn keywords(&self) -> Result<Vec<Keyword>> {
        Ok(self
            .read_rows::<KeywordRow>(KEYWORDS_FILE)?
            .into_iter()
            .map(Keyword::from)
            .collect())
    }

    fn summaries(&self) -> Result<Vec<Summary>> {
        Ok(self
            .read_rows::<SummaryRow>(SUMMARIES_FILE)?
            .into_iter()
            .map(Summary::from)
            .collect())
    }
}

#[async_trait]
impl Storage for CsvStorage {
    async fn all_extracts(&self) -> Result<Vec<Extract>> {
        self.extracts()
    }

    async fn extract_by_id(&self, id: u32) -> Result<Option<Extract>> {
        Ok(self.extracts()?.into_iter().find(|e| e.id == id))
    }

    async fn search_extracts(&self, query: &str) -> Result<Vec<Extract>> {
        Ok(self
            .extracts()?
            .into_iter()
            .filter(|e| extract_matches_query(e, query))
            .collect())
    }

    async fn filter_extracts(&self, filter: &ExtractFilter) -> Result<Vec<Extract>> {
        Ok(self
            .extracts()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    async fn create_extract(&self, extract: NewExtract) -> Result<Extract> {
        let _guard = self.write_lock.lock().await;
        let mut extracts = self.extracts()?;
        let id = extracts.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let extract = extract.into_extract(id);
        extracts.push(extract.clone());

        let rows: Vec<ExtractRow> = extracts.iter().map(ExtractRow::from).collect();
        self.write_rows(EXTRACTS_FILE, &rows)?;
        tracing::info!("Created extract {} in {:?}", id, self.data_dir);
        Ok(extract)
    }

    async fn all_keywords(&self) -> Result<Vec<Keyword>> {
        self.keywords()
    }

    async fn keywords_by_category(&self, category: &str) -> Result<Vec<Keyword>> {
        Ok(self
            .keywords()?
            .into_iter()
            .filter(|k| k.category == category)
            .collect())
    }

    async fn search_keywords(&self, query: &str) -> Result<Vec<Keyword>> {
        Ok(self
            .keywords()?
            .into_iter()
            .filter(|k| keyword_matches_query(k, query))
            .collect())
    }

    async fn create_summary(&self, summary: NewSummary) -> Result<Summary> {
        let _guard = self.write_lock.lock().await;
        let mut summaries = self.summaries()?;
        let id = summaries.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let summary = summary.into_summary(id, Utc::now());
        summaries.push(summary.clone());

        let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
        self.write_rows(SUMMARIES_FILE, &rows)?;
        Ok(summary)
    }

    async fn summary_by_id(&self, id: u32) -> Result<Option<Summary>> {
        Ok(self.summaries()?.into_iter().find(|s| s.id == id))
    }

    fn backend_name(&self) -> &'static str {
        "csv"
    }
}
