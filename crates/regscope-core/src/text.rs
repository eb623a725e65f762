//! Small text helpers shared by the catalog and the workflow

/// First `max_chars` characters of `text` followed by `...`
///
/// The ellipsis is always appended, so previews read the same whether or
/// not the source was longer than the limit.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Lower-cased whitespace-separated terms of a search query
pub fn query_terms(query: &str, min_len: usize) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() >= min_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ab", 3), "ab...");
        assert_eq!(preview("€€€€", 2), "€€...");
    }

    #[test]
    fn test_query_terms() {
        assert_eq!(query_terms("Basel III  capital", 1), vec!["basel", "iii", "capital"]);
        assert_eq!(query_terms("of the CET1 ratio", 3), vec!["the", "cet1", "ratio"]);
        assert!(query_terms("   ", 1).is_empty());
    }
}
