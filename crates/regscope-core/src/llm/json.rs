//! Decoding structured JSON out of free-text completions

use crate::error::{RegscopeError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;

lazy_static! {
    static ref FENCED_JSON: Regex =
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fence regex");
}

/// Locate the JSON object in a completion: a fenced block if present, else
/// the span from the first `{` to the last `}`
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(caps) = FENCED_JSON.captures(response) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// Decode a completion into `T`, failing with `Parse` when no object matches
pub fn decode_json<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_str = extract_json(response)
        .ok_or_else(|| RegscopeError::Parse("no JSON object in completion".to_string()))?;
    serde_json::from_str(json_str).map_err(|e| RegscopeError::Parse(e.to_string()))
}

/// Decode a completion, logging and returning `None` when it does not parse
///
/// `site` names the call site in the warning so fallbacks can be traced.
pub fn decode_logged<T: DeserializeOwned>(response: &str, site: &str) -> Option<T> {
    match decode_json(response) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("{}: unparseable completion, using fallback ({})", site, e);
            tracing::debug!("{}: raw completion: {}", site, response);
            None
        }
    }
}

/// Decode a completion, substituting `fallback()` when it does not parse
pub fn decode_or_else<T, F>(response: &str, site: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    decode_logged(response, site).unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        score: u32,
    }

    #[test]
    fn test_extract_plain_object() {
        assert_eq!(extract_json(r#"{"score": 80}"#), Some(r#"{"score": 80}"#));
    }

    #[test]
    fn test_extract_fenced_object() {
        let response = "Here you go:\n```json\n{\"score\": 72}\n```\nAnything else?";
        assert_eq!(extract_json(response), Some("{\"score\": 72}"));
    }

    #[test]
    fn test_extract_embedded_object() {
        let response = "Assessment: {\"score\": 41} (approximate)";
        let probe: Probe = decode_json(response).unwrap();
        assert_eq!(probe, Probe { score: 41 });
    }

    #[test]
    fn test_decode_without_object_is_parse_error() {
        let err = decode_json::<Probe>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, RegscopeError::Parse(_)));
    }

    #[test]
    fn test_decode_or_else_uses_fallback() {
        let probe = decode_or_else("{ not json }", "probe", || Probe { score: 60 });
        assert_eq!(probe.score, 60);

        let probe = decode_or_else(r#"{"score": 90}"#, "probe", || Probe { score: 60 });
        assert_eq!(probe.score, 90);
    }
}
