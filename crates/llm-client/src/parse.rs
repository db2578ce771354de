//! JSON scraping from free-text model output.
//!
//! Models wrap their JSON in prose, markdown fences, or both. The rule is
//! deliberately blunt: everything from the first `{` to the last `}`.

use crate::error::{ExtractionError, ExtractionResult};
use serde::de::DeserializeOwned;

/// The first-`{`-to-last-`}` span of a completion, if any.
pub fn extract_json_span(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}

/// Scrape a JSON object out of a free-text completion and deserialize it.
pub fn extract_json<T: DeserializeOwned>(content: &str) -> ExtractionResult<T> {
    let span = extract_json_span(content).ok_or(ExtractionError::MissingJson)?;
    Ok(serde_json::from_str(span)?)
}
