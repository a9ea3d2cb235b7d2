//! JSON extraction from raw model responses, which sometimes wrap the
//! payload in prose or code fences despite the instruction.

use serde::de::DeserializeOwned;

use crate::error::{RecommenderError, Result};

/// Returns the outermost JSON object embedded in `response`.
pub fn extract_json_object(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(RecommenderError::GenerationFailed(format!(
            "No JSON object found in response | Raw: {}",
            truncate(response)
        ))),
    }
}

/// Extracts and decodes the JSON object in `response` into `T`.
pub fn decode_response<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_str = extract_json_object(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        RecommenderError::GenerationFailed(format!(
            "Invalid JSON from model: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })
}

fn truncate(text: &str) -> String {
    if text.len() > 200 {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < 200)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    } else {
        text.to_string()
    }
}
