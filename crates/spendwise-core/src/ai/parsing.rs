//! JSON parsing helpers for AI backend responses
//!
//! These functions extract JSON from AI model responses, which often include
//! extra text before/after the JSON payload.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Longest raw snippet included in error messages
const RAW_SNIPPET_LEN: usize = 200;

/// Find the first balanced JSON object, ignoring braces inside strings
pub fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in response[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..=start + i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the JSON object from a response and deserialize it into `T`
///
/// `what` names the contract for error messages ("spending advice", ...).
pub fn parse_json_response<T: DeserializeOwned>(response: &str, what: &str) -> Result<T> {
    let response = response.trim();

    let Some(json_str) = extract_json_object(response) else {
        return Err(Error::InvalidResponse(format!(
            "No JSON found in {} response | Raw: {}",
            what,
            truncate(response)
        )));
    };

    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidResponse(format!(
            "Invalid {} JSON: {} | Raw: {}",
            what,
            e,
            truncate(json_str)
        ))
    })
}

fn truncate(s: &str) -> String {
    match s.char_indices().nth(RAW_SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
