use serde_json::Value;

use crosslens_common::{CrossLensError, Result};

/// Trim and collapse internal whitespace runs to single spaces.
///
/// Fails with `InvalidInput` when nothing is left, before any model call is
/// made on the caller's behalf.
pub fn normalize_query(raw: &str) -> Result<String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Err(CrossLensError::InvalidInput(
            "Query cannot be empty after normalisation".to_string(),
        ));
    }
    Ok(normalized)
}

/// Clean a list field from a model payload: non-string entries are dropped,
/// strings trimmed, empties dropped. A missing or non-array field yields an
/// empty list.
pub fn clean_list(value: Option<&Value>, uppercase: bool) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| if uppercase { s.to_uppercase() } else { s.to_string() })
        .collect()
}
