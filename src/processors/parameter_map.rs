use std::collections::HashMap;

use crate::error::{IngestError, Result};
use crate::models::Table;

/// Header names for the code and English-description columns in the SMN
/// parameter metadata file. Matched by name first; the positional fallbacks
/// below assume the published column order (code first, English description
/// fifth) and only apply when the headers are absent.
const CODE_COLUMN: &str = "parameter";
const DESCRIPTION_COLUMN: &str = "parameter_description_en";
const CODE_COLUMN_INDEX: usize = 0;
const DESCRIPTION_COLUMN_INDEX: usize = 4;

/// Build the parameter-code → English-description dictionary from the
/// metadata table.
///
/// Rows with a blank code or description are dropped, and both sides are
/// whitespace-trimmed. Duplicate codes keep the last occurrence (plain map
/// insertion order).
pub fn build_parameter_map(metadata: &Table) -> Result<HashMap<String, String>> {
    let code_idx = metadata
        .column_index(CODE_COLUMN)
        .unwrap_or(CODE_COLUMN_INDEX);
    let desc_idx = metadata
        .column_index(DESCRIPTION_COLUMN)
        .unwrap_or(DESCRIPTION_COLUMN_INDEX);

    let needed = code_idx.max(desc_idx) + 1;
    if metadata.width() < needed {
        return Err(IngestError::Schema(format!(
            "parameter metadata has {} columns, need at least {}",
            metadata.width(),
            needed
        )));
    }

    let mut map = HashMap::new();
    for row in 0..metadata.row_count() {
        let code = metadata.value(row, code_idx).unwrap_or("").trim();
        let description = metadata.value(row, desc_idx).unwrap_or("").trim();

        if code.is_empty() || description.is_empty() {
            continue;
        }

        map.insert(code.to_string(), description.to_string());
    }

    Ok(map)
}

/// Derive a clean snake_case field name from a parameter description.
///
/// Keeps the text before the first `;`, lowercases it, collapses every run
/// of non-alphanumeric characters into a single underscore, and strips
/// leading/trailing underscores. Idempotent.
pub fn clean_name(description: &str) -> String {
    let head = description.split(';').next().unwrap_or("");

    let mut cleaned = String::with_capacity(head.len());
    for ch in head.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
        } else if !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }

    cleaned.trim_matches('_').to_string()
}
