use std::collections::HashMap;

use crate::models::Table;

/// Relabel columns using a code → cleaned-name mapping.
///
/// Columns absent from the mapping keep their original code, so an empty or
/// irrelevant mapping is the identity transform. If several codes map to the
/// same cleaned name the duplicates are passed through unchanged; downstream
/// shaping lets the later column win. A mapping whose cleaned value is empty
/// also leaves the original code in place.
pub fn rename_columns(data: &Table, code_to_clean_name: &HashMap<String, String>) -> Table {
    let columns = data
        .columns()
        .iter()
        .map(|code| match code_to_clean_name.get(code) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => code.clone(),
        })
        .collect();

    Table::new(columns, data.rows().to_vec())
}
