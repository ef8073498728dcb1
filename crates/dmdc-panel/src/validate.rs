//! Panel validation logic.

use std::collections::HashSet;

use crate::column::Column;
use crate::error::{PanelError, PanelResult};

/// Validate the column set: non-empty, unique names, equal lengths.
///
/// Returns the shared row count.
pub(crate) fn validate_columns(names: &[String], columns: &[Column]) -> PanelResult<usize> {
    let Some(first) = columns.first() else {
        return Err(PanelError::Empty);
    };
    let n_rows = first.len();

    let mut seen: HashSet<&str> = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(PanelError::DuplicateColumn {
                column: name.clone(),
            });
        }
    }

    for (name, column) in names.iter().zip(columns) {
        if column.len() != n_rows {
            return Err(PanelError::LengthMismatch {
                column: name.clone(),
                expected: n_rows,
                actual: column.len(),
            });
        }
    }

    Ok(n_rows)
}
