//! Core panel data structure.

use dmdc_core::EntityKey;

use crate::column::Column;
use crate::error::{PanelError, PanelResult};

/// A validated, immutable table of equally long named columns.
///
/// Rows are kept in insertion order; that order is treated as time order
/// within each entity.
#[derive(Debug, Clone)]
pub struct Panel {
    pub(crate) names: Vec<String>,
    pub(crate) columns: Vec<Column>,
    pub(crate) n_rows: usize,
}

impl Panel {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Get a column by name (returns None if absent).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Get a column by name, failing with `MissingColumn`.
    pub fn require(&self, name: &str) -> PanelResult<&Column> {
        self.column(name).ok_or_else(|| PanelError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Numeric values of `name` at the selected rows, in the given order.
    pub fn numeric(&self, name: &str, rows: &[usize]) -> PanelResult<Vec<f64>> {
        let column = self.require(name)?;
        if !column.is_numeric() {
            return Err(PanelError::NotNumeric {
                column: name.to_string(),
            });
        }
        // Row indices come from this panel, so they are in range
        Ok(rows
            .iter()
            .map(|&r| column.as_f64(r).unwrap_or(f64::NAN))
            .collect())
    }

    /// Entity keys for every row of the id column `name`.
    pub fn keys(&self, name: &str) -> PanelResult<Vec<EntityKey>> {
        match self.require(name)? {
            Column::Int(v) => Ok(v.iter().copied().map(EntityKey::Int).collect()),
            Column::Text(v) => Ok(v.iter().cloned().map(EntityKey::Text).collect()),
            Column::Float(_) => Err(PanelError::UnsupportedIdType {
                column: name.to_string(),
            }),
        }
    }
}
