//! Incremental panel builder.

use crate::column::Column;
use crate::error::PanelResult;
use crate::panel::Panel;
use crate::validate;

/// Builder for constructing a panel column by column.
///
/// Use `add_column` (or the chaining `column`) to register columns,
/// then call `build()` to validate and freeze them into an immutable `Panel`.
#[derive(Debug, Default)]
pub struct PanelBuilder {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl PanelBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named column. Validation is deferred to `build()`.
    pub fn add_column(&mut self, name: impl Into<String>, values: impl Into<Column>) -> &mut Self {
        self.names.push(name.into());
        self.columns.push(values.into());
        self
    }

    /// Chaining form of `add_column`.
    pub fn column(mut self, name: impl Into<String>, values: impl Into<Column>) -> Self {
        self.add_column(name, values);
        self
    }

    /// Build and validate the panel.
    pub fn build(self) -> PanelResult<Panel> {
        let n_rows = validate::validate_columns(&self.names, &self.columns)?;

        Ok(Panel {
            names: self.names,
            columns: self.columns,
            n_rows,
        })
    }
}
