//! Column storage.

/// A single named column's values.
///
/// Columns are homogeneous; mixed-type columns are not representable.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl Column {
    /// Number of rows held by the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric value at `row`, widening integers. `None` for text or out of range.
    pub fn as_f64(&self, row: usize) -> Option<f64> {
        match self {
            Column::Float(v) => v.get(row).copied(),
            Column::Int(v) => v.get(row).map(|&x| x as f64),
            Column::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Column::Text(_))
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Text(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Text(v.into_iter().map(str::to_owned).collect())
    }
}
