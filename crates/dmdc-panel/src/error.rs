//! Panel-specific error types.

pub type PanelResult<T> = Result<T, PanelError>;

/// Panel construction and access errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// The builder was given no columns.
    Empty,

    /// A column's row count differs from the first column's.
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The same column name was added twice.
    DuplicateColumn { column: String },

    /// A required column is absent.
    MissingColumn { column: String },

    /// A numeric column was requested but the column holds text.
    NotNumeric { column: String },

    /// The id column holds floats, which cannot serve as entity keys.
    UnsupportedIdType { column: String },
}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelError::Empty => write!(f, "Panel has no columns"),
            PanelError::LengthMismatch {
                column,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Column '{}' has {} rows (expected {})",
                    column, actual, expected
                )
            }
            PanelError::DuplicateColumn { column } => {
                write!(f, "Column '{}' appears more than once", column)
            }
            PanelError::MissingColumn { column } => {
                write!(f, "Required column '{}' is missing", column)
            }
            PanelError::NotNumeric { column } => {
                write!(f, "Column '{}' is not numeric", column)
            }
            PanelError::UnsupportedIdType { column } => {
                write!(
                    f,
                    "Column '{}' holds floats and cannot identify entities",
                    column
                )
            }
        }
    }
}

impl std::error::Error for PanelError {}
