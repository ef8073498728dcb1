//! Error types for estimation.

use dmdc_core::EntityKey;
use dmdc_panel::PanelError;
use thiserror::Error;

/// Errors that can occur while estimating per-entity operators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("Panel error: {0}")]
    Panel(#[from] PanelError),

    #[error("No state columns given")]
    NoStateColumns,

    #[error("Declared state dimension {declared} does not match {columns} state columns")]
    DimensionMismatch { declared: usize, columns: usize },

    #[error("Entity {key} has {states} state rows but {inputs} control inputs")]
    InputLength {
        key: EntityKey,
        states: usize,
        inputs: usize,
    },

    #[error("Entity {key} has {rows} observation(s); at least 2 are needed")]
    InsufficientObservations { key: EntityKey, rows: usize },

    #[error(
        "Entity {key}: state {state} at observation {observation} is {value}; log requires a positive value"
    )]
    NonPositiveState {
        key: EntityKey,
        observation: usize,
        state: usize,
        value: f64,
    },

    /// NaN or infinite state value.
    #[error("Entity {key}: state {state} at observation {observation} is {value}")]
    NonFiniteState {
        key: EntityKey,
        observation: usize,
        state: usize,
        value: f64,
    },

    #[error("Entity {key}: control input at observation {observation} is {value}")]
    NonFiniteInput {
        key: EntityKey,
        observation: usize,
        value: f64,
    },

    /// The SVD pseudoinverse failed, or the regressor has no nonzero singular value.
    #[error("Entity {key}: pseudoinverse failed: {reason}")]
    Pseudoinverse { key: EntityKey, reason: String },

    /// Collected failures surfaced by an entry point that only returns a table.
    #[error("{} entities could not be fitted; first: {first}", .failed.len())]
    EntitiesFailed {
        failed: Vec<EntityKey>,
        first: Box<EstimatorError>,
    },
}

pub type EstimatorResult<T> = Result<T, EstimatorError>;

impl EstimatorError {
    /// Entity the error belongs to, if it is entity-specific.
    pub fn key(&self) -> Option<&EntityKey> {
        match self {
            EstimatorError::InputLength { key, .. }
            | EstimatorError::InsufficientObservations { key, .. }
            | EstimatorError::NonPositiveState { key, .. }
            | EstimatorError::NonFiniteState { key, .. }
            | EstimatorError::NonFiniteInput { key, .. }
            | EstimatorError::Pseudoinverse { key, .. } => Some(key),
            EstimatorError::Panel(_)
            | EstimatorError::NoStateColumns
            | EstimatorError::DimensionMismatch { .. }
            | EstimatorError::EntitiesFailed { .. } => None,
        }
    }
}
