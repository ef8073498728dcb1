//! Fitted per-entity operators and the ordered result table.

use dmdc_core::EntityKey;
use nalgebra::{DMatrix, DVector};

use crate::error::{EstimatorError, EstimatorResult};

/// Fitted DMDc operators for one entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityModel {
    /// Identifier value from the input panel
    pub key: EntityKey,
    /// State transition operator, n×n
    pub a: DMatrix<f64>,
    /// Control operator, n×1
    pub b: DMatrix<f64>,
    /// Number of observations the fit used
    pub observations: usize,
}

impl EntityModel {
    pub fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    /// One step in log space: `A · log_x + B · u`.
    pub fn step_log(&self, log_x: &DVector<f64>, u: f64) -> EstimatorResult<DVector<f64>> {
        let n = self.state_dim();
        if log_x.len() != n {
            return Err(EstimatorError::DimensionMismatch {
                declared: n,
                columns: log_x.len(),
            });
        }
        Ok(&self.a * log_x + self.b.column(0) * u)
    }

    /// One step in level space: `exp(A · log x + B · u)`.
    pub fn step(&self, x: &DVector<f64>, u: f64) -> EstimatorResult<DVector<f64>> {
        Ok(self.step_log(&x.map(f64::ln), u)?.map(f64::exp))
    }

    /// Root-mean-square one-step residual in log space over a state/input
    /// sequence laid out like the fit input (T×n states, T inputs).
    pub fn log_residual_rms(&self, states: &DMatrix<f64>, inputs: &[f64]) -> EstimatorResult<f64> {
        let (t, n) = states.shape();
        if n != self.state_dim() {
            return Err(EstimatorError::DimensionMismatch {
                declared: self.state_dim(),
                columns: n,
            });
        }
        if inputs.len() != t {
            return Err(EstimatorError::InputLength {
                key: self.key.clone(),
                states: t,
                inputs: inputs.len(),
            });
        }
        if t < 2 {
            return Err(EstimatorError::InsufficientObservations {
                key: self.key.clone(),
                rows: t,
            });
        }

        let log_states = states.map(f64::ln);
        let mut sum_sq = 0.0;
        for k in 0..t - 1 {
            let current = log_states.row(k).transpose();
            let predicted = self.step_log(&current, inputs[k])?;
            let actual = log_states.row(k + 1).transpose();
            sum_sq += (actual - predicted).norm_squared();
        }
        Ok((sum_sq / ((t - 1) * n) as f64).sqrt())
    }
}

/// Fitted models in the order each identifier first appeared.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelTable {
    id_column: String,
    models: Vec<EntityModel>,
}

impl ModelTable {
    pub fn new(id_column: impl Into<String>, models: Vec<EntityModel>) -> Self {
        Self {
            id_column: id_column.into(),
            models,
        }
    }

    /// Name of the identifier column the table is keyed by.
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityModel> {
        self.models.iter()
    }

    /// Identifiers in table order.
    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.models.iter().map(|m| &m.key)
    }

    /// Look up an entity's model by identifier.
    pub fn get(&self, key: &EntityKey) -> Option<&EntityModel> {
        self.models.iter().find(|m| &m.key == key)
    }

    pub fn into_models(self) -> Vec<EntityModel> {
        self.models
    }
}

impl<'a> IntoIterator for &'a ModelTable {
    type Item = &'a EntityModel;
    type IntoIter = std::slice::Iter<'a, EntityModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
