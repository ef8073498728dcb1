//! Per-entity DMDc fit.
//!
//! Given one entity's time-ordered states `x[0..T]` (T×n) and control
//! inputs `u[0..T]`, build
//!
//! - `Omega = [log x[0..T-1]ᵀ ; u[0..T-1]ᵀ]`, shape (n+1)×(T-1)
//! - `X2 = log x[1..T]ᵀ`, shape n×(T-1)
//!
//! and solve `X2 ≈ AB · Omega` as `AB = X2 · pinv(Omega)`. The first n
//! columns of AB are A, the last column is B. Singular values of Omega at
//! or below `rcond · σ_max` are dropped from the pseudoinverse.

use dmdc_core::EntityKey;
use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{EstimatorError, EstimatorResult};
use crate::model::EntityModel;

/// Fit A (n×n) and B (n×1) for one entity.
///
/// `states` holds one observation per row and one state variable per
/// column, in time order. `inputs[t]` is the control input at row `t`.
/// `pinv_rcond` is the relative singular-value cut-off.
pub fn fit_entity(
    key: EntityKey,
    states: &DMatrix<f64>,
    inputs: &[f64],
    state_dim: usize,
    pinv_rcond: f64,
) -> EstimatorResult<EntityModel> {
    let (t, n) = states.shape();

    if n != state_dim {
        return Err(EstimatorError::DimensionMismatch {
            declared: state_dim,
            columns: n,
        });
    }
    if inputs.len() != t {
        return Err(EstimatorError::InputLength {
            key,
            states: t,
            inputs: inputs.len(),
        });
    }
    if t < 2 {
        return Err(EstimatorError::InsufficientObservations { key, rows: t });
    }

    let log_states = log_states(&key, states)?;
    for (observation, &value) in inputs.iter().enumerate() {
        if !value.is_finite() {
            return Err(EstimatorError::NonFiniteInput {
                key,
                observation,
                value,
            });
        }
    }

    let m = t - 1;
    let (omega, x2) = lagged_matrices(&log_states, inputs);

    debug!(
        entity = %key,
        observations = t,
        state_dim = n,
        "fitting DMDc operator"
    );

    let omega_pinv = pseudo_inverse(&key, omega, pinv_rcond)?;

    // n×(T-1) · (T-1)×(n+1)
    let ab = x2 * omega_pinv;
    debug_assert_eq!(ab.shape(), (n, n + 1));

    let a = ab.columns(0, n).into_owned();
    let b = ab.columns(n, 1).into_owned();
    debug!(entity = %key, samples = m, "DMDc operator fitted");

    Ok(EntityModel {
        key,
        a,
        b,
        observations: t,
    })
}

/// Moore–Penrose pseudoinverse with a cut-off relative to the largest
/// singular value.
fn pseudo_inverse(
    key: &EntityKey,
    omega: DMatrix<f64>,
    rcond: f64,
) -> EstimatorResult<DMatrix<f64>> {
    let svd = omega.svd(true, true);
    let sigma_max = svd.singular_values.max();
    if sigma_max <= 0.0 {
        // An all-zero regressor would give all-zero operators
        return Err(EstimatorError::Pseudoinverse {
            key: key.clone(),
            reason: format!("regressor has no nonzero singular value (max {sigma_max})"),
        });
    }

    svd.pseudo_inverse(rcond * sigma_max)
        .map_err(|reason| EstimatorError::Pseudoinverse {
            key: key.clone(),
            reason: reason.to_string(),
        })
}

/// Elementwise natural log of the state matrix; every entry must be positive
/// and finite.
fn log_states(key: &EntityKey, states: &DMatrix<f64>) -> EstimatorResult<DMatrix<f64>> {
    for observation in 0..states.nrows() {
        for state in 0..states.ncols() {
            let value = states[(observation, state)];
            if !value.is_finite() {
                return Err(EstimatorError::NonFiniteState {
                    key: key.clone(),
                    observation,
                    state,
                    value,
                });
            }
            if value <= 0.0 {
                return Err(EstimatorError::NonPositiveState {
                    key: key.clone(),
                    observation,
                    state,
                    value,
                });
            }
        }
    }
    Ok(states.map(f64::ln))
}

/// Build the augmented regressor `Omega` and target `X2` from log-states.
fn lagged_matrices(log_states: &DMatrix<f64>, inputs: &[f64]) -> (DMatrix<f64>, DMatrix<f64>) {
    let (t, n) = log_states.shape();
    let m = t - 1;

    let omega = DMatrix::from_fn(n + 1, m, |i, j| {
        if i < n { log_states[(j, i)] } else { inputs[j] }
    });
    let x2 = DMatrix::from_fn(n, m, |i, j| log_states[(j + 1, i)]);

    (omega, x2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lagged_matrices_layout() {
        let log_states = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let (omega, x2) = lagged_matrices(&log_states, &[0.1, 0.2, 0.3]);

        assert_eq!(omega.shape(), (3, 2));
        assert_eq!(x2.shape(), (2, 2));
        // Column j of Omega is [log x[j]; u[j]]
        assert_eq!(omega.column(0).as_slice(), &[1.0, 2.0, 0.1]);
        assert_eq!(omega.column(1).as_slice(), &[3.0, 4.0, 0.2]);
        // Column j of X2 is log x[j+1]
        assert_eq!(x2.column(0).as_slice(), &[3.0, 4.0]);
        assert_eq!(x2.column(1).as_slice(), &[5.0, 6.0]);
    }

    #[test]
    fn recovers_known_scalar_system() {
        // log x[t+1] = 0.5 log x[t] + 0.2 u[t]
        let u = [1.0, -0.5, 0.3, 2.0, -1.0, 0.7];
        let mut log_x = vec![1.3_f64];
        for k in 0..u.len() - 1 {
            log_x.push(0.5 * log_x[k] + 0.2 * u[k]);
        }
        let states = DMatrix::from_iterator(u.len(), 1, log_x.iter().map(|v| v.exp()));

        let model = fit_entity(EntityKey::from("s"), &states, &u, 1, 1e-15).unwrap();
        assert_relative_eq!(model.a[(0, 0)], 0.5, epsilon = 1e-9);
        assert_relative_eq!(model.b[(0, 0)], 0.2, epsilon = 1e-9);
    }

    #[test]
    fn single_observation_is_an_error() {
        let states = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let err = fit_entity(EntityKey::from("E1"), &states, &[0.1], 2, 1e-15).unwrap_err();
        assert_eq!(
            err,
            EstimatorError::InsufficientObservations {
                key: EntityKey::from("E1"),
                rows: 1
            }
        );
    }

    #[test]
    fn zero_state_is_a_domain_error() {
        let states = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 3.0]);
        let err = fit_entity(EntityKey::from(5), &states, &[0.1, 0.2], 2, 1e-15).unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::NonPositiveState {
                observation: 1,
                state: 0,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_state_is_not_called_non_positive() {
        let states = DMatrix::from_row_slice(2, 1, &[f64::INFINITY, 2.0]);
        let err = fit_entity(EntityKey::from(5), &states, &[0.1, 0.2], 1, 1e-15).unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::NonFiniteState { observation: 0, state: 0, .. }
        ));
    }

    #[test]
    fn tiny_scale_regressor_keeps_its_singular_values() {
        // Omega's singular values are all around 1e-13
        let log_x: Vec<f64> = (0..6).map(|k| 1e-13 * (1.0 + 0.5_f64.powi(k))).collect();
        let u: Vec<f64> = (0..6).map(|k| 1e-13 * ((k % 3) as f64 - 1.0)).collect();
        let states = DMatrix::from_iterator(6, 1, log_x.iter().map(|v| v.exp()));

        let model = fit_entity(EntityKey::from("tiny"), &states, &u, 1, 1e-15).unwrap();
        assert!(model.a[(0, 0)].is_finite() && model.a[(0, 0)] != 0.0);
        assert!(model.b[(0, 0)].is_finite() && model.b[(0, 0)] != 0.0);
    }

    #[test]
    fn all_zero_regressor_is_an_error() {
        // log 1 = 0 and u = 0 everywhere
        let states = DMatrix::from_element(4, 2, 1.0);
        let err = fit_entity(EntityKey::from("flat"), &states, &[0.0; 4], 2, 1e-15).unwrap_err();
        assert!(matches!(err, EstimatorError::Pseudoinverse { .. }));
    }

    #[test]
    fn nan_input_is_reported() {
        let states = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let err = fit_entity(EntityKey::from(5), &states, &[0.1, f64::NAN], 1, 1e-15).unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::NonFiniteInput { observation: 1, .. }
        ));
    }

    #[test]
    fn declared_dim_must_match_state_columns() {
        let states = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let err = fit_entity(EntityKey::from(1), &states, &[0.0, 0.0], 3, 1e-15).unwrap_err();
        assert_eq!(
            err,
            EstimatorError::DimensionMismatch {
                declared: 3,
                columns: 2
            }
        );
    }

    #[test]
    fn input_length_must_match_rows() {
        let states = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let err = fit_entity(EntityKey::from(1), &states, &[0.0], 1, 1e-15).unwrap_err();
        assert!(matches!(err, EstimatorError::InputLength { .. }));
    }
}
