//! Per-entity Dynamic Mode Decomposition with Control (DMDc).
//!
//! For every entity in a panel, this crate fits the linear model
//!
//! ```text
//! log x[t+1] ≈ A · log x[t] + B · u[t]
//! ```
//!
//! by stacking lagged log-states and the control input into an augmented
//! regressor and solving the least-squares system through the Moore–Penrose
//! pseudoinverse. Entities are independent; results come back in the order
//! each identifier first appears in the panel.

pub mod config;
pub mod dmdc;
pub mod error;
pub mod estimate;
pub mod model;

pub use config::{EstimatorConfig, FailurePolicy};
pub use dmdc::fit_entity;
pub use error::{EstimatorError, EstimatorResult};
pub use estimate::{
    BatchReport, DmdcRequest, EntityFailure, estimate, estimate_each, estimate_with_config,
};
pub use model::{EntityModel, ModelTable};
