//! Estimator configuration.

/// What a batch does when one entity fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailurePolicy {
    /// Return the first failing entity's error (in first-seen order).
    #[default]
    Abort,
    /// Attempt every entity and report failures alongside the fitted models.
    Collect,
}

/// Estimator configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Relative pseudoinverse cut-off: singular values at or below
    /// `pinv_rcond * σ_max` are treated as zero
    pub pinv_rcond: f64,
    /// Fit entities on the rayon pool; output order is unchanged
    pub parallel: bool,
    /// Per-entity failure handling
    pub failure_policy: FailurePolicy,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            pinv_rcond: 1e-15,
            parallel: false,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl EstimatorConfig {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
