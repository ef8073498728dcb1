//! Batch estimation over a panel.

use dmdc_core::EntityKey;
use dmdc_panel::{EntityIndex, Panel};
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{EstimatorConfig, FailurePolicy};
use crate::dmdc::fit_entity;
use crate::error::{EstimatorError, EstimatorResult};
use crate::model::{EntityModel, ModelTable};

/// Which panel columns to read and the declared state dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmdcRequest {
    /// Column whose distinct values partition rows into entities
    pub id_column: String,
    /// State variables; their order fixes the row/column order of A and B
    pub state_columns: Vec<String>,
    /// Scalar control input column
    pub input_column: String,
    /// Declared state dimension n
    pub state_dim: usize,
}

impl DmdcRequest {
    pub fn new<S: Into<String>>(
        id_column: impl Into<String>,
        state_columns: impl IntoIterator<Item = S>,
        input_column: impl Into<String>,
        state_dim: usize,
    ) -> Self {
        Self {
            id_column: id_column.into(),
            state_columns: state_columns.into_iter().map(Into::into).collect(),
            input_column: input_column.into(),
            state_dim,
        }
    }
}

/// A single entity that could not be fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFailure {
    pub key: EntityKey,
    pub error: EstimatorError,
}

/// Outcome of a batch run under `FailurePolicy::Collect`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Successfully fitted entities, in first-seen order
    pub table: ModelTable,
    /// Failed entities, in first-seen order
    pub failures: Vec<EntityFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Estimate A and B for every entity with the default configuration.
pub fn estimate(panel: &Panel, request: &DmdcRequest) -> EstimatorResult<ModelTable> {
    estimate_with_config(panel, request, &EstimatorConfig::default())
}

/// Estimate A and B for every entity.
///
/// The returned table always covers every entity. Under
/// `FailurePolicy::Abort` the first failing entity's error is returned;
/// under `FailurePolicy::Collect` every entity is attempted and any failure
/// yields `EntitiesFailed`. Use `estimate_each` to keep the fitted subset.
pub fn estimate_with_config(
    panel: &Panel,
    request: &DmdcRequest,
    config: &EstimatorConfig,
) -> EstimatorResult<ModelTable> {
    let report = estimate_each(panel, request, config)?;
    let mut failures = report.failures.into_iter();
    match failures.next() {
        None => Ok(report.table),
        Some(first) => {
            let mut failed = vec![first.key];
            failed.extend(failures.map(|f| f.key));
            Err(EstimatorError::EntitiesFailed {
                failed,
                first: Box::new(first.error),
            })
        }
    }
}

/// Estimate every entity and report per-entity failures.
///
/// Column and dimension problems fail the whole call before any matrix
/// work. Entity-level failures follow `config.failure_policy`.
pub fn estimate_each(
    panel: &Panel,
    request: &DmdcRequest,
    config: &EstimatorConfig,
) -> EstimatorResult<BatchReport> {
    validate_request(panel, request)?;
    let index = EntityIndex::from_panel(panel, &request.id_column)?;

    let entities: Vec<(&EntityKey, &[usize])> = index.iter().collect();
    let fit = |&(key, rows): &(&EntityKey, &[usize])| fit_rows(panel, request, config, key, rows);

    let outcomes: Vec<EstimatorResult<EntityModel>> = match (config.parallel, config.failure_policy)
    {
        (false, FailurePolicy::Abort) => {
            // Stop at the first failure without touching later entities
            let mut models = Vec::with_capacity(entities.len());
            for entity in &entities {
                models.push(fit(entity)?);
            }
            models.into_iter().map(Ok).collect()
        }
        (false, FailurePolicy::Collect) => entities.iter().map(fit).collect(),
        (true, _) => entities.par_iter().map(fit).collect(),
    };

    let mut models = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (outcome, (key, _)) in outcomes.into_iter().zip(&entities) {
        match outcome {
            Ok(model) => models.push(model),
            Err(error) if config.failure_policy == FailurePolicy::Abort => return Err(error),
            Err(error) => {
                warn!(entity = %key, %error, "entity skipped");
                failures.push(EntityFailure {
                    key: (*key).clone(),
                    error,
                });
            }
        }
    }

    info!(
        entities = entities.len(),
        fitted = models.len(),
        failed = failures.len(),
        "DMDc batch finished"
    );

    Ok(BatchReport {
        table: ModelTable::new(request.id_column.clone(), models),
        failures,
    })
}

/// Check columns and the declared dimension up front.
fn validate_request(panel: &Panel, request: &DmdcRequest) -> EstimatorResult<()> {
    panel.require(&request.id_column)?;
    for column in &request.state_columns {
        panel.require(column)?;
    }
    panel.require(&request.input_column)?;

    if request.state_columns.is_empty() {
        return Err(EstimatorError::NoStateColumns);
    }
    if request.state_dim != request.state_columns.len() {
        return Err(EstimatorError::DimensionMismatch {
            declared: request.state_dim,
            columns: request.state_columns.len(),
        });
    }
    Ok(())
}

/// Gather one entity's rows into a T×n state matrix plus inputs and fit.
fn fit_rows(
    panel: &Panel,
    request: &DmdcRequest,
    config: &EstimatorConfig,
    key: &EntityKey,
    rows: &[usize],
) -> EstimatorResult<EntityModel> {
    let columns = request
        .state_columns
        .iter()
        .map(|column| panel.numeric(column, rows))
        .collect::<Result<Vec<_>, _>>()?;
    let states = DMatrix::from_fn(rows.len(), columns.len(), |t, j| columns[j][t]);
    let inputs = panel.numeric(&request.input_column, rows)?;

    fit_entity(
        key.clone(),
        &states,
        &inputs,
        request.state_dim,
        config.pinv_rcond,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmdc_panel::{PanelBuilder, PanelError};

    fn two_entity_panel() -> Panel {
        PanelBuilder::new()
            .column("id", vec!["p", "q", "p", "q", "p"])
            .column("x1", vec![1.0, 2.0, 1.5, 2.5, 1.2])
            .column("x2", vec![3.0, 1.0, 2.0, 1.1, 2.2])
            .column("u", vec![0.1, 0.0, 0.2, 0.4, 0.3])
            .build()
            .unwrap()
    }

    #[test]
    fn missing_input_column_fails_before_fitting() {
        let panel = two_entity_panel();
        let request = DmdcRequest::new("id", ["x1", "x2"], "control", 2);
        let err = estimate(&panel, &request).unwrap_err();
        assert_eq!(
            err,
            EstimatorError::Panel(PanelError::MissingColumn {
                column: "control".to_string()
            })
        );
    }

    #[test]
    fn declared_dim_is_checked_eagerly() {
        let panel = two_entity_panel();
        let request = DmdcRequest::new("id", ["x1", "x2"], "u", 3);
        assert_eq!(
            estimate(&panel, &request).unwrap_err(),
            EstimatorError::DimensionMismatch {
                declared: 3,
                columns: 2
            }
        );
    }

    #[test]
    fn empty_state_columns_rejected() {
        let panel = two_entity_panel();
        let request = DmdcRequest::new("id", Vec::<String>::new(), "u", 0);
        assert_eq!(
            estimate(&panel, &request).unwrap_err(),
            EstimatorError::NoStateColumns
        );
    }

    #[test]
    fn interleaved_entities_keep_first_seen_order() {
        let panel = two_entity_panel();
        let request = DmdcRequest::new("id", ["x1", "x2"], "u", 2);
        let table = estimate(&panel, &request).unwrap();

        let keys: Vec<&EntityKey> = table.keys().collect();
        assert_eq!(keys, vec![&EntityKey::from("p"), &EntityKey::from("q")]);
        assert_eq!(table.get(&"p".into()).unwrap().observations, 3);
        assert_eq!(table.get(&"q".into()).unwrap().observations, 2);
    }

    #[test]
    fn collect_policy_reports_short_entity() {
        let panel = PanelBuilder::new()
            .column("id", vec![1_i64, 1, 2, 1])
            .column("x", vec![1.0, 1.1, 5.0, 1.3])
            .column("u", vec![0.0, 1.0, 0.5, 0.2])
            .build()
            .unwrap();
        let request = DmdcRequest::new("id", ["x"], "u", 1);

        let abort = estimate(&panel, &request).unwrap_err();
        assert_eq!(
            abort,
            EstimatorError::InsufficientObservations {
                key: EntityKey::Int(2),
                rows: 1
            }
        );

        let config = EstimatorConfig::default().failure_policy(FailurePolicy::Collect);
        let report = estimate_each(&panel, &request, &config).unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, EntityKey::Int(2));
    }

    #[test]
    fn table_entry_point_never_returns_a_partial_table() {
        let panel = PanelBuilder::new()
            .column("id", vec!["a", "short", "a", "b", "b"])
            .column("x", vec![1.0, 2.0, 1.2, 3.0, 2.9])
            .column("u", vec![0.0, 1.0, 0.5, 0.2, 0.1])
            .build()
            .unwrap();
        let request = DmdcRequest::new("id", ["x"], "u", 1);
        let config = EstimatorConfig::default().failure_policy(FailurePolicy::Collect);

        let err = estimate_with_config(&panel, &request, &config).unwrap_err();
        assert_eq!(
            err,
            EstimatorError::EntitiesFailed {
                failed: vec![EntityKey::from("short")],
                first: Box::new(EstimatorError::InsufficientObservations {
                    key: EntityKey::from("short"),
                    rows: 1
                }),
            }
        );
        assert!(err.to_string().starts_with("1 entities could not be fitted"));

        // The fitted subset stays reachable through the report
        let report = estimate_each(&panel, &request, &config).unwrap();
        let keys: Vec<&EntityKey> = report.table.keys().collect();
        assert_eq!(keys, vec![&EntityKey::from("a"), &EntityKey::from("b")]);
    }
}
