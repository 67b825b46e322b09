//! Offline training pipeline: dataset in, model bundle and schema out.

use crate::config::AppConfig;
use crate::dataset::{self, columns, Table};
use crate::error::{EstimatorError, EstimatorResult};
use crate::feature_encoder::FeatureEncoder;
use crate::metrics::RegressionMetrics;
use crate::models::scaler::MinMaxScaler;
use crate::models::store::{ArtifactStore, ModelBundle, ModelMetadata};
use crate::models::tree::{DecisionTreeRegressor, TreeParams};
use crate::reconcile::FeatureSchema;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub bundle: ModelBundle,
    pub schema: FeatureSchema,
}

/// Fits the expense model from a dataset file
pub struct Trainer {
    params: TreeParams,
    test_fraction: f64,
    delimiter: u8,
    encoder: FeatureEncoder,
}

impl Trainer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            params: TreeParams {
                max_depth: config.training.max_depth,
                min_samples_split: config.training.min_samples_split,
                min_samples_leaf: config.training.min_samples_leaf,
                seed: config.training.seed,
            },
            test_fraction: config.training.test_fraction,
            delimiter: config.data.delimiter_byte(),
            encoder: FeatureEncoder::new(),
        }
    }

    /// Load, fit and persist in one go
    pub fn run<P: AsRef<Path>>(
        &self,
        dataset_path: P,
        store: &ArtifactStore,
    ) -> EstimatorResult<TrainingReport> {
        let table = dataset::load_dataset(dataset_path, self.delimiter)?;
        let report = self.fit(table)?;
        store.save(&report.bundle, &report.schema)?;
        Ok(report)
    }

    /// Fit on an already loaded table without touching the disk
    pub fn fit(&self, mut table: Table) -> EstimatorResult<TrainingReport> {
        let started = Instant::now();
        table.require_columns(&columns::REQUIRED)?;

        let dropped_rows = table.drop_missing();
        if dropped_rows > 0 {
            warn!(dropped = dropped_rows, "Dropped rows with missing fields");
        }
        if table.is_empty() {
            return Err(EstimatorError::Training(
                "no complete rows left after dropping missing fields".to_string(),
            ));
        }
        info!(
            rows = table.len(),
            columns = table.columns().len(),
            "Dataset ready for training"
        );

        dataset::derive_bands(&mut table)?;
        let target = table.numeric_column(columns::EXPENSE)?;
        table.drop_columns(&[
            columns::HOUSE_AGE,
            columns::COSMETIC_SCORE,
            columns::CHILDREN,
            columns::EXPENSE,
        ]);

        let features = self.encoder.encode(&table);
        let schema = FeatureSchema::from_matrix(&features);
        info!(
            count = schema.len(),
            columns = ?schema.columns(),
            "Processed feature columns"
        );

        let (feature_scaler, scaled_features) = MinMaxScaler::fit_transform(features.rows())
            .ok_or_else(|| EstimatorError::Training("empty feature matrix".to_string()))?;
        let label_scaler = MinMaxScaler::fit_column(&target)
            .ok_or_else(|| EstimatorError::Training("empty target column".to_string()))?;
        let scaled_target: Vec<f64> = target
            .iter()
            .map(|&v| label_scaler.transform_value(v))
            .collect();

        let split = dataset::train_test_split(table.len(), self.test_fraction, self.params.seed)?;
        let pick_rows = |idx: &[usize]| -> Vec<Vec<f64>> {
            idx.iter().map(|&i| scaled_features[i].clone()).collect()
        };
        let pick_target = |idx: &[usize]| -> Vec<f64> { idx.iter().map(|&i| scaled_target[i]).collect() };

        let (x_train, y_train) = (pick_rows(&split.train), pick_target(&split.train));
        let (x_test, y_test) = (pick_rows(&split.test), pick_target(&split.test));
        info!(
            train = x_train.len(),
            test = x_test.len(),
            "Training and testing split was successful"
        );

        let tree = DecisionTreeRegressor::fit(&x_train, &y_train, self.params)?;
        let metrics = RegressionMetrics::compute(&y_test, &tree.predict(&x_test)?);
        metrics.print_summary();

        let metadata = ModelMetadata {
            model_id: Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
            train_rows: x_train.len(),
            test_rows: x_test.len(),
            dropped_rows,
            metrics,
        };
        info!(
            model_id = %metadata.model_id,
            nodes = tree.node_count(),
            depth = tree.depth(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model trained"
        );

        Ok(TrainingReport {
            bundle: ModelBundle {
                tree,
                feature_scaler,
                label_scaler,
                metadata,
            },
            schema,
        })
    }
}
