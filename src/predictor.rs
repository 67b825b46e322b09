//! Serving path: raw house attributes in, expense estimate out.

use crate::config::{AppConfig, ServingConfig};
use crate::dataset::{self, columns};
use crate::error::EstimatorResult;
use crate::feature_encoder::FeatureEncoder;
use crate::models::store::{ArtifactStore, LoadedArtifacts};
use crate::types::{Coverage, Estimate, PolicyInput};
use std::path::PathBuf;
use tracing::{debug, info};

/// Predictor holding one loaded set of artifacts.
///
/// Artifacts are read once by `load` and stay fixed until `reload` is called
/// explicitly.
pub struct Predictor {
    store: ArtifactStore,
    artifacts: LoadedArtifacts,
    serving: ServingConfig,
    dataset: Option<(PathBuf, u8)>,
    encoder: FeatureEncoder,
}

impl Predictor {
    /// Build a predictor from configuration, loading artifacts from disk
    pub fn from_config(config: &AppConfig) -> EstimatorResult<Self> {
        let store = ArtifactStore::from_config(&config.artifacts);
        let mut predictor = Self::load(store, config.serving.clone())?;
        if config.serving.require_dataset {
            predictor.dataset = Some((
                config.data.dataset_path.clone(),
                config.data.delimiter_byte(),
            ));
        }
        Ok(predictor)
    }

    /// Load artifacts from `store`; no dataset check is configured
    pub fn load(store: ArtifactStore, serving: ServingConfig) -> EstimatorResult<Self> {
        let artifacts = store.load()?;
        Ok(Self {
            store,
            artifacts,
            serving,
            dataset: None,
            encoder: FeatureEncoder::new(),
        })
    }

    /// Re-read the artifacts, replacing the loaded set only on success
    pub fn reload(&mut self) -> EstimatorResult<()> {
        self.artifacts = self.store.load()?;
        info!(
            model_id = %self.artifacts.bundle.metadata.model_id,
            "Artifacts reloaded"
        );
        Ok(())
    }

    pub fn artifacts(&self) -> &LoadedArtifacts {
        &self.artifacts
    }

    /// Check that the dataset is present and carries the label column.
    /// The label total is only logged.
    pub fn check_dataset(&self) -> EstimatorResult<()> {
        if let Some((path, delimiter)) = &self.dataset {
            let table = dataset::load_dataset(path, *delimiter)?;
            let total = dataset::expense_total(&table)?;
            debug!(total, column = columns::EXPENSE, "Dataset label column present");
        }
        Ok(())
    }

    /// Reconciled single-row feature vector for `input`
    pub fn feature_vector(&self, input: &PolicyInput) -> Vec<f64> {
        let encoded = self.encoder.encode(&input.to_table());
        let reconciled = self.artifacts.schema.reconcile(&encoded);
        let mut row = reconciled
            .matrix
            .into_rows()
            .pop()
            .unwrap_or_else(|| vec![0.0; self.artifacts.schema.len()]);

        if self.serving.apply_feature_scaling {
            row = self.artifacts.bundle.feature_scaler.transform_row(&row);
        }
        row
    }

    /// Predict the expense ratio and the implied amount for `coverage`
    pub fn predict(&self, input: &PolicyInput, coverage: Coverage) -> EstimatorResult<Estimate> {
        self.check_dataset()?;

        let features = self.feature_vector(input);
        let bundle = &self.artifacts.bundle;
        let mut ratio = bundle.tree.predict_row(&features)?;
        if self.serving.inverse_label_scaling {
            ratio = bundle.label_scaler.inverse_transform_value(ratio);
        }

        let estimate = Estimate::new(ratio, coverage.amount(), bundle.metadata.model_id.clone());
        info!(
            ratio = estimate.ratio,
            coverage = estimate.coverage,
            amount = estimate.amount,
            "Expense estimated"
        );
        Ok(estimate)
    }
}
