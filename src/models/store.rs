//! On-disk artifact store for the trained model bundle and column schema

use crate::config::ArtifactsConfig;
use crate::error::{EstimatorError, EstimatorResult};
use crate::metrics::RegressionMetrics;
use crate::models::scaler::MinMaxScaler;
use crate::models::tree::DecisionTreeRegressor;
use crate::reconcile::FeatureSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Facts about a training run stored next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub trained_at: DateTime<Utc>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub dropped_rows: usize,
    /// Test-partition metrics in the scaled label space
    pub metrics: RegressionMetrics,
}

/// Everything the serving path needs besides the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub tree: DecisionTreeRegressor,
    pub feature_scaler: MinMaxScaler,
    pub label_scaler: MinMaxScaler,
    pub metadata: ModelMetadata,
}

/// Model bundle and schema as loaded from disk; immutable once loaded
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub bundle: ModelBundle,
    pub schema: FeatureSchema,
}

/// Location of the persisted artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_path: PathBuf,
    schema_path: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(dir: P, model_file: &str, schema_file: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(model_file),
            schema_path: dir.join(schema_file),
        }
    }

    /// Store at the configured artifact locations
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self {
            model_path: config.model_path(),
            schema_path: config.schema_path(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Both artifacts are present
    pub fn exists(&self) -> bool {
        self.model_path.exists() && self.schema_path.exists()
    }

    /// Write the bundle and schema as pretty JSON, creating directories
    pub fn save(&self, bundle: &ModelBundle, schema: &FeatureSchema) -> EstimatorResult<()> {
        for path in [&self.model_path, &self.schema_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.model_path, serde_json::to_vec_pretty(bundle)?)?;
        fs::write(&self.schema_path, serde_json::to_vec_pretty(schema)?)?;

        info!(
            model_id = %bundle.metadata.model_id,
            model = %self.model_path.display(),
            schema = %self.schema_path.display(),
            features = schema.len(),
            "Artifacts saved"
        );
        Ok(())
    }

    /// Read both artifacts. Any absent, unreadable or inconsistent file is
    /// reported as `ModelArtifactMissing`.
    pub fn load(&self) -> EstimatorResult<LoadedArtifacts> {
        let bundle: ModelBundle = read_json(&self.model_path)?;
        let schema: FeatureSchema = read_json(&self.schema_path)?;

        if schema.len() != bundle.tree.n_features() {
            return Err(EstimatorError::ModelArtifactMissing(format!(
                "schema lists {} columns but the model expects {}",
                schema.len(),
                bundle.tree.n_features()
            )));
        }

        info!(
            model_id = %bundle.metadata.model_id,
            trained_at = %bundle.metadata.trained_at,
            features = schema.len(),
            "Artifacts loaded"
        );
        Ok(LoadedArtifacts { bundle, schema })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> EstimatorResult<T> {
    let bytes = fs::read(path).map_err(|e| {
        EstimatorError::ModelArtifactMissing(format!("{}: {e}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        EstimatorError::ModelArtifactMissing(format!("{} is not a valid artifact: {e}", path.display()))
    })
}
