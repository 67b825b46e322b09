//! Configuration management for the expense estimator

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub serving: ServingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dataset location and layout
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the semicolon separated dataset
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    /// Field delimiter, a single ASCII character
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/insurance_modified.csv")
}

fn default_delimiter() -> String {
    ";".to_string()
}

impl DataConfig {
    /// Delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b';')
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            delimiter: default_delimiter(),
        }
    }
}

/// Where the trained artifacts live
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding the model bundle and schema
    pub dir: PathBuf,
    /// File name of the serialized model bundle
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// File name of the serialized column schema
    #[serde(default = "default_schema_file")]
    pub schema_file: String,
}

fn default_model_file() -> String {
    "model.json".to_string()
}

fn default_schema_file() -> String {
    "model_columns.json".to_string()
}

impl ArtifactsConfig {
    /// Full path of the model bundle
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    /// Full path of the column schema
    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(&self.schema_file)
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            model_file: default_model_file(),
            schema_file: default_schema_file(),
        }
    }
}

/// Trainer parameters
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for the split and the tree
    #[serde(default)]
    pub seed: u64,
    /// Maximum tree depth (unbounded when absent)
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

fn default_test_fraction() -> f64 {
    0.20
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: 0,
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
        }
    }
}

/// Serving path switches
#[derive(Debug, Clone, Deserialize)]
pub struct ServingConfig {
    /// Refuse to predict unless the dataset with its label column is present
    #[serde(default = "default_true")]
    pub require_dataset: bool,
    /// Run the persisted feature scaler over the reconciled row
    #[serde(default)]
    pub apply_feature_scaling: bool,
    /// Map the predicted ratio back into the label's original units
    #[serde(default)]
    pub inverse_label_scaling: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            require_dataset: true,
            apply_feature_scaling: false,
            inverse_label_scaling: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let fraction = self.training.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            anyhow::bail!("training.test_fraction must be in (0, 1), got {fraction}");
        }
        if self.data.delimiter.len() != 1 || !self.data.delimiter.is_ascii() {
            anyhow::bail!("data.delimiter must be a single ASCII character");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            artifacts: ArtifactsConfig::default(),
            training: TrainingConfig::default(),
            serving: ServingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.delimiter_byte(), b';');
        assert_eq!(config.training.test_fraction, 0.20);
        assert_eq!(config.training.seed, 0);
        assert!(config.serving.require_dataset);
        assert!(!config.serving.inverse_label_scaling);
        assert_eq!(
            config.artifacts.model_path(),
            PathBuf::from("artifacts/model.json")
        );
        assert_eq!(
            config.artifacts.schema_path(),
            PathBuf::from("artifacts/model_columns.json")
        );
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[training]\nseed = 7\nmax_depth = 4").unwrap();
        writeln!(file, "[serving]\nrequire_dataset = false").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.max_depth, Some(4));
        assert_eq!(config.training.test_fraction, 0.20);
        assert!(!config.serving.require_dataset);
        assert_eq!(config.artifacts.model_file, "model.json");
    }

    #[test]
    fn test_data_section_without_dataset_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[data]\ndelimiter = \",\"\n").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.data.delimiter_byte(), b',');
        assert_eq!(
            config.data.dataset_path,
            PathBuf::from("data/insurance_modified.csv")
        );
    }

    #[test]
    fn test_rejects_bad_test_fraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[training]\ntest_fraction = 1.5\n").unwrap();
        assert!(AppConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
