//! House Expense Estimator Library
//!
//! Trains a regression tree that predicts a house insurance expense ratio
//! from categorical house attributes, and serves predictions from the
//! persisted model and column schema.

pub mod bucketing;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_encoder;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod predictor;
pub mod reconcile;
pub mod trainer;
pub mod types;

pub use config::AppConfig;
pub use error::{EstimatorError, EstimatorResult};
pub use feature_encoder::{FeatureEncoder, FeatureMatrix};
pub use models::store::ArtifactStore;
pub use predictor::Predictor;
pub use reconcile::FeatureSchema;
pub use trainer::{Trainer, TrainingReport};
pub use types::{estimate::Estimate, input::PolicyInput};
