//! Error types shared by the trainer and the serving path

use thiserror::Error;

/// Result alias used throughout the library
pub type EstimatorResult<T> = std::result::Result<T, EstimatorError>;

/// Errors surfaced to the user. Every variant is terminal for the current
/// request; nothing is retried.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Dataset missing, unreadable or malformed
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// Serialized model bundle or column schema absent or unreadable
    #[error("model artifact missing: {0}")]
    ModelArtifactMissing(String),

    /// User-supplied value outside the allowed options
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Training could not proceed with the data it was given
    #[error("training failed: {0}")]
    Training(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl EstimatorError {
    /// Whether the predict action is unusable until artifacts are produced
    pub fn is_artifact_missing(&self) -> bool {
        matches!(self, EstimatorError::ModelArtifactMissing(_))
    }
}
