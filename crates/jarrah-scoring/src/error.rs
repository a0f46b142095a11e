//! Scoring errors.
//!
//! Missing data and empty inputs are per-instrument and recoverable;
//! [`ScoringError::ModelNotReady`] fails only the single inference call
//! that raised it.

use jarrah_features::FeatureError;
use thiserror::Error;

/// Errors raised while training or scoring.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The instrument has none of the inputs a scorer needs.
    #[error("Missing data for {0}")]
    MissingData(String),

    /// Inference was requested before any model was trained or installed.
    #[error("Model not ready: train or install a model before predicting")]
    ModelNotReady,

    /// The training matrix carries no label column.
    #[error("Training requires a label column")]
    MissingLabels,

    /// Too few labelled rows to split into train and test partitions.
    #[error("Insufficient training data: {rows} rows, need at least {needed}")]
    InsufficientTraining {
        /// Labelled rows available.
        rows: usize,
        /// Minimum rows required.
        needed: usize,
    },

    /// A feature vector does not match the model's training-time width.
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    FeatureDimension {
        /// Width the model was trained with.
        expected: usize,
        /// Width of the offered input.
        actual: usize,
    },

    /// Inputs disagree on row counts or layout.
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Feature derivation failed.
    #[error(transparent)]
    Feature(#[from] FeatureError),
}
