//! Feature derivation errors.

use thiserror::Error;

/// Errors raised while deriving or extracting features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The snapshot frame holds no rows at all.
    #[error("Empty snapshot: no instruments to derive features for")]
    EmptySnapshot,

    /// A required non-defaultable column is missing (symbol or the label).
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Underlying DataFrame error.
    #[error("Polars error: {0}")]
    Frame(#[from] polars::error::PolarsError),

    /// Matrix extraction produced inconsistent dimensions.
    #[error("Shape error: {0}")]
    Shape(String),
}
