//! Feature standardization.
//!
//! Mean/variance scaling fit on the training partition only. The fitted
//! parameters travel with the trained model and are reused verbatim at
//! inference time; refitting on inference inputs would leak and drift.

use crate::error::ScoringError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Per-column mean and standard deviation scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    ///
    /// Constant columns get a unit deviation so they scale to exactly 0
    /// instead of dividing by 0.
    pub fn fit(values: ArrayView2<'_, f64>) -> Result<Self, ScoringError> {
        let rows = values.nrows();
        if rows == 0 {
            return Err(ScoringError::InsufficientTraining { rows: 0, needed: 1 });
        }

        let means = values
            .mean_axis(Axis(0))
            .ok_or(ScoringError::InsufficientTraining { rows: 0, needed: 1 })?;
        let mut stds = values.std_axis(Axis(0), 0.0);
        stds.mapv_inplace(|s| if s > 0.0 { s } else { 1.0 });

        Ok(Self { means, stds })
    }

    /// Number of columns the scaler was fit on.
    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Scale a matrix column-wise.
    pub fn transform(&self, values: ArrayView2<'_, f64>) -> Result<Array2<f64>, ScoringError> {
        if values.ncols() != self.width() {
            return Err(ScoringError::FeatureDimension {
                expected: self.width(),
                actual: values.ncols(),
            });
        }
        let mut scaled = values.to_owned();
        for mut row in scaled.rows_mut() {
            row -= &self.means;
            row /= &self.stds;
        }
        Ok(scaled)
    }

    /// Scale a single row.
    pub fn transform_row(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, ScoringError> {
        if row.len() != self.width() {
            return Err(ScoringError::FeatureDimension {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok((&row.to_owned() - &self.means) / &self.stds)
    }
}
