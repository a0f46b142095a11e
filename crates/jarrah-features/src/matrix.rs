//! Feature matrix extraction.
//!
//! Bridges the polars feature frame to the ndarray world the model lives
//! in: a fixed-order numeric matrix plus symbol index, with optional labels
//! for training. Rows with a missing label are dropped here, never at
//! inference time.

use crate::error::FeatureError;
use crate::registry::MODEL_FEATURES;
use ndarray::{Array1, Array2, ArrayView1};
use polars::prelude::*;

/// An ordered (name, value) view of one instrument's features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    /// Build from parallel name/value slices.
    pub fn new(names: &[String], values: &[f64]) -> Self {
        Self {
            entries: names
                .iter()
                .cloned()
                .zip(values.iter().copied())
                .collect(),
        }
    }

    /// Value of a named feature.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Values in registry order.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Ordered (name, value) pairs.
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Number of features.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector is empty.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A batch feature matrix in model order.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Instrument symbols, one per row.
    pub symbols: Vec<String>,
    /// Feature names, one per column, in [`MODEL_FEATURES`] order.
    pub names: Vec<String>,
    /// Feature values (rows × features).
    pub values: Array2<f64>,
    /// Training labels, when extracted with a label column.
    pub labels: Option<Array1<f64>>,
}

impl FeatureMatrix {
    /// Extract the model feature matrix from a built feature frame.
    ///
    /// With `label` set, rows whose label is null or non-finite are dropped
    /// (training preparation); without it every row is kept.
    pub fn from_frame(frame: &DataFrame, label: Option<&str>) -> Result<Self, FeatureError> {
        let frame = match label {
            Some(label_col) => {
                if frame.column(label_col).is_err() {
                    return Err(FeatureError::MissingColumn(label_col.to_string()));
                }
                frame
                    .clone()
                    .lazy()
                    .filter(col(label_col).is_not_null().and(col(label_col).is_finite()))
                    .collect()?
            }
            None => frame.clone(),
        };

        let n_rows = frame.height();
        let n_features = MODEL_FEATURES.len();

        let symbols: Vec<String> = frame
            .column("symbol")?
            .str()?
            .into_iter()
            .map(|s| s.unwrap_or_default().to_string())
            .collect();

        let mut values = Array2::<f64>::zeros((n_rows, n_features));
        for (j, &name) in MODEL_FEATURES.iter().enumerate() {
            let column = frame.column(name)?.cast(&DataType::Float64)?;
            let column = column.f64()?;
            for (i, value) in column.into_iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => values[[i, j]] = v,
                    _ => {
                        return Err(FeatureError::Shape(format!(
                            "non-finite value in feature column {name}"
                        )));
                    }
                }
            }
        }

        let labels = match label {
            Some(label_col) => {
                let column = frame.column(label_col)?.cast(&DataType::Float64)?;
                let column = column.f64()?;
                Some(Array1::from_iter(
                    column.into_iter().map(|v| v.unwrap_or_default()),
                ))
            }
            None => None,
        };

        Ok(Self {
            symbols,
            names: MODEL_FEATURES.iter().map(|s| s.to_string()).collect(),
            values,
            labels,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the matrix holds no rows.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// One row by index.
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// One instrument's features by symbol.
    pub fn vector_for(&self, symbol: &str) -> Option<FeatureVector> {
        let index = self.symbols.iter().position(|s| s == symbol)?;
        let row: Vec<f64> = self.values.row(index).to_vec();
        Some(FeatureVector::new(&self.names, &row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FeatureBuilder;
    use approx::assert_relative_eq;

    fn feature_frame(with_label: bool) -> DataFrame {
        let mut frame = df![
            "symbol" => ["A", "B", "C"],
            "eps" => [2.0, 4.0, 0.0],
            "close" => [20.0, 80.0, 5.0],
        ]
        .unwrap();
        if with_label {
            let labels = Series::new(
                "target".into(),
                [Some(0.05), None, Some(-0.02)].as_ref(),
            );
            frame.with_column(labels).unwrap();
        }
        FeatureBuilder::default().build(&frame, None).unwrap()
    }

    #[test]
    fn matrix_has_model_order_columns() {
        let matrix = FeatureMatrix::from_frame(&feature_frame(false), None).unwrap();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.names.len(), MODEL_FEATURES.len());
        assert_eq!(matrix.values.dim(), (3, MODEL_FEATURES.len()));
        assert!(matrix.labels.is_none());
        // pe_ratio is the first model feature.
        assert_relative_eq!(matrix.values[[0, 0]], 10.0);
        assert_relative_eq!(matrix.values[[1, 0]], 20.0);
        assert_relative_eq!(matrix.values[[2, 0]], 0.0);
    }

    #[test]
    fn label_rows_with_missing_target_are_dropped() {
        let matrix = FeatureMatrix::from_frame(&feature_frame(true), Some("target")).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.symbols, vec!["A".to_string(), "C".to_string()]);
        let labels = matrix.labels.unwrap();
        assert_relative_eq!(labels[0], 0.05);
        assert_relative_eq!(labels[1], -0.02);
    }

    #[test]
    fn missing_label_column_is_an_error() {
        let result = FeatureMatrix::from_frame(&feature_frame(false), Some("target"));
        assert!(matches!(result, Err(FeatureError::MissingColumn(_))));
    }

    #[test]
    fn vector_lookup_by_symbol() {
        let matrix = FeatureMatrix::from_frame(&feature_frame(false), None).unwrap();
        let vector = matrix.vector_for("B").unwrap();
        assert_eq!(vector.len(), MODEL_FEATURES.len());
        assert_relative_eq!(vector.get("pe_ratio").unwrap(), 20.0);
        assert!(matrix.vector_for("missing").is_none());
    }
}
