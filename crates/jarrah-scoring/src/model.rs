//! Model training and inference.
//!
//! A [`TrainedModel`] is an explicit owned value: forest, fitted scaler,
//! the exact feature order it was trained with, a version label, and the
//! held-out metrics from its training run. Inference takes the model as
//! a plain parameter; there is no ambient model state anywhere. Retraining
//! builds a whole new value and swaps it in atomically.

use crate::aggregate::{ReturnThresholds, ScoreResult, TopFactor, top_by_magnitude};
use crate::error::ScoringError;
use crate::forest::{ForestConfig, RandomForest};
use crate::scaler::StandardScaler;
use chrono::NaiveDate;
use jarrah_core::key::Method;
use jarrah_features::matrix::{FeatureMatrix, FeatureVector};
use jarrah_features::registry::get_feature_info;
use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Version label stamped on every model score.
pub const ML_MODEL_VERSION: &str = "forest-v1.0";

/// Number of top factors retained on a result.
const TOP_FACTOR_COUNT: usize = 5;

/// Minimum labelled rows for a meaningful train/test split.
const MIN_TRAINING_ROWS: usize = 5;

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Fraction of rows held out for evaluation (default: 0.2).
    pub test_fraction: f64,
    /// Seed for the shuffle split (default: 42).
    pub seed: u64,
    /// Ensemble hyperparameters.
    pub forest: ForestConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

/// Held-out metrics from a training run. Reported, never fatal: a weak
/// model still trains, the metrics tell the caller how weak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Root-mean-square error on the held-out partition.
    pub rmse: f64,
    /// Coefficient of determination on the held-out partition.
    pub r_squared: f64,
    /// Rows in the training partition.
    pub n_train: usize,
    /// Rows in the held-out partition.
    pub n_test: usize,
}

/// A trained scoring model.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    forest: RandomForest,
    scaler: StandardScaler,
    feature_names: Vec<String>,
    version: String,
    report: TrainingReport,
}

impl TrainedModel {
    /// Train on a labelled feature matrix.
    ///
    /// Splits the rows 80/20 behind the configured seed, fits the scaler on
    /// the training partition only, trains the forest on scaled features,
    /// and evaluates on the scaled held-out partition.
    pub fn train(matrix: &FeatureMatrix, config: &TrainConfig) -> Result<Self, ScoringError> {
        let labels = matrix.labels.as_ref().ok_or(ScoringError::MissingLabels)?;
        let n = matrix.len();
        if n < MIN_TRAINING_ROWS {
            return Err(ScoringError::InsufficientTraining {
                rows: n,
                needed: MIN_TRAINING_ROWS,
            });
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(config.seed);
        indices.shuffle(&mut rng);

        let n_test = ((n as f64 * config.test_fraction).round() as usize).clamp(1, n - 1);
        let (test_idx, train_idx) = indices.split_at(n_test);

        let train_x = matrix.values.select(Axis(0), train_idx);
        let train_y = select_labels(labels, train_idx);
        let test_x = matrix.values.select(Axis(0), test_idx);
        let test_y = select_labels(labels, test_idx);

        let scaler = StandardScaler::fit(train_x.view())?;
        let scaled_train = scaler.transform(train_x.view())?;
        let scaled_test = scaler.transform(test_x.view())?;

        let forest = RandomForest::fit(scaled_train.view(), train_y.view(), &config.forest)?;
        let predicted = forest.predict(scaled_test.view())?;
        let report = evaluate(test_y.view(), predicted.view(), train_idx.len());

        Ok(Self {
            forest,
            scaler,
            feature_names: matrix.names.clone(),
            version: ML_MODEL_VERSION.to_string(),
            report,
        })
    }

    /// Metrics from this model's training run.
    pub const fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Version label.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Feature order the model expects.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Predict one instrument's score and rank its factors.
    ///
    /// The vector is scaled with the training-time scaler; the ranking pairs
    /// the forest's global importances with this instance's scaled values,
    /// largest absolute importance first.
    pub fn predict(
        &self,
        features: &FeatureVector,
    ) -> Result<(f64, Vec<TopFactor>), ScoringError> {
        let mut raw = Array1::<f64>::zeros(self.feature_names.len());
        for (j, name) in self.feature_names.iter().enumerate() {
            raw[j] = features
                .get(name)
                .ok_or_else(|| ScoringError::Shape(format!("feature {name} missing")))?;
        }

        let scaled = self.scaler.transform_row(raw.view())?;
        let prediction = self.forest.predict_row(scaled.view())?;

        let importances = self.forest.feature_importances();
        let factors: Vec<TopFactor> = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(j, name)| TopFactor {
                name: name.clone(),
                label: get_feature_info(name)
                    .map_or_else(|| name.clone(), |info| info.description.to_string()),
                reading: scaled[j],
                contribution: importances[j],
            })
            .collect();

        Ok((prediction, top_by_magnitude(factors, TOP_FACTOR_COUNT)))
    }
}

fn select_labels(labels: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_iter(indices.iter().map(|&i| labels[i]))
}

fn evaluate(
    actual: ndarray::ArrayView1<'_, f64>,
    predicted: ndarray::ArrayView1<'_, f64>,
    n_train: usize,
) -> TrainingReport {
    let n = actual.len();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let mean = actual.sum() / n as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();

    TrainingReport {
        rmse: (ss_res / n as f64).sqrt(),
        r_squared: if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 },
        n_train,
        n_test: n,
    }
}

/// Model-based scorer holding the currently installed model, if any.
#[derive(Debug, Default)]
pub struct MlScorer {
    model: Option<TrainedModel>,
    thresholds: ReturnThresholds,
}

impl MlScorer {
    /// Create a scorer with no model installed.
    pub fn new(thresholds: ReturnThresholds) -> Self {
        Self {
            model: None,
            thresholds,
        }
    }

    /// The installed model, if any.
    pub const fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    /// The active action ladder.
    pub const fn thresholds(&self) -> &ReturnThresholds {
        &self.thresholds
    }

    /// Install a model, replacing any previous one whole.
    pub fn install(&mut self, model: TrainedModel) {
        self.model = Some(model);
    }

    /// Train a new model and install it.
    pub fn train(
        &mut self,
        matrix: &FeatureMatrix,
        config: &TrainConfig,
    ) -> Result<TrainingReport, ScoringError> {
        let model = TrainedModel::train(matrix, config)?;
        let report = *model.report();
        self.model = Some(model);
        Ok(report)
    }

    /// Score one instrument.
    ///
    /// `Ok(None)` when the instrument has no features at all;
    /// [`ScoringError::ModelNotReady`] when no model is installed.
    pub fn score(
        &self,
        symbol: &str,
        as_of_date: NaiveDate,
        features: Option<&FeatureVector>,
    ) -> Result<Option<ScoreResult>, ScoringError> {
        let Some(features) = features.filter(|f| !f.is_empty()) else {
            return Ok(None);
        };
        let model = self.model.as_ref().ok_or(ScoringError::ModelNotReady)?;

        let (prediction, top_factors) = model.predict(features)?;

        Ok(Some(ScoreResult {
            symbol: symbol.to_string(),
            as_of_date,
            method: Method::MlScore,
            score: prediction,
            action: self.thresholds.action(prediction),
            top_factors,
            model_version: model.version.clone(),
        }))
    }
}
