#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/jarrah-quant/jarrah/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod batch;
pub mod error;
pub mod forest;
pub mod model;
pub mod rules;
pub mod scaler;

pub use aggregate::{Action, ReturnThresholds, RuleThresholds, ScoreResult, TopFactor};
pub use batch::{ScoreInput, ScoreOutcome, ScoringPipeline};
pub use error::ScoringError;
pub use forest::{ForestConfig, RandomForest};
pub use model::{MlScorer, TrainConfig, TrainedModel, TrainingReport};
pub use rules::{RuleInputs, RuleScorer};
pub use scaler::StandardScaler;
