#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/jarrah-quant/jarrah/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod matrix;
pub mod registry;

pub use builder::{FeatureBuilder, FeatureConfig};
pub use error::FeatureError;
pub use matrix::{FeatureMatrix, FeatureVector};
pub use registry::{FeatureCategory, FeatureInfo, MODEL_FEATURES, available_features};
