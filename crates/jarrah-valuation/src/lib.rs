#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/jarrah-quant/jarrah/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dcf;
pub mod error;
pub mod growth;
pub mod sensitivity;

pub use dcf::{DcfConfig, DcfProjector, DcfResult, ValuationInput, ValuationOutcome, YearProjection};
pub use error::ValuationError;
pub use growth::{GrowthConfig, GrowthEstimate, GrowthEstimator};
pub use sensitivity::{SensitivityAnalyzer, SensitivityCell, SensitivityGrid, SensitivityMatrix};
