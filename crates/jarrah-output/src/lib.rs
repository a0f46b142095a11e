#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/jarrah-quant/jarrah/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod payload;
pub mod report;
pub mod summary;

pub use payload::{score_payload, valuation_payload};
pub use report::{Report, ReportBuilder, ReportError};
pub use summary::{ScoreSummary, ValuationSummary};
