#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/jarrah-quant/jarrah/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use jarrah_core as core;
pub use jarrah_features as features;
pub use jarrah_output as output;
pub use jarrah_scoring as scoring;
pub use jarrah_valuation as valuation;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
