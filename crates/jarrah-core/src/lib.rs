#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/jarrah-quant/jarrah/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod key;
pub mod math;
pub mod records;
pub mod sector;

pub use key::{Method, RecordKey};
pub use records::{
    FundamentalMetric, FundamentalObservation, FundamentalRecord, FundamentalsHistory, PriceBar,
    TechnicalSnapshot,
};
pub use sector::{Sector, SectorTilt};
