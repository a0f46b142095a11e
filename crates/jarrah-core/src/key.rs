//! Result record keys.
//!
//! Every valuation or score the engine produces is keyed by
//! (symbol, as-of date, method). The storage collaborator upserts on this
//! key: recomputing for the same key replaces the previous record rather
//! than appending a new one.

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Computation method that produced a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Method {
    /// Discounted cash flow valuation.
    #[display("DCF")]
    Dcf,

    /// Deterministic rule-based score.
    #[display("RULE")]
    RuleScore,

    /// Regression-model score.
    #[display("ML")]
    MlScore,
}

/// Upsert key for a result record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{symbol}/{as_of_date}/{method}")]
pub struct RecordKey {
    /// Instrument symbol.
    pub symbol: String,

    /// Valuation or scoring date.
    pub as_of_date: NaiveDate,

    /// Method that produced the record.
    pub method: Method,
}

impl RecordKey {
    /// Create a new record key.
    pub const fn new(symbol: String, as_of_date: NaiveDate, method: Method) -> Self {
        Self {
            symbol,
            as_of_date,
            method,
        }
    }
}
