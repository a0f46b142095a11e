//! Report envelope.
//!
//! Wraps a payload with the same (symbol, as-of date, method) identity the
//! result records carry, so the report writer can upsert reports alongside
//! the records they describe.

use chrono::NaiveDate;
use jarrah_core::key::{Method, RecordKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while producing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The builder is missing a required field.
    #[error("Report is missing {0}")]
    MissingField(&'static str),
}

/// A report for one instrument and method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Instrument symbol.
    pub symbol: String,

    /// Date the underlying result is valid for.
    pub as_of_date: NaiveDate,

    /// Method that produced the underlying result.
    pub method: Method,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub const fn new(
        symbol: String,
        as_of_date: NaiveDate,
        method: Method,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            symbol,
            as_of_date,
            method,
            contents,
        }
    }

    /// Upsert key matching the underlying result record.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.symbol.clone(), self.as_of_date, self.method)
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    as_of_date: Option<NaiveDate>,
    method: Option<Method>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: String) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Set the as-of date.
    pub const fn as_of_date(mut self, date: NaiveDate) -> Self {
        self.as_of_date = Some(date);
        self
    }

    /// Set the producing method.
    pub const fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Build the report. Symbol, date, and method are required.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.symbol.ok_or(ReportError::MissingField("symbol"))?,
            self.as_of_date
                .ok_or(ReportError::MissingField("as_of_date"))?,
            self.method.ok_or(ReportError::MissingField("method"))?,
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}
