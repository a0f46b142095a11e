//! Valuation errors.
//!
//! All variants are per-instrument and recoverable: a batch run records the
//! failure for that symbol and moves on.

use thiserror::Error;

/// Errors raised while valuing a single instrument.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// No fundamentals at all for the symbol.
    #[error("Missing fundamentals for {0}")]
    MissingFundamentals(String),

    /// No price bar for the symbol.
    #[error("Missing price for {0}")]
    MissingPrice(String),

    /// The earnings model cannot project a non-positive EPS.
    #[error("Non-positive EPS {eps} for {symbol}: DCF refused")]
    NonPositiveEps {
        /// Instrument symbol.
        symbol: String,
        /// Latest reported EPS.
        eps: f64,
    },

    /// Gordon growth is undefined when terminal growth reaches the
    /// discount rate.
    #[error(
        "Invalid assumptions: terminal growth {terminal_growth} must stay below discount rate {discount_rate}"
    )]
    InvalidAssumptions {
        /// Configured discount rate.
        discount_rate: f64,
        /// Configured terminal growth rate.
        terminal_growth: f64,
    },
}
