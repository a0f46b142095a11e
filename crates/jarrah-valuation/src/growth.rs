//! Growth-rate estimation from historical fundamentals.
//!
//! Compound annual growth over the available non-missing observations,
//! clamped to a plausible band so that data errors and one-off events in
//! the history cannot blow up a multi-year projection. Estimation always
//! produces a usable result; with too little data it falls back to the
//! configured defaults.

use jarrah_core::math::{clamp_or, finite_mean};
use jarrah_core::records::{FundamentalMetric, FundamentalsHistory};
use serde::{Deserialize, Serialize};

/// Bounds and defaults for growth estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Growth rate used when fewer than two observations exist (default: 5%).
    pub default_growth: f64,

    /// Lower clamp for revenue/profit growth (default: 0).
    pub growth_floor: f64,

    /// Upper clamp for revenue/profit growth (default: 30%).
    pub growth_cap: f64,

    /// ROE used when no observations exist (default: 10%).
    pub default_roe: f64,

    /// Lower clamp for average ROE (default: 5%).
    pub roe_floor: f64,

    /// Upper clamp for average ROE (default: 25%).
    pub roe_cap: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            default_growth: 0.05,
            growth_floor: 0.0,
            growth_cap: 0.30,
            default_roe: 0.10,
            roe_floor: 0.05,
            roe_cap: 0.25,
        }
    }
}

/// Clamped growth assumptions feeding the DCF projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthEstimate {
    /// Compound annual revenue growth.
    pub revenue_growth: f64,
    /// Compound annual net-profit growth.
    pub profit_growth: f64,
    /// Average return on equity.
    pub roe: f64,
}

/// Estimates growth assumptions from a fundamentals history.
#[derive(Debug, Default)]
pub struct GrowthEstimator {
    config: GrowthConfig,
}

impl GrowthEstimator {
    /// Create an estimator with the given configuration.
    pub const fn new(config: GrowthConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Estimate growth assumptions. Never fails: pathological or missing
    /// series resolve to clamped defaults.
    pub fn estimate(&self, history: &FundamentalsHistory) -> GrowthEstimate {
        let revenue_growth = self.clamped_cagr(&history.series(FundamentalMetric::Revenue));
        let profit_growth = self.clamped_cagr(&history.series(FundamentalMetric::NetProfit));

        let roe_series = history.series(FundamentalMetric::Roe);
        let roe = finite_mean(&roe_series).map_or(self.config.default_roe, |mean| {
            clamp_or(
                mean,
                self.config.roe_floor,
                self.config.roe_cap,
                self.config.default_roe,
            )
        });

        GrowthEstimate {
            revenue_growth,
            profit_growth,
            roe,
        }
    }

    /// Compound annual growth `(last/first)^(1/(n-1)) - 1` over the series,
    /// clamped into the configured band. Series that cannot support the
    /// computation (fewer than two points, non-positive base, non-finite
    /// power) resolve to the clamped default.
    fn clamped_cagr(&self, series: &[f64]) -> f64 {
        let fallback = || {
            clamp_or(
                self.config.default_growth,
                self.config.growth_floor,
                self.config.growth_cap,
                self.config.default_growth,
            )
        };
        if series.len() < 2 {
            return fallback();
        }
        let first = series[0];
        let last = series[series.len() - 1];
        if first == 0.0 {
            return fallback();
        }
        let periods = (series.len() - 1) as f64;
        let cagr = (last / first).powf(1.0 / periods) - 1.0;
        clamp_or(
            cagr,
            self.config.growth_floor,
            self.config.growth_cap,
            self.config.default_growth,
        )
    }
}
