//! DCF projection.
//!
//! Projects earnings forward at the clamped profit growth rate, converts a
//! fixed share of earnings to free cash flow, discounts the explicit years,
//! and closes with a Gordon-growth terminal value. The per-share value uses
//! a caller-supplied shares-outstanding assumption; the engine deliberately
//! carries no capex or net-debt model.

use crate::error::ValuationError;
use crate::growth::{GrowthEstimate, GrowthEstimator};
use crate::sensitivity::{SensitivityAnalyzer, SensitivityMatrix, is_valid_pair};
use chrono::NaiveDate;
use jarrah_core::key::{Method, RecordKey};
use jarrah_core::math::safe_div;
use jarrah_core::records::{FundamentalsHistory, PriceBar};
use serde::{Deserialize, Serialize};

/// DCF assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfConfig {
    /// Base-case discount rate (default: 10%).
    pub discount_rate: f64,

    /// Base-case terminal growth rate (default: 3%).
    pub terminal_growth_rate: f64,

    /// Explicit projection horizon in years (default: 5).
    pub projection_years: u32,

    /// Share of projected EPS treated as free cash flow (default: 0.8).
    pub fcf_conversion: f64,

    /// Assumed shares outstanding for the per-share conversion
    /// (default: 1.26e9).
    pub shares_outstanding: f64,

    /// Currency scale of the enterprise value relative to the per-share
    /// unit (default: 1e8, hundred-million base).
    pub value_scale: f64,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            discount_rate: 0.10,
            terminal_growth_rate: 0.03,
            projection_years: 5,
            fcf_conversion: 0.8,
            shares_outstanding: 1.26e9,
            value_scale: 1e8,
        }
    }
}

impl DcfConfig {
    /// Convert an enterprise value to a per-share value under the
    /// configured currency scale and shares assumption.
    pub fn per_share_value(&self, enterprise_value: f64) -> f64 {
        safe_div(enterprise_value * self.value_scale, self.shares_outstanding)
    }
}

/// One explicit projection year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearProjection {
    /// Year offset from the valuation date (1-based).
    pub year: u32,
    /// Projected earnings per share.
    pub projected_eps: f64,
    /// Projected free cash flow per share.
    pub fcf: f64,
    /// Present value of that cash flow.
    pub pv_fcf: f64,
}

/// Cash-flow projection breakdown shared by the base case and every
/// sensitivity cell.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CashFlowProjection {
    pub(crate) projections: Vec<YearProjection>,
    pub(crate) terminal_value: f64,
    pub(crate) pv_terminal_value: f64,
    pub(crate) enterprise_value: f64,
}

/// Project and discount cash flows for one (discount, terminal-growth)
/// assumption pair. The core formula: EPS compounding, fixed FCF
/// conversion, per-year discounting, Gordon terminal value.
pub(crate) fn project_cash_flows(
    eps: f64,
    profit_growth: f64,
    discount_rate: f64,
    terminal_growth_rate: f64,
    projection_years: u32,
    fcf_conversion: f64,
) -> CashFlowProjection {
    let mut projections = Vec::with_capacity(projection_years as usize);
    let mut pv_fcf_sum = 0.0;
    for year in 1..=projection_years {
        let projected_eps = eps * (1.0 + profit_growth).powi(year as i32);
        let fcf = projected_eps * fcf_conversion;
        let pv_fcf = fcf / (1.0 + discount_rate).powi(year as i32);
        pv_fcf_sum += pv_fcf;
        projections.push(YearProjection {
            year,
            projected_eps,
            fcf,
            pv_fcf,
        });
    }

    let terminal_eps = eps * (1.0 + profit_growth).powi(projection_years as i32);
    let terminal_fcf = terminal_eps * fcf_conversion;
    let terminal_value = terminal_fcf / (discount_rate - terminal_growth_rate);
    let pv_terminal_value =
        terminal_value / (1.0 + discount_rate).powi(projection_years as i32);

    CashFlowProjection {
        projections,
        terminal_value,
        pv_terminal_value,
        enterprise_value: pv_fcf_sum + pv_terminal_value,
    }
}

/// A completed DCF valuation. Immutable snapshot: recomputing for the same
/// symbol and date supersedes the previous record via [`RecordKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    /// Instrument symbol.
    pub symbol: String,
    /// Valuation date (the price bar's date).
    pub as_of_date: NaiveDate,
    /// Price at valuation time.
    pub current_price: f64,
    /// Per-share DCF value.
    pub dcf_value: f64,
    /// Upside (positive) or downside versus the current price, in percent.
    pub upside_pct: f64,
    /// PE multiple implied by the DCF value.
    pub pe_implied: f64,
    /// PB multiple implied by the DCF value (0 without a positive BPS).
    pub pb_implied: f64,
    /// Discount rate used.
    pub discount_rate: f64,
    /// Terminal growth rate used.
    pub terminal_growth_rate: f64,
    /// Explicit projection horizon.
    pub projection_years: u32,
    /// Growth assumptions behind the projection.
    pub growth: GrowthEstimate,
    /// Per-year explicit projections.
    pub projections: Vec<YearProjection>,
    /// Undiscounted terminal value.
    pub terminal_value: f64,
    /// Discounted terminal value.
    pub pv_terminal_value: f64,
    /// Total enterprise value.
    pub enterprise_value: f64,
    /// Conservative end of the value range (base × 0.8).
    pub range_low: f64,
    /// Optimistic end of the value range (base × 1.2).
    pub range_high: f64,
    /// Sensitivity matrix over the rate grid.
    pub sensitivity: SensitivityMatrix,
}

impl DcfResult {
    /// Upsert key for the storage collaborator.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.symbol.clone(), self.as_of_date, Method::Dcf)
    }
}

/// Per-instrument valuation input.
#[derive(Debug, Clone)]
pub struct ValuationInput {
    /// Pivoted fundamentals, ascending by period.
    pub history: FundamentalsHistory,
    /// Latest price bar, if one exists.
    pub price: Option<PriceBar>,
}

/// Outcome of valuing one instrument inside a batch.
#[derive(Debug)]
pub struct ValuationOutcome {
    /// Instrument symbol.
    pub symbol: String,
    /// The valuation, or the per-instrument error that skipped it.
    pub result: Result<DcfResult, ValuationError>,
}

/// Projects DCF valuations for instruments.
#[derive(Debug, Default)]
pub struct DcfProjector {
    config: DcfConfig,
    growth: GrowthEstimator,
    sensitivity: SensitivityAnalyzer,
}

impl DcfProjector {
    /// Create a projector with the given assumptions and default growth
    /// estimation and sensitivity grid.
    pub fn new(config: DcfConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a projector from explicit parts.
    pub const fn with_parts(
        config: DcfConfig,
        growth: GrowthEstimator,
        sensitivity: SensitivityAnalyzer,
    ) -> Self {
        Self {
            config,
            growth,
            sensitivity,
        }
    }

    /// The active assumptions.
    pub const fn config(&self) -> &DcfConfig {
        &self.config
    }

    /// Value one instrument.
    ///
    /// Pure function of its inputs: the same history, price, and config
    /// always produce an identical result.
    pub fn value(
        &self,
        history: &FundamentalsHistory,
        price: Option<&PriceBar>,
    ) -> Result<DcfResult, ValuationError> {
        let symbol = history.symbol.clone();

        let latest = history
            .latest()
            .ok_or_else(|| ValuationError::MissingFundamentals(symbol.clone()))?;
        let price = price.ok_or_else(|| ValuationError::MissingPrice(symbol.clone()))?;

        if !is_valid_pair(self.config.discount_rate, self.config.terminal_growth_rate) {
            return Err(ValuationError::InvalidAssumptions {
                discount_rate: self.config.discount_rate,
                terminal_growth: self.config.terminal_growth_rate,
            });
        }

        let eps = latest.eps.unwrap_or(0.0);
        if eps <= 0.0 {
            return Err(ValuationError::NonPositiveEps { symbol, eps });
        }

        // One growth estimate per instrument, shared with every
        // sensitivity cell.
        let growth = self.growth.estimate(history);

        let projection = project_cash_flows(
            eps,
            growth.profit_growth,
            self.config.discount_rate,
            self.config.terminal_growth_rate,
            self.config.projection_years,
            self.config.fcf_conversion,
        );

        let dcf_value = self.config.per_share_value(projection.enterprise_value);
        let bps = latest.bps.unwrap_or(0.0);
        let sensitivity = self.sensitivity.analyze(eps, &growth, &self.config);

        Ok(DcfResult {
            symbol,
            as_of_date: price.date,
            current_price: price.close,
            dcf_value,
            upside_pct: safe_div(dcf_value - price.close, price.close) * 100.0,
            pe_implied: dcf_value / eps,
            pb_implied: if bps > 0.0 { dcf_value / bps } else { 0.0 },
            discount_rate: self.config.discount_rate,
            terminal_growth_rate: self.config.terminal_growth_rate,
            projection_years: self.config.projection_years,
            growth,
            projections: projection.projections,
            terminal_value: projection.terminal_value,
            pv_terminal_value: projection.pv_terminal_value,
            enterprise_value: projection.enterprise_value,
            range_low: dcf_value * 0.8,
            range_high: dcf_value * 1.2,
            sensitivity,
        })
    }

    /// Value a batch sequentially. One instrument's failure never stops
    /// the batch: the error is recorded in its outcome and the loop moves
    /// on.
    pub fn value_batch(&self, inputs: &[ValuationInput]) -> Vec<ValuationOutcome> {
        inputs
            .iter()
            .map(|input| {
                let symbol = input.history.symbol.clone();
                let result = self.value(&input.history, input.price.as_ref());
                if let Err(ref error) = result {
                    eprintln!("Warning: skipping valuation for {symbol}: {error}");
                }
                ValuationOutcome { symbol, result }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use jarrah_core::records::{FundamentalMetric, FundamentalRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn history(eps: f64) -> FundamentalsHistory {
        let rows = [
            (2021, FundamentalMetric::Revenue, 1.0e11),
            (2022, FundamentalMetric::Revenue, 1.1e11),
            (2023, FundamentalMetric::Revenue, 1.2e11),
            (2021, FundamentalMetric::NetProfit, 4.0e10),
            (2022, FundamentalMetric::NetProfit, 4.2e10),
            (2023, FundamentalMetric::NetProfit, 4.41e10),
            (2023, FundamentalMetric::Roe, 0.18),
            (2023, FundamentalMetric::Eps, eps),
            (2023, FundamentalMetric::Bps, 120.0),
        ];
        let records: Vec<FundamentalRecord> = rows
            .iter()
            .map(|&(year, metric, value)| FundamentalRecord {
                symbol: "600519.SH".to_string(),
                period: date(year, 12, 31),
                metric,
                value,
            })
            .collect();
        FundamentalsHistory::from_records("600519.SH", &records)
    }

    fn price(close: f64) -> PriceBar {
        PriceBar {
            symbol: "600519.SH".to_string(),
            date: date(2024, 6, 28),
            close,
            pct_change: Some(0.4),
            volume: Some(30_000.0),
            turnover: Some(5.1e9),
        }
    }

    #[test]
    fn scenario_enterprise_value_matches_closed_form() {
        // EPS 10, profit growth 5%, discount 10%, terminal growth 3%,
        // 5 years. Cross-check the projection loop against the geometric
        // series expression for the same cash flows.
        let projection = project_cash_flows(10.0, 0.05, 0.10, 0.03, 5, 0.8);

        let q: f64 = 1.05 / 1.10;
        let explicit = 8.0 * q * (1.0 - q.powi(5)) / (1.0 - q);
        let terminal =
            (10.0 * 1.05_f64.powi(5) * 0.8) / (0.10 - 0.03) / 1.10_f64.powi(5);
        let expected = explicit + terminal;

        assert_relative_eq!(
            projection.enterprise_value,
            expected,
            max_relative = 1e-6
        );
        assert_relative_eq!(projection.enterprise_value, 125.432_183, epsilon = 1e-3);
        assert_eq!(projection.projections.len(), 5);
        assert_relative_eq!(
            projection.projections[0].projected_eps,
            10.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn valuation_is_idempotent() {
        let projector = DcfProjector::default();
        let h = history(50.0);
        let p = price(1720.0);
        let first = projector.value(&h, Some(&p)).unwrap();
        let second = projector.value(&h, Some(&p)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.key(), second.key());
    }

    #[test]
    fn non_positive_eps_is_refused() {
        let projector = DcfProjector::default();
        let p = price(10.0);
        for eps in [0.0, -3.5] {
            let result = projector.value(&history(eps), Some(&p));
            assert!(matches!(
                result,
                Err(ValuationError::NonPositiveEps { .. })
            ));
        }
    }

    #[test]
    fn missing_inputs_are_per_instrument_errors() {
        let projector = DcfProjector::default();
        let empty = FundamentalsHistory::from_records("600519.SH", &[]);
        assert!(matches!(
            projector.value(&empty, Some(&price(10.0))),
            Err(ValuationError::MissingFundamentals(_))
        ));
        assert!(matches!(
            projector.value(&history(50.0), None),
            Err(ValuationError::MissingPrice(_))
        ));
    }

    #[test]
    fn base_assumptions_must_converge() {
        let projector = DcfProjector::new(DcfConfig {
            discount_rate: 0.03,
            terminal_growth_rate: 0.03,
            ..DcfConfig::default()
        });
        assert!(matches!(
            projector.value(&history(50.0), Some(&price(10.0))),
            Err(ValuationError::InvalidAssumptions { .. })
        ));
    }

    #[test]
    fn result_fields_are_consistent() {
        let projector = DcfProjector::default();
        let result = projector.value(&history(50.0), Some(&price(1720.0))).unwrap();

        assert_relative_eq!(
            result.dcf_value,
            projector.config().per_share_value(result.enterprise_value),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            result.upside_pct,
            (result.dcf_value - 1720.0) / 1720.0 * 100.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(result.pe_implied, result.dcf_value / 50.0);
        assert_relative_eq!(result.pb_implied, result.dcf_value / 120.0);
        assert_relative_eq!(result.range_low, result.dcf_value * 0.8);
        assert_relative_eq!(result.range_high, result.dcf_value * 1.2);
        assert_eq!(result.sensitivity.cells.len(), 16);
        assert_eq!(result.as_of_date, date(2024, 6, 28));
    }

    #[test]
    fn batch_continues_past_failures() {
        let projector = DcfProjector::default();
        let inputs = vec![
            ValuationInput {
                history: history(50.0),
                price: Some(price(1720.0)),
            },
            ValuationInput {
                history: history(0.0),
                price: Some(price(10.0)),
            },
            ValuationInput {
                history: history(2.0),
                price: None,
            },
        ];
        let outcomes = projector.value_batch(&inputs);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_err());
    }
}
