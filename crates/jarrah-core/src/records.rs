//! Raw input records.
//!
//! These are the shapes the engine consumes from its storage collaborator:
//! long-format fundamental metrics, the latest technical indicator snapshot,
//! and the latest price bar. All are read-only to the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fundamental metrics tracked per reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalMetric {
    /// Earnings per share.
    Eps,
    /// Book value per share.
    Bps,
    /// Return on equity (as a fraction, e.g. 0.18).
    Roe,
    /// Total revenue.
    Revenue,
    /// Net profit.
    NetProfit,
    /// Operating cash flow per share.
    Ocfps,
    /// Debt-to-assets ratio.
    DebtToAssets,
}

impl FundamentalMetric {
    /// Storage-side column name for this metric.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eps => "eps",
            Self::Bps => "bps",
            Self::Roe => "roe",
            Self::Revenue => "revenue",
            Self::NetProfit => "net_profit",
            Self::Ocfps => "ocfps",
            Self::DebtToAssets => "debt_to_assets",
        }
    }
}

/// One fundamental observation in long format, as stored.
///
/// Unique per (symbol, period, metric); immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRecord {
    /// Instrument symbol.
    pub symbol: String,
    /// Reporting period end date.
    pub period: NaiveDate,
    /// Which metric this record carries.
    pub metric: FundamentalMetric,
    /// Metric value.
    pub value: f64,
}

/// One reporting period pivoted wide. Absent metrics stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalObservation {
    /// Reporting period end date.
    pub period: Option<NaiveDate>,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Book value per share.
    pub bps: Option<f64>,
    /// Return on equity.
    pub roe: Option<f64>,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Net profit.
    pub net_profit: Option<f64>,
    /// Operating cash flow per share.
    pub ocfps: Option<f64>,
    /// Debt-to-assets ratio.
    pub debt_to_assets: Option<f64>,
}

impl FundamentalObservation {
    fn set(&mut self, metric: FundamentalMetric, value: f64) {
        let slot = match metric {
            FundamentalMetric::Eps => &mut self.eps,
            FundamentalMetric::Bps => &mut self.bps,
            FundamentalMetric::Roe => &mut self.roe,
            FundamentalMetric::Revenue => &mut self.revenue,
            FundamentalMetric::NetProfit => &mut self.net_profit,
            FundamentalMetric::Ocfps => &mut self.ocfps,
            FundamentalMetric::DebtToAssets => &mut self.debt_to_assets,
        };
        *slot = Some(value);
    }

    /// Read a metric back out of the wide observation.
    pub const fn get(&self, metric: FundamentalMetric) -> Option<f64> {
        match metric {
            FundamentalMetric::Eps => self.eps,
            FundamentalMetric::Bps => self.bps,
            FundamentalMetric::Roe => self.roe,
            FundamentalMetric::Revenue => self.revenue,
            FundamentalMetric::NetProfit => self.net_profit,
            FundamentalMetric::Ocfps => self.ocfps,
            FundamentalMetric::DebtToAssets => self.debt_to_assets,
        }
    }
}

/// A symbol's fundamentals pivoted wide and ordered ascending by period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsHistory {
    /// Instrument symbol.
    pub symbol: String,
    /// Observations ascending by reporting period.
    pub observations: Vec<FundamentalObservation>,
}

impl FundamentalsHistory {
    /// Pivot long-format records into a time-ordered wide history.
    ///
    /// Records for other symbols are ignored; later duplicates of the same
    /// (period, metric) cell overwrite earlier ones.
    pub fn from_records(symbol: &str, records: &[FundamentalRecord]) -> Self {
        let mut by_period: BTreeMap<NaiveDate, FundamentalObservation> = BTreeMap::new();
        for record in records.iter().filter(|r| r.symbol == symbol) {
            let obs = by_period.entry(record.period).or_default();
            obs.period = Some(record.period);
            obs.set(record.metric, record.value);
        }
        Self {
            symbol: symbol.to_string(),
            observations: by_period.into_values().collect(),
        }
    }

    /// Number of reporting periods.
    pub const fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the history holds no periods at all.
    pub const fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The most recent observation.
    pub fn latest(&self) -> Option<&FundamentalObservation> {
        self.observations.last()
    }

    /// Non-missing, finite values of one metric, ascending by period.
    pub fn series(&self, metric: FundamentalMetric) -> Vec<f64> {
        self.observations
            .iter()
            .filter_map(|obs| obs.get(metric))
            .filter(|v| v.is_finite())
            .collect()
    }
}

/// Latest technical indicator snapshot for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    /// Instrument symbol.
    pub symbol: String,
    /// Indicator date.
    pub date: Option<NaiveDate>,
    /// 5-day moving average.
    pub ma5: Option<f64>,
    /// 10-day moving average.
    pub ma10: Option<f64>,
    /// 20-day moving average.
    pub ma20: Option<f64>,
    /// MACD line.
    pub macd: Option<f64>,
    /// MACD signal line.
    pub macd_signal: Option<f64>,
    /// MACD histogram.
    pub macd_hist: Option<f64>,
    /// 6-day RSI.
    pub rsi6: Option<f64>,
    /// 14-day RSI.
    pub rsi14: Option<f64>,
    /// Upper Bollinger band.
    pub boll_upper: Option<f64>,
    /// Middle Bollinger band.
    pub boll_mid: Option<f64>,
    /// Lower Bollinger band.
    pub boll_lower: Option<f64>,
}

/// One daily price bar. The latest bar supplies the current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Instrument symbol.
    pub symbol: String,
    /// Trade date.
    pub date: NaiveDate,
    /// Closing price.
    pub close: f64,
    /// Percent change versus the previous close.
    pub pct_change: Option<f64>,
    /// Traded volume.
    pub volume: Option<f64>,
    /// Traded turnover.
    pub turnover: Option<f64>,
}
