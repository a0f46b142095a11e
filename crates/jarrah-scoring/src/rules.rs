//! Deterministic rule-based scoring.
//!
//! The scorer starts from a base of 50 points and walks a declarative factor
//! table. Every factor grades its input into a labelled band worth a number
//! of raw points; the contribution to the score is the raw grade minus the
//! factor's center, so a neutral reading contributes exactly 0. Factors
//! whose inputs are absent are skipped and contribute nothing. The final
//! score is clamped to 0..100.
//!
//! Every band, weight, and center is visible in [`FACTORS`], so a score can
//! be audited by reading one table.

use crate::aggregate::{RuleThresholds, ScoreResult, TopFactor, top_by_contribution};
use crate::error::ScoringError;
use chrono::NaiveDate;
use jarrah_core::key::Method;
use jarrah_core::math::scrub_non_finite;
use jarrah_core::records::{FundamentalsHistory, PriceBar, TechnicalSnapshot};
use jarrah_core::sector::SectorTilt;

/// Version label stamped on every rule score.
pub const RULE_MODEL_VERSION: &str = "rule-v1.0";

/// Number of top factors retained on a result.
const TOP_FACTOR_COUNT: usize = 5;

/// Inputs the factor table reads. Optional fields mean the factor is
/// skipped; always-on fields carry neutral defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleInputs {
    /// Instrument symbol.
    pub symbol: String,
    /// Scoring date.
    pub as_of_date: NaiveDate,
    /// Price over latest EPS; `None` unless EPS is positive.
    pub pe_ratio: Option<f64>,
    /// Price over latest BPS; `None` unless BPS is positive.
    pub pb_ratio: Option<f64>,
    /// Latest return on equity; `None` unless positive.
    pub roe: Option<f64>,
    /// 14-day RSI, 50 (neutral) when the indicator is absent.
    pub rsi14: f64,
    /// MACD line, 0 (flat) when absent.
    pub macd: f64,
    /// Closing price.
    pub close: f64,
    /// 5-day moving average, the close itself when absent.
    pub ma5: f64,
    /// 20-day moving average, the close itself when absent.
    pub ma20: f64,
    /// Latest percent change, 0 when absent.
    pub price_change: f64,
    /// Sector tilt, neutral when the sector is unknown.
    pub tilt: SectorTilt,
}

impl RuleInputs {
    /// Assemble inputs from the raw records.
    ///
    /// Only the price bar is mandatory; everything else degrades to a
    /// skipped factor or a neutral default.
    pub fn from_records(
        history: &FundamentalsHistory,
        technicals: Option<&TechnicalSnapshot>,
        price: Option<&PriceBar>,
        tilt: Option<SectorTilt>,
    ) -> Result<Self, ScoringError> {
        let price =
            price.ok_or_else(|| ScoringError::MissingData(history.symbol.clone()))?;
        let close = price.close;

        let latest = history.latest();
        let positive =
            |v: Option<f64>| v.and_then(scrub_non_finite).filter(|x| *x > 0.0);
        let eps = positive(latest.and_then(|o| o.eps));
        let bps = positive(latest.and_then(|o| o.bps));
        let roe = positive(latest.and_then(|o| o.roe));

        Ok(Self {
            symbol: history.symbol.clone(),
            as_of_date: price.date,
            pe_ratio: eps.map(|e| close / e),
            pb_ratio: bps.map(|b| close / b),
            roe,
            rsi14: technicals.and_then(|t| t.rsi14).unwrap_or(50.0),
            macd: technicals.and_then(|t| t.macd).unwrap_or(0.0),
            close,
            ma5: technicals.and_then(|t| t.ma5).unwrap_or(close),
            ma20: technicals.and_then(|t| t.ma20).unwrap_or(close),
            price_change: price.pct_change.unwrap_or(0.0),
            tilt: tilt.unwrap_or(SectorTilt::Neutral),
        })
    }
}

/// A labelled band reading.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FactorGrade {
    label: &'static str,
    points: f64,
}

const fn grade(label: &'static str, points: f64) -> Option<FactorGrade> {
    Some(FactorGrade { label, points })
}

/// One row of the factor table.
#[derive(Debug)]
struct FactorSpec {
    /// Factor identifier, also the result's factor name.
    name: &'static str,
    /// Maximum raw points the factor can grant.
    weight: f64,
    /// Raw points of a neutral reading; the contribution is raw - center.
    center: f64,
    /// Band evaluation; `None` skips the factor.
    eval: fn(&RuleInputs) -> Option<FactorGrade>,
}

/// The factor table, in evaluation order.
const FACTORS: [FactorSpec; 8] = [
    FactorSpec {
        name: "pe_ratio",
        weight: 20.0,
        center: 10.0,
        eval: |r| match r.pe_ratio {
            Some(pe) if pe < 10.0 => grade("low PE", 20.0),
            Some(pe) if pe < 20.0 => grade("moderate PE", 15.0),
            Some(pe) if pe < 30.0 => grade("elevated PE", 10.0),
            Some(_) => grade("high PE", 5.0),
            None => None,
        },
    },
    FactorSpec {
        name: "pb_ratio",
        weight: 15.0,
        center: 7.5,
        eval: |r| match r.pb_ratio {
            Some(pb) if pb < 1.0 => grade("below book", 15.0),
            Some(pb) if pb < 2.0 => grade("moderate PB", 10.0),
            Some(pb) if pb < 4.0 => grade("elevated PB", 5.0),
            Some(_) => grade("high PB", 0.0),
            None => None,
        },
    },
    FactorSpec {
        name: "roe",
        weight: 15.0,
        center: 7.5,
        eval: |r| match r.roe {
            Some(roe) if roe > 0.20 => grade("ROE above 20%", 15.0),
            Some(roe) if roe > 0.15 => grade("ROE above 15%", 12.0),
            Some(roe) if roe > 0.10 => grade("ROE above 10%", 8.0),
            Some(_) => grade("ROE below 10%", 3.0),
            None => None,
        },
    },
    FactorSpec {
        name: "rsi14",
        weight: 10.0,
        center: 5.0,
        eval: |r| {
            if r.rsi14 < 30.0 {
                grade("oversold RSI", 10.0)
            } else if r.rsi14 < 50.0 {
                grade("soft RSI", 7.0)
            } else if r.rsi14 < 70.0 {
                grade("normal RSI", 5.0)
            } else {
                grade("overbought RSI", 2.0)
            }
        },
    },
    FactorSpec {
        name: "macd",
        weight: 10.0,
        center: 5.0,
        eval: |r| {
            if r.macd > 0.0 {
                grade("MACD positive", 8.0)
            } else if r.macd < 0.0 {
                grade("MACD negative", 3.0)
            } else {
                grade("MACD flat", 5.0)
            }
        },
    },
    FactorSpec {
        name: "ma_alignment",
        weight: 10.0,
        center: 5.0,
        eval: |r| {
            if r.close > r.ma5 && r.ma5 > r.ma20 {
                grade("bullish alignment", 10.0)
            } else if r.close > r.ma5 {
                grade("above 5-day average", 7.0)
            } else if r.close >= r.ma20 {
                grade("holding 20-day average", 5.0)
            } else {
                grade("below averages", 2.0)
            }
        },
    },
    FactorSpec {
        name: "price_change",
        weight: 10.0,
        center: 5.0,
        eval: |r| {
            if r.price_change > 5.0 {
                grade("strong advance", 10.0)
            } else if r.price_change > 0.0 {
                grade("advancing", 7.0)
            } else if r.price_change > -5.0 {
                grade("ranging", 5.0)
            } else {
                grade("declining", 2.0)
            }
        },
    },
    FactorSpec {
        name: "sector",
        weight: 10.0,
        center: 5.0,
        eval: |r| match r.tilt {
            SectorTilt::Growth => grade("growth sector", 8.0),
            SectorTilt::Financial => grade("financial sector", 7.0),
            SectorTilt::Cyclical => grade("cyclical sector", 3.0),
            SectorTilt::Neutral => grade("neutral sector", 5.0),
        },
    },
];

/// Scores instruments from the declarative factor table.
#[derive(Debug, Default)]
pub struct RuleScorer {
    thresholds: RuleThresholds,
}

impl RuleScorer {
    /// Create a scorer with the given action ladder.
    pub const fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// The active action ladder.
    pub const fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    /// Score one instrument. Deterministic: the same inputs always yield
    /// the same score, action, and factor ordering.
    pub fn score(&self, inputs: &RuleInputs) -> ScoreResult {
        let mut score = 50.0;
        let mut contributions = Vec::with_capacity(FACTORS.len());

        for spec in &FACTORS {
            let Some(graded) = (spec.eval)(inputs) else {
                continue;
            };
            debug_assert!(graded.points <= spec.weight);
            let adjustment = graded.points - spec.center;
            score += adjustment;
            contributions.push(TopFactor {
                name: spec.name.to_string(),
                label: graded.label.to_string(),
                reading: graded.points,
                contribution: adjustment,
            });
        }

        let score = score.clamp(0.0, 100.0);

        ScoreResult {
            symbol: inputs.symbol.clone(),
            as_of_date: inputs.as_of_date,
            method: Method::RuleScore,
            score,
            action: self.thresholds.action(score),
            top_factors: top_by_contribution(contributions, TOP_FACTOR_COUNT),
            model_version: RULE_MODEL_VERSION.to_string(),
        }
    }
}
