//! Score aggregation: action ladders, top-factor selection, result shape.
//!
//! The two scorers interpret their numbers on different scales, so their
//! threshold tables are distinct types and never unified: the rule ladder
//! reads a 0..100 score, the model ladder a signed predicted return. Both
//! are plain serde structs so deployments can tune thresholds without code
//! changes.

use chrono::NaiveDate;
use derive_more::Display;
use jarrah_core::key::{Method, RecordKey};
use serde::{Deserialize, Serialize};

/// Recommended action for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Strong conviction to buy.
    #[display("strong buy")]
    StrongBuy,
    /// Buy.
    #[display("buy")]
    Buy,
    /// Hold current position.
    #[display("hold")]
    Hold,
    /// Stay on the sidelines and watch.
    #[display("watch")]
    Watch,
    /// Sell.
    #[display("sell")]
    Sell,
    /// Strong conviction to sell.
    #[display("strong sell")]
    StrongSell,
}

/// Action ladder over the rule scorer's 0..100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Score at or above which the action is strong buy (default: 80).
    pub strong_buy: f64,
    /// Score at or above which the action is buy (default: 70).
    pub buy: f64,
    /// Score at or above which the action is hold (default: 60).
    pub hold: f64,
    /// Score at or above which the action is watch (default: 40);
    /// anything lower is sell.
    pub watch: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 80.0,
            buy: 70.0,
            hold: 60.0,
            watch: 40.0,
        }
    }
}

impl RuleThresholds {
    /// Map a clamped 0..100 score to an action.
    pub fn action(&self, score: f64) -> Action {
        if score >= self.strong_buy {
            Action::StrongBuy
        } else if score >= self.buy {
            Action::Buy
        } else if score >= self.hold {
            Action::Hold
        } else if score >= self.watch {
            Action::Watch
        } else {
            Action::Sell
        }
    }
}

/// Action ladder over the model scorer's signed predicted return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnThresholds {
    /// Predicted return above which the action is strong buy (default: 0.10).
    pub strong_buy: f64,
    /// Predicted return above which the action is buy (default: 0.05).
    pub buy: f64,
    /// Predicted return above which the action is hold (default: -0.05).
    pub hold: f64,
    /// Predicted return above which the action is sell (default: -0.10);
    /// anything lower is strong sell.
    pub sell: f64,
}

impl Default for ReturnThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 0.10,
            buy: 0.05,
            hold: -0.05,
            sell: -0.10,
        }
    }
}

impl ReturnThresholds {
    /// Map a predicted return to an action.
    pub fn action(&self, predicted_return: f64) -> Action {
        if predicted_return > self.strong_buy {
            Action::StrongBuy
        } else if predicted_return > self.buy {
            Action::Buy
        } else if predicted_return > self.hold {
            Action::Hold
        } else if predicted_return > self.sell {
            Action::Sell
        } else {
            Action::StrongSell
        }
    }
}

/// One factor's contribution to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFactor {
    /// Factor or feature identifier.
    pub name: String,
    /// Human-readable reading behind the contribution.
    pub label: String,
    /// Raw grade points (rule) or the instance's scaled value (model).
    pub reading: f64,
    /// Centered adjustment (rule) or global importance (model).
    pub contribution: f64,
}

/// Largest contributions first, ties kept in evaluation order.
pub fn top_by_contribution(mut factors: Vec<TopFactor>, n: usize) -> Vec<TopFactor> {
    factors.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    factors.truncate(n);
    factors
}

/// Largest absolute contributions first, ties kept in evaluation order.
pub fn top_by_magnitude(mut factors: Vec<TopFactor>, n: usize) -> Vec<TopFactor> {
    factors.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    factors.truncate(n);
    factors
}

/// A completed score. Pure value keyed by (symbol, date, method);
/// recomputation supersedes the stored record rather than appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Instrument symbol.
    pub symbol: String,
    /// Scoring date.
    pub as_of_date: NaiveDate,
    /// Which scorer produced this record.
    pub method: Method,
    /// Score: 0..100 for the rule scorer, a signed predicted return for
    /// the model scorer.
    pub score: f64,
    /// Recommended action per the producing scorer's ladder.
    pub action: Action,
    /// The five most influential factors.
    pub top_factors: Vec<TopFactor>,
    /// Version label of the producing scorer.
    pub model_version: String,
}

impl ScoreResult {
    /// Upsert key for the storage collaborator.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.symbol.clone(), self.as_of_date, self.method)
    }
}
