//! Sequential batch scoring.
//!
//! The pipeline derives features once for the whole batch before any symbol
//! is scored, so batch-relative features (the size tier) see the full
//! cross-section. Scoring then walks the symbols one by one; a failed
//! symbol is reported with a warning and skipped, never aborting the batch.

use crate::aggregate::ScoreResult;
use crate::error::ScoringError;
use crate::model::MlScorer;
use crate::rules::{RuleInputs, RuleScorer};
use jarrah_core::records::{FundamentalsHistory, PriceBar, TechnicalSnapshot};
use jarrah_core::sector::Sector;
use jarrah_features::{FeatureBuilder, FeatureMatrix};
use polars::prelude::*;

/// Everything known about one instrument going into scoring.
#[derive(Debug, Clone)]
pub struct ScoreInput {
    /// Pivoted fundamentals, ascending by period.
    pub history: FundamentalsHistory,
    /// Latest technical indicator snapshot, if any.
    pub technicals: Option<TechnicalSnapshot>,
    /// Latest price bar, if any.
    pub price: Option<PriceBar>,
    /// Sector classification, if known.
    pub sector: Option<Sector>,
}

/// Both scorers' outcomes for one instrument.
#[derive(Debug)]
pub struct ScoreOutcome {
    /// Instrument symbol.
    pub symbol: String,
    /// Rule score, or the per-instrument error that skipped it.
    pub rule: Result<ScoreResult, ScoringError>,
    /// Model score; `Ok(None)` when the instrument had no features.
    pub ml: Result<Option<ScoreResult>, ScoringError>,
}

/// Runs both scorers over a batch.
#[derive(Debug, Default)]
pub struct ScoringPipeline {
    features: FeatureBuilder,
    rule: RuleScorer,
    ml: MlScorer,
}

impl ScoringPipeline {
    /// Create a pipeline from its parts.
    pub const fn new(features: FeatureBuilder, rule: RuleScorer, ml: MlScorer) -> Self {
        Self { features, rule, ml }
    }

    /// The model scorer, for training or installing a model.
    pub fn ml_mut(&mut self) -> &mut MlScorer {
        &mut self.ml
    }

    /// Score a batch sequentially.
    ///
    /// `price_history`, when given, feeds the rolling-window features; see
    /// [`FeatureBuilder::build`]. Feature derivation runs once up front so
    /// the size tier is computed over the full batch.
    pub fn score_batch(
        &self,
        inputs: &[ScoreInput],
        price_history: Option<&DataFrame>,
    ) -> Vec<ScoreOutcome> {
        if inputs.is_empty() {
            return Vec::new();
        }

        let matrix = self.build_matrix(inputs, price_history);
        if let Err(ref error) = matrix {
            eprintln!("Warning: feature derivation failed for the batch: {error}");
        }
        let matrix = matrix.ok();

        inputs
            .iter()
            .map(|input| self.score_one(input, matrix.as_ref()))
            .collect()
    }

    fn score_one(&self, input: &ScoreInput, matrix: Option<&FeatureMatrix>) -> ScoreOutcome {
        let symbol = input.history.symbol.clone();

        let rule = RuleInputs::from_records(
            &input.history,
            input.technicals.as_ref(),
            input.price.as_ref(),
            input.sector.map(|s| s.tilt()),
        )
        .map(|inputs| self.rule.score(&inputs));

        let ml = match input.price.as_ref() {
            Some(price) => {
                let vector = matrix.and_then(|m| m.vector_for(&symbol));
                self.ml.score(&symbol, price.date, vector.as_ref())
            }
            None => Err(ScoringError::MissingData(symbol.clone())),
        };

        if let Err(ref error) = rule {
            eprintln!("Warning: skipping rule score for {symbol}: {error}");
        }
        if let Err(ref error) = ml {
            eprintln!("Warning: skipping model score for {symbol}: {error}");
        }

        ScoreOutcome { symbol, rule, ml }
    }

    /// One snapshot row per symbol, joined from the raw records, then
    /// through feature derivation.
    fn build_matrix(
        &self,
        inputs: &[ScoreInput],
        price_history: Option<&DataFrame>,
    ) -> Result<FeatureMatrix, ScoringError> {
        let n = inputs.len();
        let mut symbols = Vec::with_capacity(n);
        let mut fundamentals: [Vec<Option<f64>>; 9] = Default::default();
        let mut technicals: [Vec<Option<f64>>; 11] = Default::default();
        let mut prices: [Vec<Option<f64>>; 3] = Default::default();

        for input in inputs {
            symbols.push(input.history.symbol.clone());

            let latest = input.history.latest();
            let n_obs = input.history.len();
            let previous = n_obs
                .checked_sub(2)
                .and_then(|i| input.history.observations.get(i));
            let fundamental_values = [
                latest.and_then(|o| o.eps),
                latest.and_then(|o| o.bps),
                latest.and_then(|o| o.roe),
                latest.and_then(|o| o.revenue),
                latest.and_then(|o| o.net_profit),
                latest.and_then(|o| o.ocfps),
                latest.and_then(|o| o.debt_to_assets),
                previous.and_then(|o| o.eps),
                previous.and_then(|o| o.revenue),
            ];
            for (column, value) in fundamentals.iter_mut().zip(fundamental_values) {
                column.push(value);
            }

            let t = input.technicals.as_ref();
            let technical_values = [
                t.and_then(|t| t.ma5),
                t.and_then(|t| t.ma10),
                t.and_then(|t| t.ma20),
                t.and_then(|t| t.macd),
                t.and_then(|t| t.macd_signal),
                t.and_then(|t| t.macd_hist),
                t.and_then(|t| t.rsi6),
                t.and_then(|t| t.rsi14),
                t.and_then(|t| t.boll_upper),
                t.and_then(|t| t.boll_mid),
                t.and_then(|t| t.boll_lower),
            ];
            for (column, value) in technicals.iter_mut().zip(technical_values) {
                column.push(value);
            }

            let p = input.price.as_ref();
            let price_values = [
                p.map(|p| p.close),
                p.and_then(|p| p.pct_change),
                p.and_then(|p| p.volume),
            ];
            for (column, value) in prices.iter_mut().zip(price_values) {
                column.push(value);
            }
        }

        let [eps, bps, roe, revenue, net_profit, ocfps, debt_to_assets, eps_prev, revenue_prev] =
            fundamentals;
        let [ma5, ma10, ma20, macd, macd_signal, macd_hist, rsi6, rsi14, boll_upper, boll_mid, boll_lower] =
            technicals;
        let [close, pct_chg, volume] = prices;

        let snapshot = df![
            "symbol" => symbols,
            "eps" => eps,
            "bps" => bps,
            "roe" => roe,
            "revenue" => revenue,
            "net_profit" => net_profit,
            "ocfps" => ocfps,
            "debt_to_assets" => debt_to_assets,
            "eps_prev" => eps_prev,
            "revenue_prev" => revenue_prev,
            "ma5" => ma5,
            "ma10" => ma10,
            "ma20" => ma20,
            "macd" => macd,
            "macd_signal" => macd_signal,
            "macd_hist" => macd_hist,
            "rsi6" => rsi6,
            "rsi14" => rsi14,
            "boll_upper" => boll_upper,
            "boll_mid" => boll_mid,
            "boll_lower" => boll_lower,
            "close" => close,
            "pct_chg" => pct_chg,
            "volume" => volume,
        ]
        .map_err(jarrah_features::FeatureError::from)?;

        let frame = self.features.build(&snapshot, price_history)?;
        Ok(FeatureMatrix::from_frame(&frame, None)?)
    }
}
