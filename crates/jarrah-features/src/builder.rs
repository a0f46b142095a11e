//! Batch feature derivation.
//!
//! Input is a snapshot frame with one row per symbol joining fundamental,
//! technical, and price columns, plus an optional per-symbol price history
//! for the rolling windows. Missing input columns are defaulted to zero
//! before derivation so absence never propagates as an error; every ratio
//! carries an explicit zero-denominator default; infinities are nulled and
//! median-filled over the batch before the frame leaves the builder.

use crate::error::FeatureError;
use crate::registry::MODEL_FEATURES;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw numeric columns the builder consumes. Absent ones are created as 0.0.
const NUMERIC_INPUTS: [&str; 23] = [
    "eps",
    "bps",
    "revenue",
    "net_profit",
    "ocfps",
    "roe",
    "eps_prev",
    "revenue_prev",
    "ma5",
    "ma10",
    "ma20",
    "macd",
    "macd_signal",
    "macd_hist",
    "rsi6",
    "rsi14",
    "boll_upper",
    "boll_mid",
    "boll_lower",
    "close",
    "pct_chg",
    "volume",
    "turnover",
];

/// Configuration for feature derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Assumed shares outstanding used for the revenue ratio and the
    /// market-cap proxy (default: 1e9).
    pub share_scale: f64,

    /// Rolling window for realized volatility (default: 20).
    pub volatility_window: usize,

    /// Rolling window for the mean-volume baseline (default: 20).
    pub volume_window: usize,

    /// Batch percentile above which an instrument counts as large cap
    /// (default: 0.7).
    pub large_cap_quantile: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            share_scale: 1e9,
            volatility_window: 20,
            volume_window: 20,
            large_cap_quantile: 0.7,
        }
    }
}

/// Derives the feature frame for a batch of instruments.
#[derive(Debug, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    /// Create a builder with the given configuration.
    pub const fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Derive features for a batch snapshot.
    ///
    /// `history`, when given, must hold `[symbol, date, pct_chg, volume]`
    /// rows covering the recent bars per symbol; without it the volatility
    /// and volume-ratio features take their incomplete-window defaults.
    ///
    /// The output keeps the snapshot's own columns (so labels and raw
    /// indicators pass through) and appends one column per entry in
    /// [`MODEL_FEATURES`], all finite.
    pub fn build(
        &self,
        snapshot: &DataFrame,
        history: Option<&DataFrame>,
    ) -> Result<DataFrame, FeatureError> {
        if snapshot.height() == 0 {
            return Err(FeatureError::EmptySnapshot);
        }
        let present: Vec<String> = snapshot
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if !present.iter().any(|c| c == "symbol") {
            return Err(FeatureError::MissingColumn("symbol".to_string()));
        }

        let lf = self.default_inputs(snapshot.clone().lazy(), &present);
        let lf = self.derive(lf);
        let lf = self.rolling(lf, history)?;
        let lf = Self::sanitize(lf);

        let out = lf
            .drop(["market_cap", "volume_window_mean", "volume_window_len"])
            .collect()?;
        Ok(out)
    }

    /// Cast present inputs to f64 with nulls zeroed, and create absent ones
    /// as zero columns.
    fn default_inputs(&self, lf: LazyFrame, present: &[String]) -> LazyFrame {
        let exprs: Vec<Expr> = NUMERIC_INPUTS
            .iter()
            .map(|&name| {
                if present.iter().any(|c| c == name) {
                    col(name)
                        .cast(DataType::Float64)
                        .fill_null(lit(0.0))
                        .alias(name)
                } else {
                    lit(0.0).alias(name)
                }
            })
            .collect();
        lf.with_columns(exprs)
    }

    /// Snapshot-local derivations: ratios, growth deltas, band position,
    /// and the batch-relative size flag.
    fn derive(&self, lf: LazyFrame) -> LazyFrame {
        let share_scale = self.config.share_scale;

        lf.with_columns([
            ratio_or("close", "eps", 0.0).alias("pe_ratio"),
            ratio_or("close", "bps", 0.0).alias("pb_ratio"),
            when(col("revenue").neq(0.0))
                .then(col("close") * lit(share_scale) / col("revenue"))
                .otherwise(lit(0.0))
                .alias("ps_ratio"),
            ratio_or("close", "ocfps", 0.0).alias("pcf_ratio"),
            pct_change("eps", "eps_prev").alias("eps_growth"),
            pct_change("revenue", "revenue_prev").alias("revenue_growth"),
            ratio_or("net_profit", "revenue", 0.0).alias("profit_margin"),
            ratio_or("close", "ma5", 1.0).alias("ma5_ratio"),
            ratio_or("close", "ma10", 1.0).alias("ma10_ratio"),
            ratio_or("close", "ma20", 1.0).alias("ma20_ratio"),
            when((col("boll_upper") - col("boll_lower")).neq(0.0))
                .then(
                    (col("close") - col("boll_lower"))
                        / (col("boll_upper") - col("boll_lower")),
                )
                .otherwise(lit(0.5))
                .alias("boll_position"),
            (col("close") * lit(share_scale)).alias("market_cap"),
        ])
        .with_columns([col("market_cap")
            .gt(col("market_cap").quantile(
                lit(self.config.large_cap_quantile),
                QuantileMethod::Linear,
            ))
            .cast(DataType::Float64)
            .alias("is_large_cap")])
    }

    /// Window features from the price history: realized volatility and the
    /// current volume relative to its rolling mean. Without history both
    /// take their incomplete-window defaults (0 and 1).
    fn rolling(
        &self,
        lf: LazyFrame,
        history: Option<&DataFrame>,
    ) -> Result<LazyFrame, FeatureError> {
        // The helper columns are materialized on both paths so the final
        // drop in `build` always finds them.
        let Some(history) = history.filter(|h| h.height() > 0) else {
            return Ok(lf.with_columns([
                lit(0.0).alias("volatility"),
                lit(1.0).alias("volume_ratio"),
                lit(0.0).alias("volume_window_mean"),
                lit(0.0).alias("volume_window_len"),
            ]));
        };

        let vol_window = self.config.volatility_window as i64;
        let volume_window = self.config.volume_window as i64;

        let windows = history
            .clone()
            .lazy()
            .sort(["symbol", "date"], Default::default())
            .group_by([col("symbol")])
            .agg([
                col("pct_chg")
                    .cast(DataType::Float64)
                    .slice(lit(-vol_window), lit(vol_window))
                    .std(1)
                    .alias("pct_window_std"),
                col("pct_chg").count().alias("pct_window_len"),
                col("volume")
                    .cast(DataType::Float64)
                    .slice(lit(-volume_window), lit(volume_window))
                    .mean()
                    .alias("volume_window_mean"),
                col("volume").count().alias("volume_window_len"),
            ])
            .with_columns([when(col("pct_window_len").gt_eq(lit(vol_window)))
                .then(col("pct_window_std"))
                .otherwise(lit(0.0))
                .fill_null(lit(0.0))
                .alias("volatility")])
            .select([
                col("symbol"),
                col("volatility"),
                col("volume_window_mean"),
                col("volume_window_len"),
            ]);

        let joined = lf
            .join(
                windows,
                [col("symbol")],
                [col("symbol")],
                JoinArgs::new(JoinType::Left),
            )
            .with_columns([
                col("volatility").fill_null(lit(0.0)).alias("volatility"),
                when(
                    col("volume_window_len")
                        .gt_eq(lit(volume_window))
                        .and(col("volume_window_mean").neq(0.0)),
                )
                .then(col("volume") / col("volume_window_mean"))
                .otherwise(lit(1.0))
                .fill_null(lit(1.0))
                .alias("volume_ratio"),
            ]);

        Ok(joined)
    }

    /// Null out non-finite feature values, then fill nulls with the batch
    /// median (and 0.0 for all-null columns, whose median is itself null).
    fn sanitize(lf: LazyFrame) -> LazyFrame {
        let null_non_finite: Vec<Expr> = MODEL_FEATURES
            .iter()
            .map(|&name| {
                when(col(name).is_finite())
                    .then(col(name))
                    .otherwise(lit(NULL))
                    .alias(name)
            })
            .collect();
        let median_fill: Vec<Expr> = MODEL_FEATURES
            .iter()
            .map(|&name| {
                col(name)
                    .fill_null(col(name).median())
                    .fill_null(lit(0.0))
                    .alias(name)
            })
            .collect();
        lf.with_columns(null_non_finite).with_columns(median_fill)
    }
}

/// Guarded ratio: `numer / denom`, `default` when the denominator is 0.
fn ratio_or(numer: &str, denom: &str, default: f64) -> Expr {
    when(col(denom).neq(0.0))
        .then(col(numer) / col(denom))
        .otherwise(lit(default))
}

/// Period-over-period percent change against a `_prev` column, 0 when the
/// prior period is absent or zero. The denominator is sign-corrected so a
/// negative base still yields a sensible direction.
fn pct_change(current: &str, previous: &str) -> Expr {
    when(col(previous).neq(0.0))
        .then(
            (col(current) - col(previous))
                / when(col(previous).lt(0.0))
                    .then(-col(previous))
                    .otherwise(col(previous)),
        )
        .otherwise(lit(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn snapshot() -> DataFrame {
        df![
            "symbol" => ["600519.SH", "000001.SZ", "000002.SZ"],
            "eps" => [50.0, 0.0, 2.0],
            "bps" => [200.0, 15.0, 0.0],
            "revenue" => [1.3e11, 0.0, 4.5e10],
            "net_profit" => [6.0e10, 1.5e10, 0.0],
            "ocfps" => [55.0, 3.0, 0.0],
            "roe" => [0.30, 0.12, 0.08],
            "eps_prev" => [45.0, 0.0, -4.0],
            "revenue_prev" => [1.2e11, 2.0e10, 0.0],
            "ma5" => [1700.0, 12.0, 0.0],
            "ma10" => [1690.0, 12.2, 9.0],
            "ma20" => [1680.0, 12.5, 9.5],
            "rsi14" => [55.0, 28.0, 74.0],
            "boll_upper" => [1800.0, 13.0, 10.0],
            "boll_lower" => [1600.0, 11.0, 10.0],
            "close" => [1720.0, 12.4, 9.2],
            "pct_chg" => [1.2, -0.4, 0.0],
            "volume" => [30000.0, 150000.0, 80000.0],
        ]
        .unwrap()
    }

    fn feature(df: &DataFrame, name: &str, row: usize) -> f64 {
        df.column(name).unwrap().f64().unwrap().get(row).unwrap()
    }

    #[test]
    fn zero_denominators_take_documented_defaults() {
        let built = FeatureBuilder::default().build(&snapshot(), None).unwrap();

        // eps = 0 ⇒ pe_ratio = 0, bps = 0 ⇒ pb_ratio = 0, revenue = 0 ⇒ ps = 0.
        assert_relative_eq!(feature(&built, "pe_ratio", 1), 0.0);
        assert_relative_eq!(feature(&built, "pb_ratio", 2), 0.0);
        assert_relative_eq!(feature(&built, "ps_ratio", 1), 0.0);
        assert_relative_eq!(feature(&built, "pcf_ratio", 2), 0.0);
        // ma5 = 0 ⇒ ma5_ratio defaults to 1.
        assert_relative_eq!(feature(&built, "ma5_ratio", 2), 1.0);
        // zero band width ⇒ centered position.
        assert_relative_eq!(feature(&built, "boll_position", 2), 0.5);
    }

    #[test]
    fn ratios_compute_where_defined() {
        let built = FeatureBuilder::default().build(&snapshot(), None).unwrap();
        assert_relative_eq!(feature(&built, "pe_ratio", 0), 1720.0 / 50.0);
        assert_relative_eq!(feature(&built, "pb_ratio", 0), 1720.0 / 200.0);
        assert_relative_eq!(feature(&built, "profit_margin", 0), 6.0e10 / 1.3e11);
        assert_relative_eq!(
            feature(&built, "boll_position", 0),
            (1720.0 - 1600.0) / 200.0
        );
    }

    #[test]
    fn growth_deltas_default_to_zero_without_prior_period() {
        let built = FeatureBuilder::default().build(&snapshot(), None).unwrap();
        assert_relative_eq!(feature(&built, "eps_growth", 0), 5.0 / 45.0);
        // prior eps of 0 is treated as "no prior period".
        assert_relative_eq!(feature(&built, "eps_growth", 1), 0.0);
        // negative base: sign-corrected denominator.
        assert_relative_eq!(feature(&built, "eps_growth", 2), (2.0 - -4.0) / 4.0);
        assert_relative_eq!(feature(&built, "revenue_growth", 2), 0.0);
    }

    #[test]
    fn missing_columns_are_defaulted_not_errors() {
        let sparse = df![
            "symbol" => ["A", "B"],
            "close" => [10.0, 20.0],
        ]
        .unwrap();
        let built = FeatureBuilder::default().build(&sparse, None).unwrap();
        assert_eq!(built.height(), 2);
        assert_relative_eq!(feature(&built, "pe_ratio", 0), 0.0);
        assert_relative_eq!(feature(&built, "volatility", 0), 0.0);
        assert_relative_eq!(feature(&built, "volume_ratio", 0), 1.0);
    }

    #[test]
    fn empty_snapshot_is_refused() {
        let empty = df!["symbol" => Vec::<String>::new()].unwrap();
        assert!(matches!(
            FeatureBuilder::default().build(&empty, None),
            Err(FeatureError::EmptySnapshot)
        ));
    }

    #[test]
    fn large_cap_flag_is_strictly_above_the_batch_percentile() {
        let built = FeatureBuilder::default().build(&snapshot(), None).unwrap();
        // Proxy caps are close * 1e9: only the 1720.0 row clears the 70th
        // percentile of [1720.0, 12.4, 9.2].
        assert_relative_eq!(feature(&built, "is_large_cap", 0), 1.0);
        assert_relative_eq!(feature(&built, "is_large_cap", 1), 0.0);
        assert_relative_eq!(feature(&built, "is_large_cap", 2), 0.0);
    }

    #[test]
    fn rolling_windows_from_history() {
        let mut symbols = Vec::new();
        let mut dates = Vec::new();
        let mut pct = Vec::new();
        let mut volume = Vec::new();
        for day in 0..25i32 {
            symbols.push("600519.SH".to_string());
            dates.push(day);
            pct.push(if day % 2 == 0 { 1.0 } else { -1.0 });
            volume.push(10_000.0);
        }
        // Short history for the second symbol: incomplete window.
        for day in 0..5i32 {
            symbols.push("000001.SZ".to_string());
            dates.push(day);
            pct.push(0.5);
            volume.push(50_000.0);
        }
        let history = df![
            "symbol" => symbols,
            "date" => dates,
            "pct_chg" => pct,
            "volume" => volume,
        ]
        .unwrap();

        let built = FeatureBuilder::default()
            .build(&snapshot(), Some(&history))
            .unwrap();

        // Alternating ±1 has sample std sqrt(20/19) over a 20-wide window.
        assert_relative_eq!(
            feature(&built, "volatility", 0),
            (20.0 / 19.0_f64).sqrt(),
            epsilon = 1e-10
        );
        // Snapshot volume 30_000 over a 10_000 mean.
        assert_relative_eq!(feature(&built, "volume_ratio", 0), 3.0, epsilon = 1e-10);
        // Incomplete window: defaults.
        assert_relative_eq!(feature(&built, "volatility", 1), 0.0);
        assert_relative_eq!(feature(&built, "volume_ratio", 1), 1.0);
        // No history at all for the third symbol.
        assert_relative_eq!(feature(&built, "volatility", 2), 0.0);
        assert_relative_eq!(feature(&built, "volume_ratio", 2), 1.0);
    }

    #[test]
    fn output_is_fully_finite() {
        let built = FeatureBuilder::default().build(&snapshot(), None).unwrap();
        for name in MODEL_FEATURES {
            let column = built.column(name).unwrap().f64().unwrap();
            assert_eq!(column.null_count(), 0, "{name} has nulls");
            for value in column.into_no_null_iter() {
                assert!(value.is_finite(), "{name} has non-finite {value}");
            }
        }
    }
}
