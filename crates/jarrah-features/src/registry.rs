//! Feature catalog.
//!
//! Central list of every derived feature: what it measures, which category
//! it belongs to, and which raw columns it needs. `MODEL_FEATURES` fixes the
//! column order used for model training and inference; the two must never
//! disagree, so both are derived from the same table.

/// Feature categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureCategory {
    /// Price-to-fundamental ratios.
    Valuation,
    /// Period-over-period growth deltas.
    Growth,
    /// Margin and return measures.
    Profitability,
    /// Indicator-derived ratios and oscillator levels.
    Technical,
    /// Realized volatility and volume behavior.
    Volatility,
    /// Batch-relative size classification.
    Market,
}

/// Feature metadata.
#[derive(Debug, Clone)]
pub struct FeatureInfo {
    /// Feature column name (unique identifier).
    pub name: &'static str,
    /// Feature category.
    pub category: FeatureCategory,
    /// What the feature measures.
    pub description: &'static str,
    /// Raw input columns it is derived from.
    pub inputs: &'static [&'static str],
}

/// Model feature columns, in training/inference order.
pub const MODEL_FEATURES: [&str; 20] = [
    "pe_ratio",
    "pb_ratio",
    "ps_ratio",
    "pcf_ratio",
    "roe",
    "eps_growth",
    "revenue_growth",
    "profit_margin",
    "rsi6",
    "rsi14",
    "macd",
    "macd_signal",
    "macd_hist",
    "ma5_ratio",
    "ma10_ratio",
    "ma20_ratio",
    "boll_position",
    "volatility",
    "volume_ratio",
    "is_large_cap",
];

/// Get all available feature info.
pub fn available_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            name: "pe_ratio",
            category: FeatureCategory::Valuation,
            description: "Price to earnings per share (0 when eps is 0)",
            inputs: &["close", "eps"],
        },
        FeatureInfo {
            name: "pb_ratio",
            category: FeatureCategory::Valuation,
            description: "Price to book value per share (0 when bps is 0)",
            inputs: &["close", "bps"],
        },
        FeatureInfo {
            name: "ps_ratio",
            category: FeatureCategory::Valuation,
            description: "Share-scaled price to revenue (0 when revenue is 0)",
            inputs: &["close", "revenue"],
        },
        FeatureInfo {
            name: "pcf_ratio",
            category: FeatureCategory::Valuation,
            description: "Price to operating cash flow per share (0 when ocfps is 0)",
            inputs: &["close", "ocfps"],
        },
        FeatureInfo {
            name: "roe",
            category: FeatureCategory::Profitability,
            description: "Return on equity, passed through from fundamentals",
            inputs: &["roe"],
        },
        FeatureInfo {
            name: "eps_growth",
            category: FeatureCategory::Growth,
            description: "Period-over-period eps change (0 for the first period)",
            inputs: &["eps", "eps_prev"],
        },
        FeatureInfo {
            name: "revenue_growth",
            category: FeatureCategory::Growth,
            description: "Period-over-period revenue change (0 for the first period)",
            inputs: &["revenue", "revenue_prev"],
        },
        FeatureInfo {
            name: "profit_margin",
            category: FeatureCategory::Profitability,
            description: "Net profit over revenue (0 when revenue is 0)",
            inputs: &["net_profit", "revenue"],
        },
        FeatureInfo {
            name: "rsi6",
            category: FeatureCategory::Technical,
            description: "6-day relative strength index",
            inputs: &["rsi6"],
        },
        FeatureInfo {
            name: "rsi14",
            category: FeatureCategory::Technical,
            description: "14-day relative strength index",
            inputs: &["rsi14"],
        },
        FeatureInfo {
            name: "macd",
            category: FeatureCategory::Technical,
            description: "MACD line",
            inputs: &["macd"],
        },
        FeatureInfo {
            name: "macd_signal",
            category: FeatureCategory::Technical,
            description: "MACD signal line",
            inputs: &["macd_signal"],
        },
        FeatureInfo {
            name: "macd_hist",
            category: FeatureCategory::Technical,
            description: "MACD histogram",
            inputs: &["macd_hist"],
        },
        FeatureInfo {
            name: "ma5_ratio",
            category: FeatureCategory::Technical,
            description: "Close over 5-day moving average (1 when the average is 0)",
            inputs: &["close", "ma5"],
        },
        FeatureInfo {
            name: "ma10_ratio",
            category: FeatureCategory::Technical,
            description: "Close over 10-day moving average (1 when the average is 0)",
            inputs: &["close", "ma10"],
        },
        FeatureInfo {
            name: "ma20_ratio",
            category: FeatureCategory::Technical,
            description: "Close over 20-day moving average (1 when the average is 0)",
            inputs: &["close", "ma20"],
        },
        FeatureInfo {
            name: "boll_position",
            category: FeatureCategory::Technical,
            description: "Position inside the Bollinger band (0.5 on zero width)",
            inputs: &["close", "boll_upper", "boll_lower"],
        },
        FeatureInfo {
            name: "volatility",
            category: FeatureCategory::Volatility,
            description: "Rolling 20-period std of percent change (0 when incomplete)",
            inputs: &["pct_chg"],
        },
        FeatureInfo {
            name: "volume_ratio",
            category: FeatureCategory::Volatility,
            description: "Volume over its rolling 20-period mean (1 when the mean is 0)",
            inputs: &["volume"],
        },
        FeatureInfo {
            name: "is_large_cap",
            category: FeatureCategory::Market,
            description: "1 when the market-cap proxy exceeds the batch 70th percentile",
            inputs: &["close"],
        },
    ]
}

/// Get feature info by name.
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    available_features().into_iter().find(|f| f.name == name)
}
