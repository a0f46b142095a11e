//! JSON payload builders.
//!
//! Turn result values into the nested mappings an external report writer
//! consumes. The layout is part of the output contract: assumptions, growth,
//! yearly projections, terminal value, and sensitivity rows for valuations;
//! score, action, and ranked factors for scores.

use jarrah_scoring::ScoreResult;
use jarrah_valuation::DcfResult;
use serde_json::{Value, json};

/// Nested payload for one valuation.
pub fn valuation_payload(result: &DcfResult) -> Value {
    json!({
        "symbol": result.symbol,
        "as_of_date": result.as_of_date,
        "method": "DCF",
        "current_price": result.current_price,
        "dcf_value": result.dcf_value,
        "upside_pct": result.upside_pct,
        "valuation_range": {
            "low": result.range_low,
            "high": result.range_high,
        },
        "implied_multiples": {
            "pe": result.pe_implied,
            "pb": result.pb_implied,
        },
        "assumptions": {
            "discount_rate": result.discount_rate,
            "terminal_growth_rate": result.terminal_growth_rate,
            "projection_years": result.projection_years,
        },
        "growth": {
            "revenue_growth": result.growth.revenue_growth,
            "profit_growth": result.growth.profit_growth,
            "roe": result.growth.roe,
        },
        "projections": result.projections.iter().map(|p| json!({
            "year": p.year,
            "projected_eps": p.projected_eps,
            "fcf": p.fcf,
            "pv_fcf": p.pv_fcf,
        })).collect::<Vec<_>>(),
        "terminal": {
            "value": result.terminal_value,
            "present_value": result.pv_terminal_value,
        },
        "enterprise_value": result.enterprise_value,
        "sensitivity": {
            "base_case": {
                "discount_rate": result.sensitivity.base_discount_rate,
                "terminal_growth_rate": result.sensitivity.base_terminal_growth_rate,
            },
            "cells": result.sensitivity.cells.iter().map(|c| json!({
                "discount_rate": c.discount_rate,
                "terminal_growth_rate": c.terminal_growth_rate,
                "dcf_value": c.dcf_value,
                "implied_pe": c.implied_pe,
            })).collect::<Vec<_>>(),
        },
    })
}

/// Nested payload for one score.
pub fn score_payload(result: &ScoreResult) -> Value {
    json!({
        "symbol": result.symbol,
        "as_of_date": result.as_of_date,
        "method": result.method.to_string(),
        "score": result.score,
        "action": result.action.to_string(),
        "model_version": result.model_version,
        "top_factors": result.top_factors.iter().map(|f| json!({
            "name": f.name,
            "label": f.label,
            "reading": f.reading,
            "contribution": f.contribution,
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use jarrah_core::key::Method;
    use jarrah_core::records::{FundamentalMetric, FundamentalRecord, PriceBar};
    use jarrah_scoring::{Action, TopFactor};
    use jarrah_valuation::DcfProjector;

    fn valuation() -> DcfResult {
        let rows = [
            (2022, FundamentalMetric::Eps, 45.0),
            (2023, FundamentalMetric::Eps, 50.0),
            (2022, FundamentalMetric::Revenue, 1.2e11),
            (2023, FundamentalMetric::Revenue, 1.3e11),
            (2023, FundamentalMetric::Roe, 0.28),
            (2023, FundamentalMetric::Bps, 220.0),
        ];
        let records: Vec<FundamentalRecord> = rows
            .iter()
            .map(|&(year, metric, value)| FundamentalRecord {
                symbol: "600519.SH".to_string(),
                period: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
                metric,
                value,
            })
            .collect();
        let history =
            jarrah_core::records::FundamentalsHistory::from_records("600519.SH", &records);
        let price = PriceBar {
            symbol: "600519.SH".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            close: 1720.0,
            pct_change: Some(0.4),
            volume: Some(30_000.0),
            turnover: Some(5.1e9),
        };
        DcfProjector::default().value(&history, Some(&price)).unwrap()
    }

    #[test]
    fn valuation_payload_carries_the_whole_breakdown() {
        let result = valuation();
        let payload = valuation_payload(&result);

        assert_eq!(payload["symbol"], "600519.SH");
        assert_eq!(payload["method"], "DCF");
        assert_eq!(payload["projections"].as_array().unwrap().len(), 5);
        assert_eq!(
            payload["sensitivity"]["cells"].as_array().unwrap().len(),
            result.sensitivity.cells.len()
        );
        assert_eq!(
            payload["assumptions"]["discount_rate"].as_f64().unwrap(),
            0.10
        );
        assert_eq!(
            payload["valuation_range"]["low"].as_f64().unwrap(),
            result.range_low
        );
        // Round-trips through a string without loss of structure.
        let reparsed: serde_json::Value =
            serde_json::from_str(&payload.to_string()).unwrap();
        assert_eq!(reparsed, payload);
    }

    #[test]
    fn score_payload_spells_out_actions_and_factors() {
        let score = ScoreResult {
            symbol: "000001.SZ".to_string(),
            as_of_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            method: Method::RuleScore,
            score: 72.5,
            action: Action::Buy,
            top_factors: vec![TopFactor {
                name: "pe_ratio".to_string(),
                label: "low PE".to_string(),
                reading: 20.0,
                contribution: 10.0,
            }],
            model_version: "rule-v1.0".to_string(),
        };
        let payload = score_payload(&score);
        assert_eq!(payload["method"], "RULE");
        assert_eq!(payload["action"], "buy");
        assert_eq!(payload["top_factors"][0]["label"], "low PE");
        assert_eq!(payload["top_factors"][0]["contribution"], 10.0);
    }
}
