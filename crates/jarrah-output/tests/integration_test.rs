//! End-to-end: raw records through valuation and scoring into reports.

use chrono::NaiveDate;
use jarrah_core::key::Method;
use jarrah_core::records::{
    FundamentalMetric, FundamentalRecord, FundamentalsHistory, PriceBar, TechnicalSnapshot,
};
use jarrah_core::sector::Sector;
use jarrah_output::{
    Report, ReportBuilder, ScoreSummary, ValuationSummary, score_payload, valuation_payload,
};
use jarrah_scoring::{ScoreInput, ScoringPipeline};
use jarrah_valuation::{DcfProjector, ValuationInput};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn records(symbol: &str, eps: &[f64], revenue: &[f64], roe: f64) -> Vec<FundamentalRecord> {
    let mut out = Vec::new();
    for (i, &value) in eps.iter().enumerate() {
        out.push(FundamentalRecord {
            symbol: symbol.to_string(),
            period: date(2021 + i as i32, 12, 31),
            metric: FundamentalMetric::Eps,
            value,
        });
    }
    for (i, &value) in revenue.iter().enumerate() {
        out.push(FundamentalRecord {
            symbol: symbol.to_string(),
            period: date(2021 + i as i32, 12, 31),
            metric: FundamentalMetric::Revenue,
            value,
        });
    }
    out.push(FundamentalRecord {
        symbol: symbol.to_string(),
        period: date(2023, 12, 31),
        metric: FundamentalMetric::Roe,
        value: roe,
    });
    out
}

fn price(symbol: &str, close: f64) -> PriceBar {
    PriceBar {
        symbol: symbol.to_string(),
        date: date(2024, 6, 28),
        close,
        pct_change: Some(0.8),
        volume: Some(42_000.0),
        turnover: Some(1.0e9),
    }
}

#[test]
fn valuation_flows_into_a_report() {
    let history = FundamentalsHistory::from_records(
        "600519.SH",
        &records(
            "600519.SH",
            &[42.0, 46.0, 50.0],
            &[1.1e11, 1.2e11, 1.3e11],
            0.28,
        ),
    );
    let projector = DcfProjector::default();
    let result = projector.value(&history, Some(&price("600519.SH", 1720.0))).unwrap();

    let report = ReportBuilder::new()
        .symbol(result.symbol.clone())
        .as_of_date(result.as_of_date)
        .method(Method::Dcf)
        .contents(valuation_payload(&result))
        .build()
        .unwrap();

    assert_eq!(report.key(), result.key());
    let json = report.to_json().unwrap();
    assert!(json.contains("sensitivity"));
    assert!(json.contains("projections"));

    let summary = ValuationSummary(&result).to_string();
    assert!(summary.contains("600519.SH"));
    assert!(summary.contains("DCF"));
}

#[test]
fn batch_valuation_and_scoring_produce_matching_keys() {
    let rich = FundamentalsHistory::from_records(
        "600519.SH",
        &records(
            "600519.SH",
            &[42.0, 46.0, 50.0],
            &[1.1e11, 1.2e11, 1.3e11],
            0.28,
        ),
    );
    // Loss-making: valuation refuses, scoring still works.
    let lossy = FundamentalsHistory::from_records(
        "000003.SZ",
        &records("000003.SZ", &[-1.0, -0.5, -0.2], &[5.0e9, 4.8e9, 4.6e9], 0.02),
    );

    let projector = DcfProjector::default();
    let valuations = projector.value_batch(&[
        ValuationInput {
            history: rich.clone(),
            price: Some(price("600519.SH", 1720.0)),
        },
        ValuationInput {
            history: lossy.clone(),
            price: Some(price("000003.SZ", 4.1)),
        },
    ]);
    assert!(valuations[0].result.is_ok());
    assert!(valuations[1].result.is_err());

    let pipeline = ScoringPipeline::default();
    let scores = pipeline.score_batch(
        &[
            ScoreInput {
                history: rich,
                technicals: Some(TechnicalSnapshot {
                    symbol: "600519.SH".to_string(),
                    date: Some(date(2024, 6, 28)),
                    ma5: Some(1700.0),
                    ma10: Some(1690.0),
                    ma20: Some(1680.0),
                    macd: Some(2.0),
                    macd_signal: Some(1.5),
                    macd_hist: Some(0.5),
                    rsi6: Some(58.0),
                    rsi14: Some(55.0),
                    boll_upper: Some(1800.0),
                    boll_mid: Some(1700.0),
                    boll_lower: Some(1600.0),
                }),
                price: Some(price("600519.SH", 1720.0)),
                sector: Some(Sector::ConsumerStaples),
            },
            ScoreInput {
                history: lossy,
                technicals: None,
                price: Some(price("000003.SZ", 4.1)),
                sector: Some(Sector::Industrials),
            },
        ],
        None,
    );
    assert_eq!(scores.len(), 2);

    let valuation = valuations[0].result.as_ref().unwrap();
    let rule = scores[0].rule.as_ref().unwrap();
    // Same symbol and date, distinguished only by method.
    assert_eq!(valuation.symbol, rule.symbol);
    assert_eq!(valuation.as_of_date, rule.as_of_date);
    assert_ne!(valuation.key(), rule.key());

    let loss_rule = scores[1].rule.as_ref().unwrap();
    assert!((0.0..=100.0).contains(&loss_rule.score));

    let payload = score_payload(rule);
    assert_eq!(payload["method"], "RULE");
    let report: Report = ReportBuilder::new()
        .symbol(rule.symbol.clone())
        .as_of_date(rule.as_of_date)
        .method(rule.method)
        .contents(payload)
        .build()
        .unwrap();
    assert_eq!(report.key(), rule.key());

    let summary = ScoreSummary(rule).to_string();
    assert!(summary.contains("[RULE]"));
}
