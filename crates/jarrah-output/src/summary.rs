//! Human-readable one-screen summaries.

use jarrah_scoring::ScoreResult;
use jarrah_valuation::DcfResult;
use std::fmt;

/// Compact display wrapper for a valuation.
#[derive(Debug, Clone)]
pub struct ValuationSummary<'a>(pub &'a DcfResult);

impl fmt::Display for ValuationSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(
            f,
            "{} @ {}: DCF {:.2} vs price {:.2} ({:+.1}%)",
            r.symbol, r.as_of_date, r.dcf_value, r.current_price, r.upside_pct
        )?;
        writeln!(
            f,
            "  range {:.2}..{:.2}, implied PE {:.1}, discount {:.1}%, terminal growth {:.1}%",
            r.range_low,
            r.range_high,
            r.pe_implied,
            r.discount_rate * 100.0,
            r.terminal_growth_rate * 100.0
        )?;
        write!(
            f,
            "  growth: revenue {:.1}%, profit {:.1}%, ROE {:.1}%",
            r.growth.revenue_growth * 100.0,
            r.growth.profit_growth * 100.0,
            r.growth.roe * 100.0
        )
    }
}

/// Compact display wrapper for a score.
#[derive(Debug, Clone)]
pub struct ScoreSummary<'a>(pub &'a ScoreResult);

impl fmt::Display for ScoreSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(
            f,
            "{} @ {} [{}]: {:.2} -> {}",
            r.symbol, r.as_of_date, r.method, r.score, r.action
        )?;
        if !r.top_factors.is_empty() {
            let names: Vec<&str> = r
                .top_factors
                .iter()
                .take(3)
                .map(|t| t.label.as_str())
                .collect();
            write!(f, " ({})", names.join(", "))?;
        }
        Ok(())
    }
}
