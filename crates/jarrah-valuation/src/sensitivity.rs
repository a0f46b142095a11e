//! Sensitivity analysis over discount-rate / terminal-growth pairs.
//!
//! Recomputes the DCF enterprise-value formula over the cross product of a
//! fixed discount-rate set and terminal-growth set. Pairs where the Gordon
//! formula is undefined (discount rate not strictly above terminal growth)
//! are omitted from the matrix, not zero-filled. Growth assumptions are
//! computed once per instrument and shared across every cell.

use crate::dcf::{DcfConfig, project_cash_flows};
use crate::growth::GrowthEstimate;
use serde::{Deserialize, Serialize};

/// The rate grid to sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Discount rates to test.
    pub discount_rates: Vec<f64>,
    /// Terminal growth rates to test.
    pub terminal_growth_rates: Vec<f64>,
}

impl Default for SensitivityGrid {
    fn default() -> Self {
        Self {
            discount_rates: vec![0.08, 0.10, 0.12, 0.15],
            terminal_growth_rates: vec![0.02, 0.03, 0.04, 0.05],
        }
    }
}

impl SensitivityGrid {
    /// Full cross product of the grid, validity not yet applied.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.discount_rates.iter().flat_map(move |&dr| {
            self.terminal_growth_rates.iter().map(move |&tgr| (dr, tgr))
        })
    }
}

/// Whether a (discount rate, terminal growth) pair yields a defined,
/// convergent Gordon terminal value.
pub fn is_valid_pair(discount_rate: f64, terminal_growth_rate: f64) -> bool {
    discount_rate > terminal_growth_rate
}

/// One retained cell of the sensitivity matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCell {
    /// Discount rate for this cell.
    pub discount_rate: f64,
    /// Terminal growth rate for this cell.
    pub terminal_growth_rate: f64,
    /// Per-share DCF value under this cell's rates.
    pub dcf_value: f64,
    /// Implied price-to-earnings multiple at this cell's value.
    pub implied_pe: f64,
}

/// The sensitivity matrix alongside the base-case assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMatrix {
    /// Retained (valid) cells, discount-rate major.
    pub cells: Vec<SensitivityCell>,
    /// Base-case discount rate for comparison.
    pub base_discount_rate: f64,
    /// Base-case terminal growth rate for comparison.
    pub base_terminal_growth_rate: f64,
}

/// Sweeps the DCF formula over a rate grid.
#[derive(Debug, Default)]
pub struct SensitivityAnalyzer {
    grid: SensitivityGrid,
}

impl SensitivityAnalyzer {
    /// Create an analyzer over the given grid.
    pub const fn new(grid: SensitivityGrid) -> Self {
        Self { grid }
    }

    /// The grid being swept.
    pub const fn grid(&self) -> &SensitivityGrid {
        &self.grid
    }

    /// Recompute the enterprise-value formula for every valid grid pair.
    ///
    /// `eps` must already have passed the projector's positivity check;
    /// `growth` is the instrument's single growth estimate, shared across
    /// cells rather than recomputed.
    pub fn analyze(
        &self,
        eps: f64,
        growth: &GrowthEstimate,
        config: &DcfConfig,
    ) -> SensitivityMatrix {
        let cells = self
            .grid
            .pairs()
            .filter(|&(dr, tgr)| is_valid_pair(dr, tgr))
            .map(|(dr, tgr)| {
                let projection = project_cash_flows(
                    eps,
                    growth.profit_growth,
                    dr,
                    tgr,
                    config.projection_years,
                    config.fcf_conversion,
                );
                let dcf_value = config.per_share_value(projection.enterprise_value);
                SensitivityCell {
                    discount_rate: dr,
                    terminal_growth_rate: tgr,
                    dcf_value,
                    implied_pe: dcf_value / eps,
                }
            })
            .collect();

        SensitivityMatrix {
            cells,
            base_discount_rate: config.discount_rate,
            base_terminal_growth_rate: config.terminal_growth_rate,
        }
    }
}
