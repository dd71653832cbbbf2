//! # Scenario Evaluator
//!
//! Profitability under the four price-basis combinations: selling at ask or
//! bid, with inputs bought at ask or bid. All four are always reported,
//! losing ones included.
//!
//! ```text
//! profit    = sell_price - unit_cost
//! roi_pct   = profit / unit_cost × 100        (0 when unit_cost ≤ 0)
//! breakeven = unit_cost / profit              (undefined when profit = 0)
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::PriceBasis;

/// Order in which scenarios are produced: `(sell, cost)`.
const COMBINATIONS: [(PriceBasis, PriceBasis); 4] = [
    (PriceBasis::Ask, PriceBasis::Ask),
    (PriceBasis::Ask, PriceBasis::Bid),
    (PriceBasis::Bid, PriceBasis::Ask),
    (PriceBasis::Bid, PriceBasis::Bid),
];

/// One price-basis combination.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Side of the book the output is sold on.
    pub sell_basis: PriceBasis,
    /// Side of the book inputs are bought on.
    pub cost_basis: PriceBasis,
    /// Sale price per unit.
    pub sell_price: f64,
    /// Production cost per unit.
    pub unit_cost: f64,
    /// Profit per unit.
    pub profit: f64,
    /// Return on cost, in percent.
    pub roi_pct: f64,
    /// Units needed to recover one unit of cost. `None` when profit is zero.
    pub breakeven: Option<f64>,
}

impl Scenario {
    /// Computes one scenario.
    #[must_use]
    pub fn new(sell_basis: PriceBasis, cost_basis: PriceBasis, sell_price: f64, unit_cost: f64) -> Self {
        let profit = sell_price - unit_cost;
        let roi_pct = if unit_cost > 0.0 {
            profit / unit_cost * 100.0
        } else {
            0.0
        };
        #[allow(clippy::float_cmp)]
        let breakeven = if profit == 0.0 {
            None
        } else {
            Some(unit_cost / profit)
        };

        Self {
            sell_basis,
            cost_basis,
            sell_price,
            unit_cost,
            profit,
            roi_pct,
            breakeven,
        }
    }

    /// Whether this scenario makes money.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.profit > 0.0
    }
}

/// Evaluates all four scenarios.
///
/// Scenarios come back in the order (ask, ask), (ask, bid), (bid, ask),
/// (bid, bid) as `(sell, cost)`.
#[must_use]
pub fn evaluate(cost_ask: f64, cost_bid: f64, ask: f64, bid: f64) -> [Scenario; 4] {
    COMBINATIONS.map(|(sell_basis, cost_basis)| {
        let sell_price = match sell_basis {
            PriceBasis::Ask => ask,
            PriceBasis::Bid => bid,
        };
        let unit_cost = match cost_basis {
            PriceBasis::Ask => cost_ask,
            PriceBasis::Bid => cost_bid,
        };
        Scenario::new(sell_basis, cost_basis, sell_price, unit_cost)
    })
}

/// Finds the scenario for a `(sell, cost)` combination.
#[must_use]
pub fn find(scenarios: &[Scenario], sell_basis: PriceBasis, cost_basis: PriceBasis) -> Option<&Scenario> {
    scenarios
        .iter()
        .find(|s| s.sell_basis == sell_basis && s.cost_basis == cost_basis)
}
