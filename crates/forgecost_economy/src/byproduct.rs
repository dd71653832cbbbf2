//! # Byproduct Cost Allocation
//!
//! A multi-output recipe has one run cost but several products. The cost is
//! split in proportion to each output's market value (`quantity × ask`).
//! When no output has a market value the cost is split evenly.
//!
//! Invariant: the shares always sum to the run cost.

/// One output of a recipe run, with its market price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricedOutput<'a> {
    /// Output ticker.
    pub ticker: &'a str,
    /// Units produced per run.
    pub quantity: f64,
    /// Ask price per unit (0 when unpriced).
    pub ask: f64,
}

/// The part of a run cost borne by one output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllocatedShare<'a> {
    /// Output ticker.
    pub ticker: &'a str,
    /// Cost attributed to all units of this output in one run.
    pub share: f64,
}

/// Splits `total_run_cost` across `outputs` by market value.
///
/// Shares are returned in output order.
#[must_use]
pub fn allocate<'a>(total_run_cost: f64, outputs: &[PricedOutput<'a>]) -> Vec<AllocatedShare<'a>> {
    if outputs.is_empty() {
        return Vec::new();
    }

    let values: Vec<f64> = outputs
        .iter()
        .map(|output| (output.quantity * output.ask).max(0.0))
        .collect();
    let total_value: f64 = values.iter().sum();

    if total_value > 0.0 {
        outputs
            .iter()
            .zip(&values)
            .map(|(output, value)| AllocatedShare {
                ticker: output.ticker,
                share: total_run_cost * value / total_value,
            })
            .collect()
    } else {
        // No market value available: split evenly
        #[allow(clippy::cast_precision_loss)]
        let equal_share = total_run_cost / outputs.len() as f64;
        outputs
            .iter()
            .map(|output| AllocatedShare {
                ticker: output.ticker,
                share: equal_share,
            })
            .collect()
    }
}

/// Fraction of the run cost borne by `ticker`, or `None` if it is not an output.
#[must_use]
pub fn share_fraction(ticker: &str, outputs: &[PricedOutput<'_>]) -> Option<f64> {
    let shares = allocate(1.0, outputs);
    shares
        .iter()
        .find(|share| share.ticker == ticker)
        .map(|share| share.share)
}
