//! # Produce or Buy
//!
//! Whether making a material beats buying it, once the overheads a cost
//! breakdown leaves out are added back:
//!
//! - **Infrastructure**: building upkeep, a tier-dependent share of the
//!   input cost.
//! - **Time**: capital tied up while a batch runs, 10% of the input cost per
//!   day of production.
//!
//! Production time is a tier estimate stretched for recipes with many
//! inputs. Workforce upkeep is already part of the unit cost and is not
//! estimated again.

use serde::{Deserialize, Serialize};

/// Lowest confidence reported.
const MIN_CONFIDENCE: u8 = 20;

/// Highest confidence reported.
const MAX_CONFIDENCE: u8 = 95;

/// Share of the input cost charged per day a batch is running.
const DAILY_CAPITAL_RATE: f64 = 0.1;

/// Buy or make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Producing clears the required margin.
    Produce,
    /// The market is cheaper or the margin too thin.
    Buy,
}

/// What goes into a produce-or-buy decision.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SourcingInputs {
    /// Input materials per unit.
    pub unit_input_cost: f64,
    /// Inputs plus workforce per unit.
    pub unit_total_cost: f64,
    /// Price the material would be bought at.
    pub market_price: f64,
    /// Units on offer.
    pub supply: f64,
    /// Units wanted.
    pub demand: f64,
    /// Material tier.
    pub tier: u8,
    /// Distinct recipe inputs.
    pub input_count: usize,
}

/// Produce-or-buy recommendation with the overheads behind it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourcingAdvice {
    /// What to do.
    pub recommendation: Recommendation,
    /// How sure, 20..=95.
    pub confidence: u8,
    /// Unit cost including overheads.
    pub production_cost: f64,
    /// Estimated hours per batch.
    pub production_hours: f64,
    /// Building upkeep per unit.
    pub infrastructure_cost: f64,
    /// Capital cost of the batch time per unit.
    pub time_cost: f64,
    /// Units needed to recover a tier-scaled setup cost. 0 when producing
    /// never pays.
    pub break_even_quantity: u32,
}

impl SourcingAdvice {
    /// Weighs producing against buying.
    ///
    /// Producing must beat the market by a margin of 15% plus 5% per tier.
    /// A unit cost of 0 leaves nothing to compare and always means buy.
    #[must_use]
    pub fn assess(inputs: &SourcingInputs) -> Self {
        let tier = inputs.tier;
        let production_hours = batch_hours(tier) * complexity_factor(inputs.input_count);
        let infrastructure_cost = if tier > 0 {
            inputs.unit_input_cost * (infrastructure_multiplier(tier) - 1.0)
        } else {
            0.0
        };
        let time_cost = production_hours / 24.0 * inputs.unit_input_cost * DAILY_CAPITAL_RATE;
        let production_cost = inputs.unit_total_cost + infrastructure_cost + time_cost;

        let market = inputs.market_price;
        let competition = if inputs.supply > 0.0 {
            (inputs.supply / 100.0).min(2.0)
        } else {
            0.0
        };
        let demand_strength = if inputs.demand > 0.0 {
            (inputs.demand / 50.0).min(3.0)
        } else {
            0.0
        };
        let threshold = production_cost * (1.0 + required_margin(tier));

        let (recommendation, confidence) = if production_cost <= 0.0 {
            (Recommendation::Buy, u32::from(MAX_CONFIDENCE))
        } else if market < production_cost * 0.8 {
            (Recommendation::Buy, 90)
        } else if market <= threshold {
            (Recommendation::Buy, 75 + whole(demand_strength * 5.0).min(15))
        } else {
            let roi_pct = (market - production_cost) / production_cost * 100.0;
            let (recommendation, mut confidence) = if roi_pct > 30.0 {
                (Recommendation::Produce, 85)
            } else if roi_pct > 15.0 {
                (Recommendation::Produce, 70)
            } else {
                (Recommendation::Buy, 60)
            };
            if demand_strength > 1.5 {
                confidence += 10;
            }
            if competition < 0.5 {
                confidence += 10;
            }
            if tier >= 4 && inputs.supply < 50.0 {
                confidence += 5;
            }
            (recommendation, confidence)
        };

        let break_even_quantity = if production_cost > 0.0 && market > production_cost {
            let setup_cost = 1000.0 + 500.0 * f64::from(tier);
            whole(setup_cost / (market - production_cost)).max(1)
        } else {
            0
        };

        Self {
            recommendation,
            confidence: u8::try_from(confidence.clamp(MIN_CONFIDENCE.into(), MAX_CONFIDENCE.into()))
                .unwrap_or(MAX_CONFIDENCE),
            production_cost,
            production_hours,
            infrastructure_cost,
            time_cost,
            break_even_quantity,
        }
    }
}

/// Hours per batch by tier, doubling from half an hour.
fn batch_hours(tier: u8) -> f64 {
    match tier {
        0 => 0.5,
        1 => 1.0,
        2 => 2.0,
        3 => 4.0,
        4 => 8.0,
        5 => 16.0,
        _ => f64::from(tier) * 2.0,
    }
}

fn complexity_factor(input_count: usize) -> f64 {
    if input_count > 5 {
        1.5
    } else if input_count > 3 {
        1.2
    } else {
        1.0
    }
}

fn infrastructure_multiplier(tier: u8) -> f64 {
    match tier {
        0 => 1.0,
        1 => 1.02,
        2 => 1.08,
        3 => 1.15,
        4 => 1.25,
        5 => 1.35,
        _ => 1.0 + f64::from(tier) * 0.05,
    }
}

fn required_margin(tier: u8) -> f64 {
    0.15 + f64::from(tier) * 0.05
}

/// Whole part of a non-negative `value`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole(value: f64) -> u32 {
    value.max(0.0).floor() as u32
}
