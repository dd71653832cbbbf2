//! # Efficiency Model
//!
//! Production efficiency is additive:
//!
//! ```text
//! total = base + location_bonus + cogc_bonus + expert_bonus
//! ```
//!
//! - `base`: 1.0 with luxuries, 0.79 essentials only, or a custom percentage
//! - `location_bonus`: `concentration - 1` (extraction), `fertility` (farming), 0 otherwise
//! - `cogc_bonus`: 0.25 when the planetary program is active
//! - `expert_bonus`: fixed table for 0..=5 experts
//!
//! The total is floored at [`EFFICIENCY_FLOOR`] before it is inverted into a
//! cost multiplier. The multiplier scales **workforce consumables only**, never
//! raw input materials.

use serde::{Deserialize, Serialize};

use crate::catalog::RecipeKind;
use crate::error::{EconomyError, EconomyResult};

/// Smallest total efficiency ever used as a divisor.
pub const EFFICIENCY_FLOOR: f64 = 0.01;

/// Base efficiency when luxury consumables are provided.
pub const LUXURY_BASE: f64 = 1.0;

/// Base efficiency with essential consumables only.
pub const ESSENTIAL_BASE: f64 = 0.79;

/// Bonus granted by an active planetary program (COGC).
pub const COGC_BONUS: f64 = 0.25;

/// Maximum number of experts per building category.
pub const MAX_EXPERTS: u8 = 5;

/// Expert bonus by head count.
const EXPERT_BONUS: [f64; 6] = [0.0, 0.0306, 0.0696, 0.1248, 0.1974, 0.2840];

/// Extraction time bounds, hours per base batch.
const MIN_EXTRACTION_HOURS: f64 = 6.0;
const MAX_EXTRACTION_HOURS: f64 = 240.0;

/// Concentrations at or below this are "barely present".
const POOR_CONCENTRATION: f64 = 0.001;

/// Slowdown applied to barely present resources.
const POOR_CONCENTRATION_SLOWDOWN: f64 = 10.0;

/// User-chosen production setup, with location factors already resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyInputs {
    /// Whether luxury consumables are supplied.
    pub luxury_provided: bool,
    /// Custom base efficiency in percent (1..=100). Overrides the luxury toggle.
    pub custom_efficiency_pct: Option<f64>,
    /// Whether the planetary program is active.
    pub cogc_active: bool,
    /// Number of experts (0..=5).
    pub expert_count: u8,
    /// Resolved concentration factor of the target at the chosen location.
    pub concentration: Option<f64>,
    /// Resolved fertility of the chosen location.
    pub fertility: Option<f64>,
}

impl Default for EfficiencyInputs {
    fn default() -> Self {
        Self {
            luxury_provided: true,
            custom_efficiency_pct: None,
            cogc_active: false,
            expert_count: 0,
            concentration: None,
            fertility: None,
        }
    }
}

impl EfficiencyInputs {
    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidEfficiency`] if the expert count is above
    /// [`MAX_EXPERTS`] or the custom percentage is outside 1..=100.
    pub fn validate(&self) -> EconomyResult<()> {
        expert_bonus(self.expert_count)?;
        if let Some(pct) = self.custom_efficiency_pct {
            if !(1.0..=100.0).contains(&pct) {
                return Err(EconomyError::InvalidEfficiency(format!(
                    "custom efficiency {pct}% outside 1..=100"
                )));
            }
        }
        Ok(())
    }

    /// The worker setting alone, without site-specific bonuses.
    ///
    /// Used for upstream recipes, which are not run at the chosen site.
    #[must_use]
    pub fn baseline(&self) -> Self {
        Self {
            luxury_provided: self.luxury_provided,
            custom_efficiency_pct: self.custom_efficiency_pct,
            ..Self::default()
        }
    }

    fn base(&self) -> f64 {
        match self.custom_efficiency_pct {
            Some(pct) => pct / 100.0,
            None if self.luxury_provided => LUXURY_BASE,
            None => ESSENTIAL_BASE,
        }
    }

    fn location_bonus(&self, kind: RecipeKind) -> f64 {
        match kind {
            RecipeKind::Extraction => self.concentration.map_or(0.0, |factor| factor - 1.0),
            RecipeKind::Farming => self.fertility.unwrap_or(0.0),
            RecipeKind::Manufacturing => 0.0,
        }
    }
}

/// Efficiency of one recipe under one setup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    /// Worker base component.
    pub base: f64,
    /// Location component (may be negative).
    pub location_bonus: f64,
    /// Planetary program component.
    pub cogc_bonus: f64,
    /// Expert component.
    pub expert_bonus: f64,
    /// Sum of the components, floored at [`EFFICIENCY_FLOOR`].
    pub total: f64,
    /// `1 / total`; multiplies workforce consumable cost.
    pub cost_multiplier: f64,
    /// Whether the raw sum was below the floor and had to be raised to it.
    pub clamped: bool,
}

/// Bonus for `count` experts.
///
/// # Errors
///
/// Returns [`EconomyError::InvalidEfficiency`] for counts above [`MAX_EXPERTS`].
pub fn expert_bonus(count: u8) -> EconomyResult<f64> {
    EXPERT_BONUS
        .get(usize::from(count))
        .copied()
        .ok_or_else(|| EconomyError::InvalidEfficiency(format!("expert count {count} exceeds {MAX_EXPERTS}")))
}

/// Computes the additive efficiency of a recipe of `kind`.
///
/// A raw sum below [`EFFICIENCY_FLOOR`] is floored and marked `clamped`.
///
/// # Errors
///
/// Returns [`EconomyError::InvalidEfficiency`] if the inputs are out of range.
pub fn compute_efficiency(inputs: &EfficiencyInputs, kind: RecipeKind) -> EconomyResult<Efficiency> {
    inputs.validate()?;

    let base = inputs.base();
    let location_bonus = inputs.location_bonus(kind);
    let cogc_bonus = if inputs.cogc_active { COGC_BONUS } else { 0.0 };
    let expert_bonus = expert_bonus(inputs.expert_count)?;

    let raw = base + location_bonus + cogc_bonus + expert_bonus;
    let total = raw.max(EFFICIENCY_FLOOR);

    Ok(Efficiency {
        base,
        location_bonus,
        cogc_bonus,
        expert_bonus,
        total,
        cost_multiplier: 1.0 / total,
        clamped: raw < EFFICIENCY_FLOOR,
    })
}

/// Hours an extraction batch takes at a location with concentration `factor`.
///
/// `base_hours / factor`, bounded to 6..=240 hours. A factor at or below
/// 0.001 means the resource is barely present: ten times the base time.
#[must_use]
pub fn extraction_hours(base_hours: f64, factor: f64) -> f64 {
    if factor <= POOR_CONCENTRATION {
        return base_hours * POOR_CONCENTRATION_SLOWDOWN;
    }
    (base_hours / factor).clamp(MIN_EXTRACTION_HOURS, MAX_EXTRACTION_HOURS)
}
