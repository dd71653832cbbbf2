//! # Recipe Keys
//!
//! Recipes arrive from the data source as compact strings:
//!
//! ```text
//! BMP:1xC-2xH=>200xPE        building BMP, inputs 1 C + 2 H, output 200 PE
//! COL=>100xH                 extraction, no inputs
//! REF:1xOIL=>2xFUEL-1xTAR    two outputs (TAR is a byproduct)
//! ```
//!
//! Keys are parsed exactly once, while the catalog snapshot is built. The
//! engine never looks at the string form again.

use crate::catalog::RecipeItem;
use crate::error::{EconomyError, EconomyResult};

/// Separator between the input side and the output side.
const ARROW: &str = "=>";

/// A recipe key broken into its parts.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedRecipeKey {
    /// Building code (e.g. `BMP`).
    pub building: String,
    /// Consumed items, in key order.
    pub inputs: Vec<RecipeItem>,
    /// Produced items, in key order. Never empty.
    pub outputs: Vec<RecipeItem>,
}

/// Parses a recipe key of the form `BUILDING[:inputs]=>outputs`.
///
/// # Errors
///
/// Returns [`EconomyError::RecipeKeyParse`] if the key has no `=>`, an empty
/// building code, no outputs, a malformed `NxTICKER` item, a non-positive
/// quantity, or the same ticker twice on one side.
pub fn parse_recipe_key(key: &str) -> EconomyResult<ParsedRecipeKey> {
    let fail = |reason: &str| EconomyError::RecipeKeyParse {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let (lhs, rhs) = key.trim().split_once(ARROW).ok_or_else(|| fail("missing '=>'"))?;
    if rhs.contains(ARROW) {
        return Err(fail("more than one '=>'"));
    }

    let (building, inputs) = match lhs.split_once(':') {
        Some((building, inputs)) => (building.trim(), inputs),
        None => (lhs.trim(), ""),
    };
    if building.is_empty() {
        return Err(fail("empty building code"));
    }

    let inputs = parse_side(inputs).map_err(|reason| fail(&reason))?;
    let outputs = parse_side(rhs).map_err(|reason| fail(&reason))?;
    if outputs.is_empty() {
        return Err(fail("recipe produces nothing"));
    }

    Ok(ParsedRecipeKey {
        building: building.to_string(),
        inputs,
        outputs,
    })
}

/// Parses a `-` separated list of `NxTICKER` items.
fn parse_side(side: &str) -> Result<Vec<RecipeItem>, String> {
    let mut items: Vec<RecipeItem> = Vec::new();

    for part in side.split('-').map(str::trim).filter(|p| !p.is_empty()) {
        let (amount, ticker) = part
            .split_once('x')
            .ok_or_else(|| format!("item '{part}' is not of the form NxTICKER"))?;

        let quantity: f64 = amount
            .trim()
            .parse()
            .map_err(|_| format!("bad quantity '{amount}' in '{part}'"))?;
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(format!("quantity must be positive in '{part}'"));
        }

        let ticker = ticker.trim();
        if ticker.is_empty() || !ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("bad ticker in '{part}'"));
        }
        if items.iter().any(|item| item.ticker == ticker) {
            return Err(format!("ticker {ticker} listed twice"));
        }

        items.push(RecipeItem::new(ticker, quantity));
    }

    Ok(items)
}
