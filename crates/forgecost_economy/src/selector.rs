//! # Recipe Selector
//!
//! Picks the recipe a target material is produced with. An explicit recipe
//! id is honoured as long as it really makes the ticker on that exchange;
//! otherwise every available recipe is costed on the ask basis and the
//! cheapest one wins. Equal costs keep the recipe listed first.

use crate::catalog::{CatalogSnapshot, PriceBasis, Recipe};
use crate::cost::{CostResolver, CostResult, Diagnostics, ResolverConfig};
use crate::efficiency::EfficiencyInputs;
use crate::error::{EconomyError, EconomyResult};

/// A chosen recipe together with its ask-basis cost at the production site.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection<'a> {
    /// The recipe.
    pub recipe: &'a Recipe,
    /// Ask-basis unit cost of the target.
    pub cost: CostResult,
    /// Diagnostics of the chosen recipe only.
    pub diagnostics: Diagnostics,
}

/// Chooses the recipe for `ticker` on `exchange`.
///
/// Returns `Ok(None)` when no recipe produces the ticker there and none was
/// requested; the material is then only obtainable from the market.
///
/// # Errors
///
/// Returns [`EconomyError::RecipeNotFound`] if `explicit` names a recipe that
/// does not exist, does not produce `ticker`, or is not offered on
/// `exchange`. Returns [`EconomyError::InvalidEfficiency`] for bad `site`
/// inputs.
pub fn select_recipe<'a>(
    snapshot: &'a CatalogSnapshot,
    ticker: &str,
    exchange: &'a str,
    explicit: Option<&str>,
    site: &EfficiencyInputs,
    config: ResolverConfig,
) -> EconomyResult<Option<Selection<'a>>> {
    let mut resolver = CostResolver::new(snapshot, exchange, PriceBasis::Ask, site)?.with_config(config);

    if let Some(recipe_id) = explicit {
        let not_found = || EconomyError::RecipeNotFound {
            recipe_id: recipe_id.to_string(),
            ticker: ticker.to_string(),
            exchange: exchange.to_string(),
        };
        let recipe = snapshot
            .recipe(recipe_id)
            .filter(|recipe| recipe.is_available_on(exchange))
            .ok_or_else(not_found)?;
        let cost = resolver.cost_at_site(recipe, ticker).ok_or_else(not_found)?;

        return Ok(Some(Selection {
            recipe,
            cost,
            diagnostics: resolver.into_diagnostics(),
        }));
    }

    let mut best: Option<Selection<'a>> = None;
    for recipe in snapshot.producers_of(ticker, exchange) {
        let Some(cost) = resolver.cost_at_site(recipe, ticker) else {
            continue;
        };
        let diagnostics = resolver.take_diagnostics();
        tracing::debug!(recipe = %recipe.id, unit_cost = cost.unit_total_cost, "candidate recipe");

        let cheaper = match &best {
            Some(current) => cost.unit_total_cost < current.cost.unit_total_cost,
            None => true,
        };
        if cheaper {
            best = Some(Selection {
                recipe,
                cost,
                diagnostics,
            });
        }
    }

    if let Some(selection) = &best {
        tracing::debug!(ticker, exchange, recipe = %selection.recipe.id, "selected cheapest recipe");
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, MarketQuote};

    const EX: &str = "NC1";

    fn create_alternatives_catalog() -> CatalogSnapshot {
        let mut builder = CatalogBuilder::new();
        builder.add_recipe(Recipe::from_key("SME:4xORE=>1xMET").unwrap()).unwrap();
        builder.add_recipe(Recipe::from_key("FUR:2xORE-1xFLX=>1xMET").unwrap()).unwrap();
        builder
            .add_recipe(Recipe::from_key("ADV:1xORE=>1xMET").unwrap().with_exchanges(["CI1"]))
            .unwrap();
        builder.add_quote("ORE", EX, MarketQuote::new(10.0, 8.0)).unwrap();
        builder.add_quote("FLX", EX, MarketQuote::new(5.0, 4.0)).unwrap();
        builder.add_quote("ORE", "CI1", MarketQuote::new(10.0, 8.0)).unwrap();
        builder.build()
    }

    fn select<'a>(
        catalog: &'a CatalogSnapshot,
        ticker: &str,
        exchange: &'a str,
        explicit: Option<&str>,
    ) -> EconomyResult<Option<Selection<'a>>> {
        select_recipe(
            catalog,
            ticker,
            exchange,
            explicit,
            &EfficiencyInputs::default(),
            ResolverConfig::default(),
        )
    }

    #[test]
    fn test_auto_selects_cheapest() {
        let catalog = create_alternatives_catalog();
        let selection = select(&catalog, "MET", EX, None).unwrap().unwrap();
        // SME: 40, FUR: 25, ADV not offered on NC1
        assert_eq!(selection.recipe.id, "FUR:2xORE-1xFLX=>1xMET");
        assert!((selection.cost.unit_total_cost - 25.0).abs() < 1e-9);

        let selection = select(&catalog, "MET", "CI1", None).unwrap().unwrap();
        assert_eq!(selection.recipe.id, "ADV:1xORE=>1xMET");
    }

    #[test]
    fn test_rejected_candidate_does_not_mark_result_incomplete() {
        let mut builder = CatalogBuilder::new();
        builder.add_recipe(Recipe::from_key("A:1xX=>1xOUT").unwrap()).unwrap();
        builder.add_recipe(Recipe::from_key("B:100xY-1xZ=>1xOUT").unwrap()).unwrap();
        builder.add_quote("X", EX, MarketQuote::new(10.0, 9.0)).unwrap();
        builder.add_quote("Y", EX, MarketQuote::new(5.0, 4.0)).unwrap();
        let catalog = builder.build();

        let selection = select(&catalog, "OUT", EX, None).unwrap().unwrap();
        assert_eq!(selection.recipe.id, "A:1xX=>1xOUT");
        assert!((selection.cost.unit_total_cost - 10.0).abs() < 1e-9);
        assert!(selection.diagnostics.is_complete());

        // Asking for B explicitly reports what B is missing
        let explicit = select(&catalog, "OUT", EX, Some("B:100xY-1xZ=>1xOUT")).unwrap().unwrap();
        assert!(explicit.diagnostics.missing_prices.contains("Z"));
    }

    #[test]
    fn test_tie_keeps_first_listed() {
        let mut builder = CatalogBuilder::new();
        builder.add_recipe(Recipe::from_key("B1:2xX=>1xY").unwrap()).unwrap();
        builder.add_recipe(Recipe::from_key("B2:4xX=>2xY").unwrap()).unwrap();
        builder.add_quote("X", EX, MarketQuote::new(3.0, 3.0)).unwrap();
        let catalog = builder.build();

        let selection = select(&catalog, "Y", EX, None).unwrap().unwrap();
        assert_eq!(selection.recipe.id, "B1:2xX=>1xY");
    }

    #[test]
    fn test_explicit_selection() {
        let catalog = create_alternatives_catalog();
        let selection = select(&catalog, "MET", EX, Some("SME:4xORE=>1xMET")).unwrap().unwrap();
        assert_eq!(selection.recipe.id, "SME:4xORE=>1xMET");
        assert!((selection.cost.unit_total_cost - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_selection_not_found() {
        let catalog = create_alternatives_catalog();

        // Unknown id
        let err = select(&catalog, "MET", EX, Some("NOPE=>1xMET")).unwrap_err();
        assert!(matches!(err, EconomyError::RecipeNotFound { .. }));

        // Exists but not on this exchange
        let err = select(&catalog, "MET", EX, Some("ADV:1xORE=>1xMET")).unwrap_err();
        assert!(err.is_invalid_selection());

        // Exists but makes something else
        let err = select(&catalog, "ORE", EX, Some("SME:4xORE=>1xMET")).unwrap_err();
        assert!(matches!(err, EconomyError::RecipeNotFound { .. }));
    }

    #[test]
    fn test_no_recipe_is_not_an_error() {
        let catalog = create_alternatives_catalog();
        assert!(select(&catalog, "ORE", EX, None).unwrap().is_none());
    }

    #[test]
    fn test_explicit_agrees_with_auto_for_single_recipe() {
        let catalog = create_alternatives_catalog();
        let auto = select(&catalog, "MET", "CI1", None).unwrap().unwrap();
        let explicit = select(&catalog, "MET", "CI1", Some(&auto.recipe.id)).unwrap().unwrap();
        assert_eq!(auto, explicit);
    }
}
