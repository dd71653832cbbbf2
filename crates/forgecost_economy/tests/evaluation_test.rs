//! End-to-end evaluation tests over a small production chain.
//!
//! Chain: H2O and C are bought, GRN is farmed, RAT is cooked from GRN,
//! PE is made from C and H (H is collected), and a refinery turns OIL into
//! FUEL with TAR as a byproduct.

use forgecost_economy::{
    allocate, CatalogBuilder, CatalogSnapshot, Consumable, CostResolver, EconomyError, EfficiencyInputs,
    EvaluationRequest, MarketQuote, PriceBasis, PricedOutput, ProfitabilityEngine, Recipe, RecipeKind,
    WorkforceNeeds,
};

const EX: &str = "AI1";

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn create_chain() -> CatalogSnapshot {
    let mut builder = CatalogBuilder::new();

    builder
        .add_recipe(
            Recipe::from_key("FRM:4xH2O=>12xGRN")
                .unwrap()
                .with_duration(72.0)
                .with_workforce("PIONEER", 50.0),
        )
        .unwrap();
    builder
        .add_recipe(
            Recipe::from_key("FP:1xGRN-1xH2O=>10xRAT")
                .unwrap()
                .with_duration(6.0)
                .with_workforce("PIONEER", 40.0),
        )
        .unwrap();
    builder
        .add_recipe(Recipe::from_key("COL=>20xH").unwrap().with_duration(24.0))
        .unwrap();
    builder
        .add_recipe(Recipe::from_key("BMP:1xC-2xH=>200xPE").unwrap().with_duration(6.0))
        .unwrap();
    builder
        .add_recipe(Recipe::from_key("REF:10xOIL=>8xFUEL-2xTAR").unwrap().with_duration(12.0))
        .unwrap();

    builder
        .add_workforce_needs(
            "PIONEER",
            WorkforceNeeds {
                necessary: vec![Consumable::new("DW", 0.004), Consumable::new("RAT", 0.004)],
                luxury: vec![Consumable::new("COF", 0.0005)],
            },
        )
        .unwrap();

    for (ticker, ask, bid) in [
        ("H2O", 30.0, 25.0),
        ("C", 120.0, 100.0),
        ("DW", 80.0, 70.0),
        ("RAT", 90.0, 80.0),
        ("COF", 900.0, 800.0),
        ("GRN", 60.0, 50.0),
        ("PE", 25.0, 22.0),
        ("OIL", 10.0, 9.0),
        ("FUEL", 30.0, 28.0),
        ("TAR", 30.0, 20.0),
    ] {
        builder
            .add_quote(ticker, EX, MarketQuote::new(ask, bid).with_depth(1000.0, 800.0))
            .unwrap();
    }
    builder.add_quote("RAT", "CI1", MarketQuote::new(70.0, 60.0)).unwrap();
    builder.add_quote("RAT", "NC1", MarketQuote::new(110.0, 100.0)).unwrap();

    builder.add_fertility("Promitor", 0.2).unwrap();
    builder.add_concentration("Montem", "H", 0.5).unwrap();
    builder.build()
}

#[test]
fn test_full_evaluation_record() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let evaluation = engine.evaluate(&EvaluationRequest::new("PE", EX)).unwrap();

    assert_eq!(evaluation.recipe_id.as_deref(), Some("BMP:1xC-2xH=>200xPE"));
    // H is collected for free, C costs 120 at ask and 100 at bid
    assert!(close(evaluation.cost_ask.unit_total_cost, 120.0 / 200.0));
    assert!(close(evaluation.cost_bid.unit_total_cost, 100.0 / 200.0));
    assert_eq!(evaluation.scenarios.len(), 4);
    assert!(evaluation.diagnostics.is_complete());

    let sell_ask = evaluation.scenario(PriceBasis::Ask, PriceBasis::Ask).unwrap();
    assert!(close(sell_ask.profit, 25.0 - 0.6));
}

#[test]
fn test_evaluation_is_bit_identical_on_repeat() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let request = EvaluationRequest::new("RAT", EX).at_location("Promitor");

    let first = engine.evaluate(&request).unwrap();
    let second = engine.evaluate(&request).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.cost_ask.unit_total_cost.to_bits(),
        second.cost_ask.unit_total_cost.to_bits()
    );
}

#[test]
fn test_consumables_priced_from_market() {
    // Pioneers eat RAT and also produce it; their rations are bought, not resolved
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let evaluation = engine.evaluate(&EvaluationRequest::new("RAT", EX)).unwrap();

    assert!(evaluation.cost_ask.unit_total_cost.is_finite());
    assert!(evaluation.cost_ask.unit_total_cost > 0.0);
    assert!(evaluation.cost_ask.unit_workforce_cost > 0.0);
}

#[test]
fn test_fertility_only_affects_site_recipe() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);

    let plain = engine.evaluate(&EvaluationRequest::new("GRN", EX)).unwrap();
    let fertile = engine
        .evaluate(&EvaluationRequest::new("GRN", EX).at_location("Promitor"))
        .unwrap();

    // Input cost is never scaled by efficiency
    assert!(close(plain.cost_ask.unit_input_cost, fertile.cost_ask.unit_input_cost));
    assert!(fertile.cost_ask.unit_workforce_cost < plain.cost_ask.unit_workforce_cost);
    assert!(close(
        plain.cost_ask.unit_workforce_cost / fertile.cost_ask.unit_workforce_cost,
        1.2
    ));
    assert!(close(fertile.efficiency.unwrap().total, 1.2));
}

#[test]
fn test_essential_only_base_efficiency() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let essential = EfficiencyInputs {
        luxury_provided: false,
        ..EfficiencyInputs::default()
    };

    let evaluation = engine
        .evaluate(&EvaluationRequest::new("GRN", EX).with_efficiency(essential))
        .unwrap();
    assert!(close(evaluation.efficiency.unwrap().total, 0.79));
}

#[test]
fn test_explicit_and_auto_agree_for_single_recipe() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);

    for (ticker, recipe) in [("PE", "BMP:1xC-2xH=>200xPE"), ("GRN", "FRM:4xH2O=>12xGRN")] {
        let auto = engine.evaluate(&EvaluationRequest::new(ticker, EX)).unwrap();
        let explicit = engine
            .evaluate(&EvaluationRequest::new(ticker, EX).with_recipe(recipe))
            .unwrap();
        assert_eq!(auto, explicit);
    }
}

#[test]
fn test_byproduct_costs_cover_run_cost() {
    let catalog = create_chain();
    let mut resolver = CostResolver::new(&catalog, EX, PriceBasis::Ask, &EfficiencyInputs::default()).unwrap();
    let recipe = catalog.recipe("REF:10xOIL=>8xFUEL-2xTAR").unwrap();

    let fuel = resolver.cost_at_site(recipe, "FUEL").unwrap();
    let tar = resolver.cost_at_site(recipe, "TAR").unwrap();

    // Value: FUEL 240, TAR 60; run cost 100
    assert_eq!(fuel.allocated_share, Some(0.8));
    assert!(close(fuel.unit_total_cost * 8.0 + tar.unit_total_cost * 2.0, 100.0));

    let outputs = [
        PricedOutput { ticker: "FUEL", quantity: 8.0, ask: 30.0 },
        PricedOutput { ticker: "TAR", quantity: 2.0, ask: 30.0 },
    ];
    let shares = allocate(100.0, &outputs);
    assert!(close(shares[0].share, fuel.unit_total_cost * 8.0));
}

#[test]
fn test_extraction_time_reported() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let evaluation = engine
        .evaluate(&EvaluationRequest::new("H", EX).at_location("Montem"))
        .unwrap();
    assert_eq!(
        catalog.recipe("COL=>20xH").map(|recipe| recipe.kind),
        Some(RecipeKind::Extraction)
    );
    assert_eq!(evaluation.extraction_hours, Some(48.0));
    // H itself has no quote on AI1
    assert!(!evaluation.diagnostics.is_complete());
}

#[test]
fn test_arbitrage_ranking_through_engine() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let opportunities = engine.arbitrage("RAT").unwrap();

    assert!(!opportunities.is_empty());
    assert_eq!(opportunities[0].buy_exchange, "CI1");
    assert_eq!(opportunities[0].sell_exchange, "NC1");
    for window in opportunities.windows(2) {
        assert!(window[0].profit_pct >= window[1].profit_pct);
    }
    for opportunity in &opportunities {
        assert_ne!(opportunity.buy_exchange, opportunity.sell_exchange);
        assert!(opportunity.profit_pct > 5.0);
    }
}

#[test]
fn test_unknown_recipe_is_typed_error() {
    let catalog = create_chain();
    let engine = ProfitabilityEngine::new(&catalog);
    let err = engine
        .evaluate(&EvaluationRequest::new("PE", EX).with_recipe("BMP:9xC=>1xPE"))
        .unwrap_err();
    assert_eq!(
        err,
        EconomyError::RecipeNotFound {
            recipe_id: "BMP:9xC=>1xPE".to_string(),
            ticker: "PE".to_string(),
            exchange: EX.to_string(),
        }
    );
}
