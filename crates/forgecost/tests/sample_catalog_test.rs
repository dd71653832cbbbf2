//! Loads the shipped sample catalog and configuration and runs the engine
//! over them the same way the command line does.

use std::path::PathBuf;

use forgecost::report::{render_arbitrage, render_evaluation};
use forgecost::{load_catalog, CatalogSummary, ForgecostConfig};
use forgecost_economy::{CatalogSnapshot, EfficiencyInputs, EvaluationRequest, PriceBasis};

fn workspace_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
}

fn sample() -> CatalogSnapshot {
    load_catalog(workspace_file("data/catalog.toml")).unwrap()
}

#[test]
fn test_sample_catalog_loads() {
    let summary = CatalogSummary::of(&sample());
    assert_eq!(summary.materials, 11);
    assert_eq!(summary.recipes, 13);
    assert_eq!(summary.exchanges, vec!["AI1", "CI1", "IC1", "NC1"]);
    // PE -> PG -> PE through the recycler
    assert!(summary.cycle.is_some());
}

#[test]
fn test_sample_config_points_at_sample_catalog() {
    let config = ForgecostConfig::from_file(workspace_file("forgecost.toml")).unwrap();
    assert_eq!(config.engine.max_depth, 64);
    assert_eq!(config.catalog.path, Some(PathBuf::from("data/catalog.toml")));
}

#[test]
fn test_configured_catalog_found_from_any_directory() {
    let config_file = workspace_file("forgecost.toml");
    let config = ForgecostConfig::from_file(&config_file).unwrap();
    let catalog_path = config.catalog_path(Some(&config_file)).unwrap();
    assert_eq!(catalog_path, workspace_file("data/catalog.toml"));
    assert_eq!(CatalogSummary::of(&load_catalog(catalog_path).unwrap()).recipes, 13);
}

#[test]
fn test_polyethylene_on_ai1() {
    let catalog = sample();
    let config = ForgecostConfig::default();
    let evaluation = config
        .engine(&catalog)
        .evaluate(&EvaluationRequest::new("PE", "AI1"))
        .unwrap();

    // Recycler is not offered on AI1
    assert_eq!(evaluation.recipe_id.as_deref(), Some("BMP:1xC-2xH=>200xPE"));
    assert!(evaluation.diagnostics.missing_prices.is_empty());
    assert!(evaluation.cost_ask.unit_total_cost > 0.0);
    assert!(evaluation.cost_ask.unit_total_cost.is_finite());

    assert_eq!(evaluation.name.as_deref(), Some("Polyethylene"));
    assert!(evaluation.produce_vs_buy.is_some());

    let text = render_evaluation(&evaluation).unwrap();
    assert!(text.contains("recipe_id = \"BMP:1xC-2xH=>200xPE\""));
}

#[test]
fn test_rations_pick_the_cheaper_recipe() {
    let catalog = sample();
    let engine = ForgecostConfig::default().engine(&catalog);

    let auto = engine.evaluate(&EvaluationRequest::new("RAT", "AI1")).unwrap();
    for recipe in ["FP:1xGRN-1xBEA=>10xRAT", "FP:3xHCP-1xBEA=>8xRAT"] {
        let explicit = engine
            .evaluate(&EvaluationRequest::new("RAT", "AI1").with_recipe(recipe))
            .unwrap();
        assert!(auto.cost_ask.unit_total_cost <= explicit.cost_ask.unit_total_cost);
    }

    let scenario = auto.scenario(PriceBasis::Ask, PriceBasis::Ask).unwrap();
    assert!((scenario.sell_price - 115.0).abs() < f64::EPSILON);
}

#[test]
fn test_hydrogen_extraction_at_montem() {
    let catalog = sample();
    let request = EvaluationRequest::new("H", "AI1")
        .at_location("Montem")
        .with_efficiency(EfficiencyInputs {
            expert_count: 2,
            ..EfficiencyInputs::default()
        });
    let evaluation = ForgecostConfig::default().engine(&catalog).evaluate(&request).unwrap();

    assert_eq!(evaluation.recipe_id.as_deref(), Some("COL=>20xH"));
    let hours = evaluation.extraction_hours.unwrap();
    assert!((hours - 7.5).abs() < 1e-9);
}

#[test]
fn test_rations_arbitrage_ranking() {
    let catalog = sample();
    let opportunities = ForgecostConfig::default().engine(&catalog).arbitrage("RAT").unwrap();

    let pairs: Vec<(&str, &str)> = opportunities
        .iter()
        .map(|o| (o.buy_exchange.as_str(), o.sell_exchange.as_str()))
        .collect();
    // IC1 has no sellers so it only shows up on the sell side
    assert_eq!(pairs, vec![("CI1", "NC1"), ("CI1", "IC1"), ("AI1", "NC1")]);

    let text = render_arbitrage("RAT", &opportunities).unwrap();
    assert!(text.contains("ticker = \"RAT\""));
}

#[test]
fn test_stricter_threshold_from_config() {
    let catalog = sample();
    let config = ForgecostConfig::from_toml_str("[arbitrage]\nmin_profit_pct = 21.0\n").unwrap();
    let opportunities = config.engine(&catalog).arbitrage("RAT").unwrap();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].sell_exchange, "NC1");
}
