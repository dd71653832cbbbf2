//! TOML rendering of engine results for the presentation layer.

use forgecost_economy::{ArbitrageOpportunity, CatalogSnapshot, Evaluation};
use serde::Serialize;

/// Result of `forgecost check`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Listed materials.
    pub materials: usize,
    /// Recipes.
    pub recipes: usize,
    /// Exchanges with at least one quote, sorted.
    pub exchanges: Vec<String>,
    /// One production cycle, as recipe ids, if the graph has any.
    pub cycle: Option<Vec<String>>,
}

impl CatalogSummary {
    /// Summarizes a snapshot.
    #[must_use]
    pub fn of(snapshot: &CatalogSnapshot) -> Self {
        Self {
            materials: snapshot.material_count(),
            recipes: snapshot.recipe_count(),
            exchanges: snapshot.exchanges().map(str::to_string).collect(),
            cycle: snapshot.find_cycle(),
        }
    }
}

#[derive(Serialize)]
struct ArbitrageReport<'a> {
    ticker: &'a str,
    opportunities: &'a [ArbitrageOpportunity],
}

/// Renders an evaluation.
///
/// # Errors
///
/// Returns error if the record cannot be expressed as TOML.
pub fn render_evaluation(evaluation: &Evaluation) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(evaluation)
}

/// Renders a ranked arbitrage list.
///
/// # Errors
///
/// Returns error if the list cannot be expressed as TOML.
pub fn render_arbitrage(ticker: &str, opportunities: &[ArbitrageOpportunity]) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&ArbitrageReport { ticker, opportunities })
}

/// Renders a catalog summary.
///
/// # Errors
///
/// Returns error if the summary cannot be expressed as TOML.
pub fn render_summary(summary: &CatalogSummary) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(summary)
}
