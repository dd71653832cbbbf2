//! # Profitability Engine
//!
//! The facade the outside world talks to. One call takes a selection
//! (material, exchange, optional recipe, optional location, production
//! setup) and returns everything about it: ask- and bid-basis cost
//! breakdowns, the four profit scenarios, the efficiency used, market
//! outlook, bottleneck class, a produce-or-buy recommendation, extraction
//! time and diagnostics.
//!
//! The engine holds only a shared reference to the snapshot and its
//! configuration. Evaluations never mutate anything, so the same engine can
//! serve any number of callers.

use serde::{Deserialize, Serialize};

use crate::arbitrage::{find_arbitrage, ArbitrageConfig, ArbitrageOpportunity};
use crate::catalog::{CatalogSnapshot, MarketQuote, PriceBasis, RecipeKind};
use crate::cost::{CostResolver, CostResult, Diagnostics, ResolverConfig};
use crate::efficiency::{compute_efficiency, extraction_hours, Efficiency, EfficiencyInputs};
use crate::error::{EconomyError, EconomyResult};
use crate::market::{Bottleneck, MarketOutlook};
use crate::scenario::{self, Scenario};
use crate::selector::select_recipe;
use crate::sourcing::{SourcingAdvice, SourcingInputs};

/// What to evaluate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Target material.
    pub ticker: String,
    /// Exchange prices are read from.
    pub exchange: String,
    /// Recipe to use. `None` picks the cheapest.
    pub recipe: Option<String>,
    /// Production location. When set, its concentration and fertility
    /// replace those in `efficiency`.
    pub location: Option<String>,
    /// Production setup.
    pub efficiency: EfficiencyInputs,
}

impl EvaluationRequest {
    /// Creates a request with automatic recipe selection and the default setup.
    #[must_use]
    pub fn new(ticker: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: exchange.into(),
            ..Self::default()
        }
    }

    /// Pins the recipe.
    #[must_use]
    pub fn with_recipe(mut self, recipe: impl Into<String>) -> Self {
        self.recipe = Some(recipe.into());
        self
    }

    /// Sets the production location.
    #[must_use]
    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the production setup.
    #[must_use]
    pub fn with_efficiency(mut self, efficiency: EfficiencyInputs) -> Self {
        self.efficiency = efficiency;
        self
    }
}

/// Result of one evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Target material.
    pub ticker: String,
    /// Display name, when the catalog lists the material.
    pub name: Option<String>,
    /// Exchange.
    pub exchange: String,
    /// Recipe used, or `None` when the material can only be bought.
    pub recipe_id: Option<String>,
    /// Production location, if any.
    pub location: Option<String>,
    /// Ask price of the target (0 when unquoted).
    pub ask_price: f64,
    /// Bid price of the target (0 when unquoted).
    pub bid_price: f64,
    /// Unit cost with everything bought at ask.
    pub cost_ask: CostResult,
    /// Unit cost with everything bought at bid.
    pub cost_bid: CostResult,
    /// Efficiency the recipe ran at.
    pub efficiency: Option<Efficiency>,
    /// Hours per extraction batch at the location.
    pub extraction_hours: Option<f64>,
    /// The four price-basis scenarios.
    pub scenarios: [Scenario; 4],
    /// Market indicators.
    pub outlook: MarketOutlook,
    /// Supply problem on this exchange.
    pub bottleneck: Bottleneck,
    /// Whether producing beats buying. `None` when there is no recipe.
    pub produce_vs_buy: Option<SourcingAdvice>,
    /// What made the result incomplete or approximate.
    pub diagnostics: Diagnostics,
}

impl Evaluation {
    /// The scenario for a `(sell, cost)` combination.
    #[must_use]
    pub fn scenario(&self, sell_basis: PriceBasis, cost_basis: PriceBasis) -> Option<&Scenario> {
        scenario::find(&self.scenarios, sell_basis, cost_basis)
    }
}

/// Evaluates production profitability against one catalog snapshot.
#[derive(Clone, Copy, Debug)]
pub struct ProfitabilityEngine<'a> {
    snapshot: &'a CatalogSnapshot,
    resolver: ResolverConfig,
    arbitrage: ArbitrageConfig,
}

impl<'a> ProfitabilityEngine<'a> {
    /// Creates an engine with default settings.
    #[must_use]
    pub fn new(snapshot: &'a CatalogSnapshot) -> Self {
        Self {
            snapshot,
            resolver: ResolverConfig::default(),
            arbitrage: ArbitrageConfig::default(),
        }
    }

    /// Overrides the resolver settings.
    #[must_use]
    pub const fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver = config;
        self
    }

    /// Overrides the arbitrage thresholds.
    #[must_use]
    pub const fn with_arbitrage_config(mut self, config: ArbitrageConfig) -> Self {
        self.arbitrage = config;
        self
    }

    /// Evaluates one selection.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the ticker, exchange, location or
    /// explicit recipe is unknown, and [`EconomyError::InvalidEfficiency`]
    /// for out-of-range setup values. Missing prices are not errors; they
    /// show up in [`Evaluation::diagnostics`].
    pub fn evaluate(&self, request: &EvaluationRequest) -> EconomyResult<Evaluation> {
        let snapshot = self.snapshot;
        let ticker = request.ticker.as_str();
        let exchange = request.exchange.as_str();

        if !snapshot.knows_material(ticker) {
            return Err(EconomyError::MaterialNotFound(ticker.to_string()));
        }
        if !snapshot.has_exchange(exchange) {
            return Err(EconomyError::ExchangeNotFound(exchange.to_string()));
        }

        let mut site = request.efficiency.clone();
        if let Some(location) = &request.location {
            if !snapshot.has_location(location) {
                return Err(EconomyError::LocationNotFound(location.clone()));
            }
            site.concentration = snapshot.concentration(location, ticker);
            site.fertility = snapshot.fertility(location);
        }
        site.validate()?;

        tracing::debug!(ticker, exchange, recipe = ?request.recipe, location = ?request.location, "evaluating");

        let selection = select_recipe(
            snapshot,
            ticker,
            exchange,
            request.recipe.as_deref(),
            &site,
            self.resolver,
        )?;

        let mut bid = CostResolver::new(snapshot, exchange, PriceBasis::Bid, &site)?.with_config(self.resolver);
        let mut diagnostics;
        let (recipe, cost_ask, cost_bid) = match selection {
            Some(selection) => {
                let recipe = selection.recipe;
                let cost_bid = bid.cost_at_site(recipe, ticker).ok_or_else(|| EconomyError::RecipeNotFound {
                    recipe_id: recipe.id.clone(),
                    ticker: ticker.to_string(),
                    exchange: exchange.to_string(),
                })?;
                diagnostics = selection.diagnostics;
                (Some(recipe), selection.cost, cost_bid)
            }
            None => {
                let mut ask = CostResolver::new(snapshot, exchange, PriceBasis::Ask, &site)?.with_config(self.resolver);
                let cost_ask = CostResult::market(ask.resolve(ticker));
                diagnostics = ask.into_diagnostics();
                (None, cost_ask, CostResult::market(bid.resolve(ticker)))
            }
        };
        diagnostics.merge(bid.into_diagnostics());

        let quote = snapshot.quote(ticker, exchange).copied().unwrap_or_default();
        if quote.ask <= 0.0 || quote.bid <= 0.0 {
            diagnostics.missing_prices.insert(ticker.to_string());
        }

        let scenarios = scenario::evaluate(cost_ask.unit_total_cost, cost_bid.unit_total_cost, quote.ask, quote.bid);
        let outlook = outlook(&quote, &scenarios);

        let material = snapshot.material(ticker);
        let tier = material.map_or(0, |material| material.tier);
        let bottleneck = Bottleneck::classify(&quote, tier, material.map_or("", |material| material.category.as_str()));
        let produce_vs_buy = recipe.map(|recipe| {
            SourcingAdvice::assess(&SourcingInputs {
                unit_input_cost: cost_ask.unit_input_cost,
                unit_total_cost: cost_ask.unit_total_cost,
                market_price: if quote.ask > 0.0 { quote.ask } else { quote.bid },
                supply: quote.supply,
                demand: quote.demand,
                tier,
                input_count: recipe.inputs.len(),
            })
        });

        let efficiency = recipe
            .map(|recipe| compute_efficiency(&site, recipe.kind))
            .transpose()?;
        if efficiency.is_some_and(|e| e.clamped) {
            diagnostics.degenerate_efficiency = true;
        }

        let extraction_hours = match (recipe, site.concentration) {
            (Some(recipe), Some(factor)) if recipe.kind == RecipeKind::Extraction && request.location.is_some() => {
                Some(extraction_hours(recipe.duration_hours, factor))
            }
            _ => None,
        };

        Ok(Evaluation {
            ticker: ticker.to_string(),
            name: material.map(|material| material.name.clone()),
            exchange: exchange.to_string(),
            recipe_id: recipe.map(|recipe| recipe.id.clone()),
            location: request.location.clone(),
            ask_price: quote.ask,
            bid_price: quote.bid,
            cost_ask,
            cost_bid,
            efficiency,
            extraction_hours,
            scenarios,
            outlook,
            bottleneck,
            produce_vs_buy,
            diagnostics,
        })
    }

    /// Ranked cross-exchange opportunities for `ticker`.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::MaterialNotFound`] if the ticker is unknown.
    pub fn arbitrage(&self, ticker: &str) -> EconomyResult<Vec<ArbitrageOpportunity>> {
        if !self.snapshot.knows_material(ticker) {
            return Err(EconomyError::MaterialNotFound(ticker.to_string()));
        }
        Ok(self
            .snapshot
            .quotes_for(ticker)
            .map(|quotes| find_arbitrage(ticker, quotes, &self.arbitrage))
            .unwrap_or_default())
    }
}

/// Outlook from the ask-cost scenarios.
fn outlook(quote: &MarketQuote, scenarios: &[Scenario; 4]) -> MarketOutlook {
    let sell_ask = scenario::find(scenarios, PriceBasis::Ask, PriceBasis::Ask);
    let sell_bid = scenario::find(scenarios, PriceBasis::Bid, PriceBasis::Ask);
    MarketOutlook::assess(
        quote,
        sell_ask.map_or(0.0, |s| s.roi_pct),
        sell_ask.map_or(0.0, |s| s.profit),
        sell_bid.map_or(0.0, |s| s.profit),
    )
}
