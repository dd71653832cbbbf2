//! # Cost Resolver
//!
//! **Recursive self-production cost over a cyclic recipe graph.**
//!
//! The unit cost of a material on an exchange is the cheapest of its
//! recipes, where each recipe costs
//!
//! ```text
//! run_cost  = Σ input_qty × resolve(input) + workforce_cost
//! unit_cost = run_cost × byproduct_share / output_qty
//! ```
//!
//! A material with no recipe costs its market price. A missing market price
//! counts as 0 and is recorded in [`Diagnostics`], never raised.
//!
//! ## Cycles
//!
//! A single visited set of `(ticker, exchange)` pairs lives for the whole
//! resolution. Pairs are added on entry and removed on exit (depth-first
//! backtracking). Meeting a pair that is already on the stack falls back to
//! its market price instead of recursing: an approximation, not a
//! fixed-point solve. Depth is additionally bounded by
//! [`ResolverConfig::max_depth`].
//!
//! ## Settled costs
//!
//! A ticker whose resolution met neither a cycle fallback nor the depth bound
//! is remembered, together with its diagnostics, for the rest of the
//! resolver's life. Sub-graphs shared by many recipes are resolved once.
//!
//! ## Price basis
//!
//! Inputs, consumables and cycle fallbacks are priced on the resolver's
//! [`PriceBasis`]. Byproduct weights always use ask prices.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::byproduct::{share_fraction, PricedOutput};
use crate::catalog::{CatalogSnapshot, PriceBasis, Recipe, RecipeKind};
use crate::efficiency::{compute_efficiency, Efficiency, EfficiencyInputs, EFFICIENCY_FLOOR};
use crate::error::EconomyResult;

/// Default recursion bound.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolver tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum recipe nesting before falling back to market price.
    pub max_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything that made a result less than complete.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Tickers whose price was needed but not quoted (counted as 0).
    pub missing_prices: BTreeSet<String>,
    /// Tickers where a recipe cycle was cut by a market-price fallback.
    pub cycle_fallbacks: BTreeSet<String>,
    /// Whether the recursion bound was hit.
    pub depth_limited: bool,
    /// Whether an efficiency had to be floored.
    pub degenerate_efficiency: bool,
}

impl Diagnostics {
    /// Whether every price the result depends on was available.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_prices.is_empty()
    }

    /// Folds another set of diagnostics into this one.
    pub fn merge(&mut self, other: Self) {
        self.missing_prices.extend(other.missing_prices);
        self.cycle_fallbacks.extend(other.cycle_fallbacks);
        self.depth_limited |= other.depth_limited;
        self.degenerate_efficiency |= other.degenerate_efficiency;
    }
}

/// Per-unit cost of one output of one recipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    /// Input materials per unit.
    pub unit_input_cost: f64,
    /// Workforce consumables per unit.
    pub unit_workforce_cost: f64,
    /// Sum of the two.
    pub unit_total_cost: f64,
    /// Fraction of the run cost borne by this output, for byproduct recipes.
    pub allocated_share: Option<f64>,
}

impl CostResult {
    /// Cost of a material bought outright at `price`.
    #[must_use]
    pub const fn market(price: f64) -> Self {
        Self {
            unit_input_cost: price,
            unit_workforce_cost: 0.0,
            unit_total_cost: price,
            allocated_share: None,
        }
    }
}

/// Resolves production costs on one exchange under one price basis.
///
/// A resolver is created per evaluation and discarded afterwards. It carries
/// the backtracking stack, the diagnostics of the branch being costed, and
/// the costs already settled during its lifetime.
pub struct CostResolver<'a> {
    snapshot: &'a CatalogSnapshot,
    exchange: &'a str,
    basis: PriceBasis,
    config: ResolverConfig,
    luxury_provided: bool,
    /// Efficiency of each recipe kind at the production site.
    site: SiteEfficiency,
    /// Efficiency assumed for upstream recipes.
    upstream: Efficiency,
    /// Pairs currently being resolved.
    visiting: HashSet<(String, String)>,
    depth: usize,
    /// Set when the current branch hit a cycle fallback or the depth bound.
    stack_dependent: bool,
    /// Ticker costs that do not depend on the stack they were reached from.
    settled: HashMap<String, (f64, Diagnostics)>,
    diagnostics: Diagnostics,
}

/// Site efficiency per recipe kind, computed once per resolver.
#[derive(Clone, Copy, Debug)]
struct SiteEfficiency {
    manufacturing: Efficiency,
    extraction: Efficiency,
    farming: Efficiency,
}

impl SiteEfficiency {
    fn new(site: &EfficiencyInputs) -> EconomyResult<Self> {
        Ok(Self {
            manufacturing: compute_efficiency(site, RecipeKind::Manufacturing)?,
            extraction: compute_efficiency(site, RecipeKind::Extraction)?,
            farming: compute_efficiency(site, RecipeKind::Farming)?,
        })
    }

    const fn of(&self, kind: RecipeKind) -> Efficiency {
        match kind {
            RecipeKind::Manufacturing => self.manufacturing,
            RecipeKind::Extraction => self.extraction,
            RecipeKind::Farming => self.farming,
        }
    }
}

impl<'a> CostResolver<'a> {
    /// Creates a resolver.
    ///
    /// `site` describes how the target recipe is run. Upstream recipes use
    /// only its worker setting (see [`EfficiencyInputs::baseline`]).
    ///
    /// # Errors
    ///
    /// Returns error if the efficiency inputs are out of range.
    pub fn new(
        snapshot: &'a CatalogSnapshot,
        exchange: &'a str,
        basis: PriceBasis,
        site: &EfficiencyInputs,
    ) -> EconomyResult<Self> {
        Ok(Self {
            snapshot,
            exchange,
            basis,
            config: ResolverConfig::default(),
            luxury_provided: site.luxury_provided,
            site: SiteEfficiency::new(site)?,
            upstream: compute_efficiency(&site.baseline(), RecipeKind::Manufacturing)?,
            visiting: HashSet::new(),
            depth: 0,
            stack_dependent: false,
            settled: HashMap::new(),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Overrides the default tuning.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Diagnostics gathered so far.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Hands out the diagnostics gathered so far and starts a fresh set.
    ///
    /// Lets a caller cost several alternatives with one resolver and keep
    /// only the diagnostics of the one it picks.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Consumes the resolver, keeping its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Efficiency of `recipe` run at the production site.
    #[must_use]
    pub const fn site_efficiency(&self, recipe: &Recipe) -> Efficiency {
        self.site.of(recipe.kind)
    }

    /// Cheapest-acquisition unit cost of `ticker`.
    ///
    /// Only the diagnostics of the cheapest recipe are kept.
    pub fn resolve(&mut self, ticker: &str) -> f64 {
        if self.is_visiting(ticker) {
            tracing::debug!(ticker, exchange = self.exchange, "recipe cycle, using market price");
            self.diagnostics.cycle_fallbacks.insert(ticker.to_string());
            self.stack_dependent = true;
            return self.market_price(ticker);
        }

        if let Some((cost, diagnostics)) = self.settled.get(ticker) {
            let cost = *cost;
            let diagnostics = diagnostics.clone();
            self.diagnostics.merge(diagnostics);
            return cost;
        }

        let snapshot = self.snapshot;
        let candidates: Vec<&Recipe> = snapshot.producers_of(ticker, self.exchange).collect();
        if candidates.is_empty() {
            // Tier-0 or bought-only material
            return self.market_price(ticker);
        }

        if self.depth >= self.config.max_depth {
            tracing::warn!(ticker, depth = self.depth, "recursion bound reached, using market price");
            self.diagnostics.depth_limited = true;
            self.stack_dependent = true;
            return self.market_price(ticker);
        }

        let outer_dependent = std::mem::replace(&mut self.stack_dependent, false);
        let outer = self.take_diagnostics();

        let upstream = self.upstream;
        let mut best: Option<(f64, Diagnostics)> = None;
        for recipe in candidates {
            let Some(cost) = self.recipe_cost(recipe, ticker, &upstream) else {
                continue;
            };
            let diagnostics = self.take_diagnostics();
            let cheaper = match &best {
                Some((current, _)) => cost.unit_total_cost < *current,
                None => true,
            };
            if cheaper {
                best = Some((cost.unit_total_cost, diagnostics));
            }
        }

        let dependent = self.stack_dependent;
        self.stack_dependent = outer_dependent || dependent;
        self.diagnostics = outer;

        let Some((cost, diagnostics)) = best else {
            return self.market_price(ticker);
        };
        if !dependent {
            self.settled.insert(ticker.to_string(), (cost, diagnostics.clone()));
        }
        self.diagnostics.merge(diagnostics);
        cost
    }

    /// Unit cost of `ticker` made by `recipe` at the production site.
    ///
    /// Returns `None` if the recipe does not produce `ticker`.
    pub fn cost_at_site(&mut self, recipe: &Recipe, ticker: &str) -> Option<CostResult> {
        let efficiency = self.site_efficiency(recipe);
        self.recipe_cost(recipe, ticker, &efficiency)
    }

    /// Unit cost of `ticker` made by `recipe` at the given efficiency.
    fn recipe_cost(&mut self, recipe: &Recipe, ticker: &str, efficiency: &Efficiency) -> Option<CostResult> {
        let output_quantity = recipe.output_quantity(ticker)?;

        let key = (ticker.to_string(), self.exchange.to_string());
        let entered = self.visiting.insert(key.clone());
        self.depth += 1;

        let run_input_cost: f64 = recipe
            .inputs
            .iter()
            .map(|input| input.quantity * self.resolve(&input.ticker))
            .sum();

        self.depth -= 1;
        if entered {
            self.visiting.remove(&key);
        }

        if efficiency.clamped {
            tracing::warn!(recipe = %recipe.id, floor = EFFICIENCY_FLOOR, "degenerate efficiency clamped");
            self.diagnostics.degenerate_efficiency = true;
        }
        let run_workforce_cost = self.workforce_cost(recipe, efficiency);

        let share = if recipe.has_byproducts() {
            Some(self.byproduct_share(recipe, ticker))
        } else {
            None
        };
        let fraction = share.unwrap_or(1.0);

        let unit_input_cost = run_input_cost * fraction / output_quantity;
        let unit_workforce_cost = run_workforce_cost * fraction / output_quantity;

        Some(CostResult {
            unit_input_cost,
            unit_workforce_cost,
            unit_total_cost: unit_input_cost + unit_workforce_cost,
            allocated_share: share,
        })
    }

    /// Consumable cost of one run of `recipe`, scaled by the efficiency multiplier.
    pub fn workforce_cost(&mut self, recipe: &Recipe, efficiency: &Efficiency) -> f64 {
        let worker_hours = recipe.workforce_amount * recipe.duration_hours;
        if worker_hours <= 0.0 {
            return 0.0;
        }

        let snapshot = self.snapshot;
        let Some(needs) = snapshot.workforce_needs(&recipe.workforce) else {
            tracing::debug!(workforce = %recipe.workforce, recipe = %recipe.id, "no consumption profile");
            return 0.0;
        };

        let luxury: &[_] = if self.luxury_provided {
            &needs.luxury
        } else {
            &[]
        };

        let consumables: f64 = needs
            .necessary
            .iter()
            .chain(luxury)
            .map(|need| need.per_worker_hour * worker_hours * self.market_price(&need.ticker))
            .sum();

        consumables * efficiency.cost_multiplier
    }

    /// Fraction of a run's cost carried by `ticker`.
    fn byproduct_share(&self, recipe: &Recipe, ticker: &str) -> f64 {
        let priced: Vec<PricedOutput<'_>> = recipe
            .outputs
            .iter()
            .map(|output| PricedOutput {
                ticker: &output.ticker,
                quantity: output.quantity,
                ask: self
                    .snapshot
                    .price(&output.ticker, self.exchange, PriceBasis::Ask)
                    .unwrap_or(0.0),
            })
            .collect();
        share_fraction(ticker, &priced).unwrap_or(1.0)
    }

    /// Market price on the resolver's basis, or 0 (recorded as missing).
    fn market_price(&mut self, ticker: &str) -> f64 {
        match self.snapshot.price(ticker, self.exchange, self.basis) {
            Some(price) => price,
            None => {
                self.diagnostics.missing_prices.insert(ticker.to_string());
                0.0
            }
        }
    }

    fn is_visiting(&self, ticker: &str) -> bool {
        self.visiting
            .contains(&(ticker.to_string(), self.exchange.to_string()))
    }
}
