//! # Catalog Snapshot
//!
//! **Immutable, typed view of one evaluation session's data.**
//!
//! The snapshot holds materials, recipes, market quotes, location factors and
//! workforce consumption. It is assembled once through [`CatalogBuilder`],
//! which enforces the data contract:
//!
//! 1. **Positive quantities**: every recipe input/output quantity is `> 0`
//! 2. **Unique keys**: no duplicate material tickers or recipe ids
//! 3. **Sane numbers**: prices, supply, demand and factors are finite and non-negative
//!
//! After `build()` nothing is mutated. The engine only ever borrows a
//! `&CatalogSnapshot`, so any number of evaluations may share one.
//!
//! Unlike a crafting DAG, the production graph here is allowed to contain
//! cycles (a refinery that consumes its own fuel, for example). The cost
//! resolver breaks them at evaluation time; [`CatalogSnapshot::find_cycle`]
//! exists for diagnostics only.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut builder = CatalogBuilder::new();
//! builder.add_recipe(Recipe::from_key("BMP:1xC-2xH=>200xPE")?.with_duration(6.0))?;
//! builder.add_quote("PE", "AI1", MarketQuote::new(28.0, 24.0))?;
//! let snapshot = builder.build();
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{EconomyError, EconomyResult};
use crate::recipe_key::parse_recipe_key;

/// Buildings whose recipes extract raw resources.
const EXTRACTION_BUILDINGS: [&str; 3] = ["COL", "EXT", "RIG"];

/// Buildings whose recipes depend on planet fertility.
const FARMING_BUILDINGS: [&str; 2] = ["FRM", "ORC"];

/// How a recipe's output reacts to the location it runs on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeKind {
    /// Location has no effect.
    #[default]
    Manufacturing,
    /// Scaled by the resource concentration factor.
    Extraction,
    /// Scaled by planet fertility.
    Farming,
}

impl RecipeKind {
    /// Derives the kind from a building code.
    #[must_use]
    pub fn from_building(building: &str) -> Self {
        if EXTRACTION_BUILDINGS.contains(&building) {
            Self::Extraction
        } else if FARMING_BUILDINGS.contains(&building) {
            Self::Farming
        } else {
            Self::Manufacturing
        }
    }
}

/// Which side of the order book a price is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBasis {
    /// Lowest sell order: what it costs to buy now.
    Ask,
    /// Highest buy order: what it pays to sell now.
    Bid,
}

/// A tradable material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Unique short code.
    pub ticker: String,
    /// Display name.
    pub name: String,
    /// Production tier; 0 means raw resource.
    pub tier: u8,
    /// Category label.
    pub category: String,
}

impl Material {
    /// Creates a new material.
    #[must_use]
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        tier: u8,
        category: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            tier,
            category: category.into(),
        }
    }
}

/// Input or output item in a recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    /// The material ticker.
    pub ticker: String,
    /// Quantity consumed/produced per run.
    pub quantity: f64,
}

impl RecipeItem {
    /// Creates a new recipe item.
    #[must_use]
    pub fn new(ticker: impl Into<String>, quantity: f64) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
        }
    }
}

/// A production recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier (the canonical recipe key).
    pub id: String,
    /// Building that runs it.
    pub building: String,
    /// Items consumed per run. Empty for extraction.
    pub inputs: Vec<RecipeItem>,
    /// Items produced per run. More than one means byproducts.
    pub outputs: Vec<RecipeItem>,
    /// Run time in hours.
    pub duration_hours: f64,
    /// Workforce type staffing the building (e.g. `PIONEER`).
    pub workforce: String,
    /// Number of workers of that type.
    pub workforce_amount: f64,
    /// Location sensitivity.
    #[serde(default)]
    pub kind: RecipeKind,
    /// Exchanges this recipe is offered on. Empty means everywhere.
    #[serde(default)]
    pub exchanges: Vec<String>,
}

impl Recipe {
    /// Creates a new recipe with basic validation.
    ///
    /// The kind is derived from the building code.
    ///
    /// # Errors
    ///
    /// Returns error if the recipe has no outputs or any quantity is not
    /// strictly positive.
    pub fn new(
        id: impl Into<String>,
        building: impl Into<String>,
        inputs: Vec<RecipeItem>,
        outputs: Vec<RecipeItem>,
    ) -> EconomyResult<Self> {
        let building = building.into();
        let recipe = Self {
            id: id.into(),
            kind: RecipeKind::from_building(&building),
            building,
            inputs,
            outputs,
            duration_hours: 0.0,
            workforce: String::new(),
            workforce_amount: 0.0,
            exchanges: Vec::new(),
        };
        recipe.validate()?;
        Ok(recipe)
    }

    /// Builds a recipe from its key string, using the key as the id.
    ///
    /// # Errors
    ///
    /// Returns error if the key does not parse.
    pub fn from_key(key: &str) -> EconomyResult<Self> {
        let parsed = parse_recipe_key(key)?;
        Self::new(key.trim(), parsed.building, parsed.inputs, parsed.outputs)
    }

    /// Sets the run time.
    #[must_use]
    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    /// Sets the workforce type and head count.
    #[must_use]
    pub fn with_workforce(mut self, workforce: impl Into<String>, amount: f64) -> Self {
        self.workforce = workforce.into();
        self.workforce_amount = amount;
        self
    }

    /// Overrides the derived kind.
    #[must_use]
    pub fn with_kind(mut self, kind: RecipeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Restricts the recipe to the given exchanges.
    #[must_use]
    pub fn with_exchanges<I, S>(mut self, exchanges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exchanges = exchanges.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the recipe against the data contract.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidCatalog`] describing the first violation.
    pub fn validate(&self) -> EconomyResult<()> {
        if self.outputs.is_empty() {
            return Err(EconomyError::InvalidCatalog(format!(
                "recipe {} must have at least one output",
                self.id
            )));
        }
        for item in self.inputs.iter().chain(&self.outputs) {
            if !item.quantity.is_finite() || item.quantity <= 0.0 {
                return Err(EconomyError::InvalidCatalog(format!(
                    "recipe {} has non-positive quantity {} for {}",
                    self.id, item.quantity, item.ticker
                )));
            }
        }
        for side in [&self.inputs, &self.outputs] {
            for (position, item) in side.iter().enumerate() {
                if side[..position].iter().any(|earlier| earlier.ticker == item.ticker) {
                    return Err(EconomyError::InvalidCatalog(format!(
                        "recipe {} lists {} twice on one side",
                        self.id, item.ticker
                    )));
                }
            }
        }
        if !self.duration_hours.is_finite() || self.duration_hours < 0.0 {
            return Err(EconomyError::InvalidCatalog(format!(
                "recipe {} has invalid duration {}",
                self.id, self.duration_hours
            )));
        }
        if !self.workforce_amount.is_finite() || self.workforce_amount < 0.0 {
            return Err(EconomyError::InvalidCatalog(format!(
                "recipe {} has invalid workforce amount {}",
                self.id, self.workforce_amount
            )));
        }
        Ok(())
    }

    /// Quantity of `ticker` produced per run, if this recipe makes it.
    #[must_use]
    pub fn output_quantity(&self, ticker: &str) -> Option<f64> {
        self.outputs
            .iter()
            .find(|item| item.ticker == ticker)
            .map(|item| item.quantity)
    }

    /// Whether this recipe may be used for pricing on `exchange`.
    #[must_use]
    pub fn is_available_on(&self, exchange: &str) -> bool {
        self.exchanges.is_empty() || self.exchanges.iter().any(|e| e == exchange)
    }

    /// Whether this recipe has more than one output.
    #[must_use]
    pub fn has_byproducts(&self) -> bool {
        self.outputs.len() > 1
    }
}

/// Order book summary for one material on one exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Lowest sell order price. 0 means no sellers.
    pub ask: f64,
    /// Highest buy order price. 0 means no buyers.
    pub bid: f64,
    /// Units offered for sale.
    #[serde(default)]
    pub supply: f64,
    /// Units wanted.
    #[serde(default)]
    pub demand: f64,
    /// Units traded recently.
    #[serde(default)]
    pub traded_volume: f64,
}

impl MarketQuote {
    /// Creates a quote with prices only.
    #[must_use]
    pub const fn new(ask: f64, bid: f64) -> Self {
        Self {
            ask,
            bid,
            supply: 0.0,
            demand: 0.0,
            traded_volume: 0.0,
        }
    }

    /// Sets supply and demand.
    #[must_use]
    pub const fn with_depth(mut self, supply: f64, demand: f64) -> Self {
        self.supply = supply;
        self.demand = demand;
        self
    }

    /// Sets recent traded volume.
    #[must_use]
    pub const fn with_traded_volume(mut self, traded_volume: f64) -> Self {
        self.traded_volume = traded_volume;
        self
    }

    /// Price on the given side of the book.
    #[must_use]
    pub const fn price(&self, basis: PriceBasis) -> f64 {
        match basis {
            PriceBasis::Ask => self.ask,
            PriceBasis::Bid => self.bid,
        }
    }

    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("ask", self.ask),
            ("bid", self.bid),
            ("supply", self.supply),
            ("demand", self.demand),
            ("traded_volume", self.traded_volume),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and non-negative, got {value}"));
            }
        }
        Ok(())
    }
}

/// One consumable a worker needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    /// Consumed material.
    pub ticker: String,
    /// Units per worker per hour.
    pub per_worker_hour: f64,
}

impl Consumable {
    /// Creates a new consumable need.
    #[must_use]
    pub fn new(ticker: impl Into<String>, per_worker_hour: f64) -> Self {
        Self {
            ticker: ticker.into(),
            per_worker_hour,
        }
    }
}

/// Consumption profile of one workforce type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkforceNeeds {
    /// Always consumed.
    #[serde(default)]
    pub necessary: Vec<Consumable>,
    /// Consumed only when luxuries are provided.
    #[serde(default)]
    pub luxury: Vec<Consumable>,
}

/// Assembles and validates a [`CatalogSnapshot`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    snapshot: CatalogSnapshot,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material.
    ///
    /// # Errors
    ///
    /// Returns error if the ticker is empty or already present.
    pub fn add_material(&mut self, material: Material) -> EconomyResult<()> {
        if material.ticker.is_empty() {
            return Err(EconomyError::InvalidCatalog(
                "material ticker must not be empty".to_string(),
            ));
        }
        if self.snapshot.materials.contains_key(&material.ticker) {
            return Err(EconomyError::InvalidCatalog(format!(
                "material {} already exists",
                material.ticker
            )));
        }
        self.snapshot
            .materials
            .insert(material.ticker.clone(), material);
        Ok(())
    }

    /// Adds a recipe to the graph.
    ///
    /// # Errors
    ///
    /// Returns error if the recipe id already exists or the recipe violates
    /// the data contract.
    pub fn add_recipe(&mut self, recipe: Recipe) -> EconomyResult<()> {
        recipe.validate()?;
        if self.snapshot.recipe_index.contains_key(&recipe.id) {
            return Err(EconomyError::InvalidCatalog(format!(
                "recipe {} already exists",
                recipe.id
            )));
        }

        let index = self.snapshot.recipes.len();

        // Index outputs (producers)
        for output in &recipe.outputs {
            self.snapshot
                .producers
                .entry(output.ticker.clone())
                .or_default()
                .push(index);
        }

        self.snapshot.recipe_index.insert(recipe.id.clone(), index);
        self.snapshot.recipes.push(recipe);
        Ok(())
    }

    /// Adds (or replaces) the quote for `ticker` on `exchange`.
    ///
    /// # Errors
    ///
    /// Returns error if any quote field is negative or not finite.
    pub fn add_quote(
        &mut self,
        ticker: impl Into<String>,
        exchange: impl Into<String>,
        quote: MarketQuote,
    ) -> EconomyResult<()> {
        let ticker = ticker.into();
        let exchange = exchange.into();
        quote.validate().map_err(|reason| {
            EconomyError::InvalidCatalog(format!("quote {ticker}@{exchange}: {reason}"))
        })?;

        self.snapshot.exchanges.insert(exchange.clone());
        self.snapshot
            .quotes
            .entry(ticker)
            .or_default()
            .insert(exchange, quote);
        Ok(())
    }

    /// Adds a resource concentration factor for extraction at `location`.
    ///
    /// # Errors
    ///
    /// Returns error if the factor is negative or not finite, or the location
    /// already has a factor for this ticker.
    pub fn add_concentration(
        &mut self,
        location: impl Into<String>,
        ticker: impl Into<String>,
        factor: f64,
    ) -> EconomyResult<()> {
        let location = location.into();
        let ticker = ticker.into();
        if !factor.is_finite() || factor < 0.0 {
            return Err(EconomyError::InvalidCatalog(format!(
                "concentration {ticker}@{location} must be finite and non-negative, got {factor}"
            )));
        }

        let factors = self
            .snapshot
            .concentrations
            .entry(location.clone())
            .or_default();
        if factors.contains_key(&ticker) {
            return Err(EconomyError::InvalidCatalog(format!(
                "duplicate concentration for {ticker}@{location}"
            )));
        }
        factors.insert(ticker, factor);
        self.snapshot.locations.insert(location);
        Ok(())
    }

    /// Sets the farming fertility of `location`.
    ///
    /// # Errors
    ///
    /// Returns error if the fertility is not finite or was already set.
    pub fn add_fertility(&mut self, location: impl Into<String>, fertility: f64) -> EconomyResult<()> {
        let location = location.into();
        if !fertility.is_finite() {
            return Err(EconomyError::InvalidCatalog(format!(
                "fertility of {location} must be finite"
            )));
        }
        if self.snapshot.fertilities.contains_key(&location) {
            return Err(EconomyError::InvalidCatalog(format!(
                "duplicate fertility for {location}"
            )));
        }
        self.snapshot.fertilities.insert(location.clone(), fertility);
        self.snapshot.locations.insert(location);
        Ok(())
    }

    /// Sets the consumption profile of a workforce type.
    ///
    /// # Errors
    ///
    /// Returns error if any rate is negative or not finite.
    pub fn add_workforce_needs(
        &mut self,
        workforce: impl Into<String>,
        needs: WorkforceNeeds,
    ) -> EconomyResult<()> {
        let workforce = workforce.into();
        for need in needs.necessary.iter().chain(&needs.luxury) {
            if !need.per_worker_hour.is_finite() || need.per_worker_hour < 0.0 {
                return Err(EconomyError::InvalidCatalog(format!(
                    "{workforce} consumption of {} must be non-negative",
                    need.ticker
                )));
            }
        }
        self.snapshot.workforce.insert(workforce, needs);
        Ok(())
    }

    /// Freezes the catalog.
    #[must_use]
    pub fn build(self) -> CatalogSnapshot {
        self.snapshot
    }
}

/// Immutable catalog for one evaluation session.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    /// Materials by ticker.
    materials: HashMap<String, Material>,
    /// Recipes in input order (order matters for tie-breaking).
    recipes: Vec<Recipe>,
    /// Recipe id to position in `recipes`.
    recipe_index: HashMap<String, usize>,
    /// Ticker to recipes that produce it, in input order.
    producers: HashMap<String, Vec<usize>>,
    /// Ticker to exchange to quote. Exchanges are sorted.
    quotes: HashMap<String, BTreeMap<String, MarketQuote>>,
    /// Every exchange that has at least one quote.
    exchanges: BTreeSet<String>,
    /// Location to ticker to concentration factor.
    concentrations: HashMap<String, HashMap<String, f64>>,
    /// Location to fertility.
    fertilities: HashMap<String, f64>,
    /// Every location with at least one factor.
    locations: BTreeSet<String>,
    /// Workforce type to consumption profile.
    workforce: HashMap<String, WorkforceNeeds>,
}

impl CatalogSnapshot {
    /// Gets a material by ticker.
    #[must_use]
    pub fn material(&self, ticker: &str) -> Option<&Material> {
        self.materials.get(ticker)
    }

    /// Whether the ticker is known at all: listed, produced, or quoted.
    #[must_use]
    pub fn knows_material(&self, ticker: &str) -> bool {
        self.materials.contains_key(ticker)
            || self.producers.contains_key(ticker)
            || self.quotes.contains_key(ticker)
    }

    /// Gets a recipe by id.
    #[must_use]
    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipe_index.get(id).map(|&index| &self.recipes[index])
    }

    /// Returns all recipes in input order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Recipes producing `ticker` that are usable on `exchange`, in input order.
    pub fn producers_of<'a>(
        &'a self,
        ticker: &str,
        exchange: &'a str,
    ) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.producers
            .get(ticker)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&index| &self.recipes[index])
            .filter(move |recipe| recipe.is_available_on(exchange))
    }

    /// Returns the number of recipes.
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Returns the number of listed materials.
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Gets the quote for `ticker` on `exchange`.
    #[must_use]
    pub fn quote(&self, ticker: &str, exchange: &str) -> Option<&MarketQuote> {
        self.quotes.get(ticker)?.get(exchange)
    }

    /// All quotes for `ticker`, ordered by exchange code.
    #[must_use]
    pub fn quotes_for(&self, ticker: &str) -> Option<&BTreeMap<String, MarketQuote>> {
        self.quotes.get(ticker)
    }

    /// Positive market price of `ticker` on `exchange`, if there is one.
    ///
    /// A quote with a zero price on the requested side counts as missing.
    #[must_use]
    pub fn price(&self, ticker: &str, exchange: &str, basis: PriceBasis) -> Option<f64> {
        self.quote(ticker, exchange)
            .map(|quote| quote.price(basis))
            .filter(|&price| price > 0.0)
    }

    /// Whether any quote exists on `exchange`.
    #[must_use]
    pub fn has_exchange(&self, exchange: &str) -> bool {
        self.exchanges.contains(exchange)
    }

    /// All exchange codes, sorted.
    pub fn exchanges(&self) -> impl Iterator<Item = &str> {
        self.exchanges.iter().map(String::as_str)
    }

    /// Whether any factor exists for `location`.
    #[must_use]
    pub fn has_location(&self, location: &str) -> bool {
        self.locations.contains(location)
    }

    /// Extraction concentration of `ticker` at `location`.
    #[must_use]
    pub fn concentration(&self, location: &str, ticker: &str) -> Option<f64> {
        self.concentrations.get(location)?.get(ticker).copied()
    }

    /// Farming fertility of `location`.
    #[must_use]
    pub fn fertility(&self, location: &str) -> Option<f64> {
        self.fertilities.get(location).copied()
    }

    /// Consumption profile of a workforce type.
    #[must_use]
    pub fn workforce_needs(&self, workforce: &str) -> Option<&WorkforceNeeds> {
        self.workforce.get(workforce)
    }

    /// Detects one production cycle, as a list of recipe ids.
    ///
    /// Walks the edges the cost resolver follows, from a material to every
    /// input of every recipe that makes it. The ids come in production order
    /// (each recipe makes something the next one consumes) and the list
    /// starts and ends with the same id. Exchange availability is ignored.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut roots: Vec<&str> = self.producers.keys().map(String::as_str).collect();
        roots.sort_unstable();

        let mut settled: HashSet<&str> = HashSet::new();
        for root in roots {
            if settled.contains(root) {
                continue;
            }
            if let Some(cycle) = self.cycle_from(root, &mut settled) {
                return Some(cycle.into_iter().map(|index| self.recipes[index].id.clone()).collect());
            }
        }
        None
    }

    /// Iterative depth-first walk from `root`.
    ///
    /// Materials whose whole subtree was walked without meeting the trail go
    /// into `settled` and are never entered again.
    fn cycle_from<'a>(&'a self, root: &'a str, settled: &mut HashSet<&'a str>) -> Option<Vec<usize>> {
        let mut trail = vec![WalkFrame::new(root, self.supply_edges(root))];
        // taken[i] is the recipe that led from trail[i] to trail[i + 1]
        let mut taken: Vec<usize> = Vec::new();

        loop {
            let top = trail.last_mut()?;
            let Some(&(recipe, input)) = top.edges.get(top.next) else {
                settled.insert(top.material);
                trail.pop();
                taken.pop();
                continue;
            };
            top.next += 1;

            if let Some(start) = trail.iter().position(|frame| frame.material == input) {
                let mut cycle: Vec<usize> = std::iter::once(recipe)
                    .chain(taken[start..].iter().rev().copied())
                    .collect();
                cycle.push(recipe);
                return Some(cycle);
            }
            if settled.contains(input) {
                continue;
            }

            taken.push(recipe);
            trail.push(WalkFrame::new(input, self.supply_edges(input)));
        }
    }

    /// `(recipe, input)` pairs for every recipe producing `ticker`.
    fn supply_edges(&self, ticker: &str) -> Vec<(usize, &str)> {
        self.producers
            .get(ticker)
            .into_iter()
            .flatten()
            .flat_map(|&index| {
                self.recipes[index]
                    .inputs
                    .iter()
                    .map(move |input| (index, input.ticker.as_str()))
            })
            .collect()
    }
}

/// One material on the cycle search trail.
struct WalkFrame<'a> {
    material: &'a str,
    edges: Vec<(usize, &'a str)>,
    next: usize,
}

impl<'a> WalkFrame<'a> {
    fn new(material: &'a str, edges: Vec<(usize, &'a str)>) -> Self {
        Self {
            material,
            edges,
            next: 0,
        }
    }
}
