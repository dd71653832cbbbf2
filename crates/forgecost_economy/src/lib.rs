//! # Forgecost Economy Engine
//!
//! Production cost and profitability resolution for a crafting economy.
//!
//! ## Design Principles
//!
//! 1. **Pure evaluation** - Every call is a function of one immutable [`CatalogSnapshot`]; no I/O, no hidden state
//! 2. **Cycle-safe recursion** - Recipe graphs may loop; the resolver breaks loops with market prices
//! 3. **No data is not an error** - Missing quotes resolve to 0 and are reported in [`Diagnostics`]
//! 4. **Parse once** - Recipe key strings are turned into typed records when the snapshot is built
//!
//! ## Thread Safety
//!
//! A snapshot is never mutated after [`CatalogBuilder::build`], so it can be
//! shared across threads and evaluated concurrently. Each evaluation builds
//! its own resolver state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use forgecost_economy::{CatalogBuilder, EvaluationRequest, MarketQuote, ProfitabilityEngine, Recipe};
//!
//! let mut builder = CatalogBuilder::new();
//! builder.add_recipe(Recipe::from_key("BMP:1xC-2xH=>200xPE")?)?;
//! builder.add_quote("PE", "AI1", MarketQuote::new(28.0, 24.0))?;
//! let snapshot = builder.build();
//!
//! let evaluation = ProfitabilityEngine::new(&snapshot)
//!     .evaluate(&EvaluationRequest::new("PE", "AI1"))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod arbitrage;
pub mod byproduct;
pub mod catalog;
pub mod cost;
pub mod efficiency;
pub mod engine;
pub mod error;
pub mod market;
pub mod recipe_key;
pub mod scenario;
pub mod selector;
pub mod sourcing;

pub use arbitrage::{find_arbitrage, ArbitrageConfig, ArbitrageOpportunity};
pub use byproduct::{allocate, AllocatedShare, PricedOutput};
pub use catalog::{
    CatalogBuilder, CatalogSnapshot, Consumable, MarketQuote, Material, PriceBasis, Recipe, RecipeItem,
    RecipeKind, WorkforceNeeds,
};
pub use cost::{CostResolver, CostResult, Diagnostics, ResolverConfig};
pub use efficiency::{compute_efficiency, extraction_hours, Efficiency, EfficiencyInputs};
pub use engine::{Evaluation, EvaluationRequest, ProfitabilityEngine};
pub use error::{EconomyError, EconomyResult};
pub use market::{Bottleneck, BottleneckKind, MarketOutlook, RiskLevel, Viability};
pub use scenario::Scenario;
pub use selector::{select_recipe, Selection};
pub use sourcing::{Recommendation, SourcingAdvice, SourcingInputs};
