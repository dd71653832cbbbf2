//! # Catalog Files
//!
//! The tabular data the refresh job produces, as one TOML document:
//!
//! ```toml
//! [[materials]]
//! ticker = "PE"
//! name = "Polyethylene"
//! tier = 1
//! category = "plastics"
//!
//! [[recipes]]
//! key = "BMP:1xC-2xH=>200xPE"
//! duration_hours = 6.0
//! workforce = "PIONEER"
//! workforce_amount = 100
//!
//! [[quotes]]
//! ticker = "PE"
//! exchange = "AI1"
//! ask = 28.0
//! bid = 24.0
//! supply = 12000
//! demand = 8000
//!
//! [[concentrations]]
//! ticker = "H"
//! location = "Montem"
//! factor = 0.8
//!
//! [[fertilities]]
//! location = "Promitor"
//! fertility = -0.1
//!
//! [[workforce_needs]]
//! workforce = "PIONEER"
//! necessary = { DW = 0.004, RAT = 0.004 }
//! luxury = { COF = 0.0005 }
//! ```
//!
//! Rows are turned into typed records and every recipe key is parsed here,
//! once. Anything that breaks the data contract fails the whole load.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use forgecost_economy::{
    CatalogBuilder, CatalogSnapshot, Consumable, MarketQuote, Material, Recipe, RecipeKind, WorkforceNeeds,
};
use serde::Deserialize;

use crate::error::{LoadError, LoadResult};

/// One `[[recipes]]` row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RecipeRow {
    /// Recipe key, `BUILDING[:inputs]=>outputs`.
    pub key: String,
    /// Run time in hours.
    #[serde(default)]
    pub duration_hours: f64,
    /// Workforce type.
    #[serde(default)]
    pub workforce: String,
    /// Worker head count.
    #[serde(default)]
    pub workforce_amount: f64,
    /// Kind override; derived from the building when absent.
    #[serde(default)]
    pub kind: Option<RecipeKind>,
    /// Exchanges the recipe is offered on; empty means all.
    #[serde(default)]
    pub exchanges: Vec<String>,
}

/// One `[[quotes]]` row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct QuoteRow {
    /// Material.
    pub ticker: String,
    /// Exchange.
    pub exchange: String,
    /// Ask price (0 if no sellers).
    #[serde(default)]
    pub ask: f64,
    /// Bid price (0 if no buyers).
    #[serde(default)]
    pub bid: f64,
    /// Units on offer.
    #[serde(default)]
    pub supply: f64,
    /// Units wanted.
    #[serde(default)]
    pub demand: f64,
    /// Units recently traded.
    #[serde(default)]
    pub traded_volume: f64,
}

/// One `[[concentrations]]` row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ConcentrationRow {
    /// Extracted material.
    pub ticker: String,
    /// Location.
    pub location: String,
    /// Relative yield.
    pub factor: f64,
}

/// One `[[fertilities]]` row.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FertilityRow {
    /// Location.
    pub location: String,
    /// Signed farming modifier.
    pub fertility: f64,
}

/// One `[[workforce_needs]]` row: ticker to units per worker per hour.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WorkforceRow {
    /// Workforce type.
    pub workforce: String,
    /// Always consumed.
    #[serde(default)]
    pub necessary: BTreeMap<String, f64>,
    /// Consumed when luxuries are provided.
    #[serde(default)]
    pub luxury: BTreeMap<String, f64>,
}

/// A whole catalog file, before validation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    /// Material master data.
    pub materials: Vec<Material>,
    /// Recipes, in priority order for tie-breaking.
    pub recipes: Vec<RecipeRow>,
    /// Market quotes.
    pub quotes: Vec<QuoteRow>,
    /// Extraction concentrations.
    pub concentrations: Vec<ConcentrationRow>,
    /// Farming fertilities.
    pub fertilities: Vec<FertilityRow>,
    /// Workforce consumption profiles.
    pub workforce_needs: Vec<WorkforceRow>,
}

impl CatalogFile {
    /// Parses catalog text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] if the text is not a catalog document.
    pub fn from_toml_str(text: &str) -> LoadResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] or [`LoadError::Parse`].
    pub fn from_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates the rows and freezes them into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Catalog`] for unparseable recipe keys, duplicate
    /// ids, non-positive quantities or negative prices.
    pub fn into_snapshot(self) -> LoadResult<CatalogSnapshot> {
        let mut builder = CatalogBuilder::new();

        for material in self.materials {
            builder.add_material(material)?;
        }

        for row in self.recipes {
            let mut recipe = Recipe::from_key(&row.key)?
                .with_duration(row.duration_hours)
                .with_workforce(row.workforce, row.workforce_amount)
                .with_exchanges(row.exchanges);
            if let Some(kind) = row.kind {
                recipe = recipe.with_kind(kind);
            }
            builder.add_recipe(recipe)?;
        }

        for row in self.quotes {
            let quote = MarketQuote::new(row.ask, row.bid)
                .with_depth(row.supply, row.demand)
                .with_traded_volume(row.traded_volume);
            builder.add_quote(row.ticker, row.exchange, quote)?;
        }

        for row in self.concentrations {
            builder.add_concentration(row.location, row.ticker, row.factor)?;
        }

        for row in self.fertilities {
            builder.add_fertility(row.location, row.fertility)?;
        }

        for row in self.workforce_needs {
            let to_needs = |rates: BTreeMap<String, f64>| -> Vec<Consumable> {
                rates
                    .into_iter()
                    .map(|(ticker, rate)| Consumable::new(ticker, rate))
                    .collect()
            };
            let needs = WorkforceNeeds {
                necessary: to_needs(row.necessary),
                luxury: to_needs(row.luxury),
            };
            builder.add_workforce_needs(row.workforce, needs)?;
        }

        let snapshot = builder.build();
        tracing::info!(
            materials = snapshot.material_count(),
            recipes = snapshot.recipe_count(),
            exchanges = snapshot.exchanges().count(),
            "catalog snapshot built"
        );
        Ok(snapshot)
    }
}

/// Reads a catalog file straight into a snapshot.
///
/// # Errors
///
/// Returns any [`LoadError`] from reading, parsing or validation.
pub fn load_catalog(path: impl AsRef<Path>) -> LoadResult<CatalogSnapshot> {
    CatalogFile::from_file(path)?.into_snapshot()
}
