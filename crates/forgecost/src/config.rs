//! # Configuration
//!
//! `forgecost.toml` tunes the engine. Every section and key is optional;
//! anything left out keeps its default.
//!
//! ```toml
//! [engine]
//! max_depth = 64
//!
//! [arbitrage]
//! min_profit_pct = 5.0
//! min_supply = 0.0
//! min_demand = 0.0
//!
//! [catalog]
//! path = "data/catalog.toml"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use forgecost_economy::{ArbitrageConfig, CatalogSnapshot, ProfitabilityEngine, ResolverConfig};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};

/// File looked for in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "forgecost.toml";

/// Where the catalog comes from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Catalog file path.
    pub path: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgecostConfig {
    /// Cost resolver settings.
    pub engine: ResolverConfig,
    /// Arbitrage thresholds.
    pub arbitrage: ArbitrageConfig,
    /// Catalog location.
    pub catalog: CatalogSection,
}

impl ForgecostConfig {
    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed TOML or mistyped keys.
    pub fn from_toml_str(text: &str) -> LoadResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read and
    /// [`LoadError::Parse`] if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Reads `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly given file is missing, or any file
    /// that is read is malformed.
    pub fn discover(path: Option<&Path>) -> LoadResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// The configured catalog path.
    ///
    /// A relative path is taken relative to the directory holding
    /// `config_file`, the file these settings were read from.
    #[must_use]
    pub fn catalog_path(&self, config_file: Option<&Path>) -> Option<PathBuf> {
        let path = self.catalog.path.as_ref()?;
        let base = config_file.and_then(Path::parent);
        match base {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.clone()),
        }
    }

    /// Builds an engine over `snapshot` with these settings.
    #[must_use]
    pub fn engine<'a>(&self, snapshot: &'a CatalogSnapshot) -> ProfitabilityEngine<'a> {
        ProfitabilityEngine::new(snapshot)
            .with_resolver_config(self.engine)
            .with_arbitrage_config(self.arbitrage)
    }
}
