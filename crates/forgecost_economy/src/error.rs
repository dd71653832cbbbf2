//! # Economy Error Types
//!
//! Hard errors only. Missing prices, tier-0 materials and recipe cycles are
//! not errors: they resolve to values and are reported via
//! [`Diagnostics`](crate::cost::Diagnostics).

use thiserror::Error;

/// Errors that can occur in the economy engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomyError {
    /// The catalog data contract was violated while building a snapshot.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A recipe key string could not be parsed.
    #[error("cannot parse recipe key '{key}': {reason}")]
    RecipeKeyParse {
        /// The offending key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The requested material is not in the catalog.
    #[error("material not found: {0}")]
    MaterialNotFound(String),

    /// The requested exchange has no quotes in the catalog.
    #[error("exchange not found: {0}")]
    ExchangeNotFound(String),

    /// The requested location has no resource factors in the catalog.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// An explicitly requested recipe does not produce the ticker on the exchange.
    #[error("recipe {recipe_id} not found for {ticker} on {exchange}")]
    RecipeNotFound {
        /// The requested recipe id.
        recipe_id: String,
        /// The target material.
        ticker: String,
        /// The target exchange.
        exchange: String,
    },

    /// Efficiency inputs are out of their valid range.
    #[error("invalid efficiency input: {0}")]
    InvalidEfficiency(String),
}

impl EconomyError {
    /// Returns true for "the user asked for something that does not exist".
    #[must_use]
    pub const fn is_invalid_selection(&self) -> bool {
        matches!(
            self,
            Self::MaterialNotFound(_)
                | Self::ExchangeNotFound(_)
                | Self::LocationNotFound(_)
                | Self::RecipeNotFound { .. }
        )
    }
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
