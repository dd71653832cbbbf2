//! Errors raised while reading configuration and catalog files.

use std::path::PathBuf;

use forgecost_economy::EconomyError;
use thiserror::Error;

/// Failure to turn a file into something the engine can use.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected layout.
    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The rows parsed but break the catalog data contract.
    #[error(transparent)]
    Catalog(#[from] EconomyError),
}

/// Result type for file loading.
pub type LoadResult<T> = Result<T, LoadError>;
