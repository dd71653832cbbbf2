//! # Forgecost
//!
//! File-facing half of the tracker: reads `forgecost.toml` and catalog
//! files, hands the resulting snapshot to [`forgecost_economy`], and renders
//! what comes back as TOML.
//!
//! ## Example
//!
//! ```rust,ignore
//! use forgecost::{load_catalog, ForgecostConfig};
//! use forgecost_economy::EvaluationRequest;
//!
//! let config = ForgecostConfig::discover(None)?;
//! let snapshot = load_catalog("data/catalog.toml")?;
//! let evaluation = config.engine(&snapshot).evaluate(&EvaluationRequest::new("PE", "AI1"))?;
//! println!("{}", forgecost::report::render_evaluation(&evaluation)?);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog_file;
pub mod config;
pub mod error;
pub mod report;

pub use catalog_file::{load_catalog, CatalogFile};
pub use config::ForgecostConfig;
pub use error::{LoadError, LoadResult};
pub use report::CatalogSummary;
