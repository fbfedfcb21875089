//! Core library entry point.
//!
//! Estimates galaxy cosmic variance for deep survey fields using the fit
//! tables of Moster et al. (2011), "A Cosmic Variance Cookbook".
//! Re-exports the public types and traits.

pub mod api;
pub mod config;
pub mod error;
pub mod estimator;
pub mod formula;
pub mod snap;
pub mod survey;
pub mod table;

pub use api::{CosmicVarianceFn, Estimate, Masses, Query, Selection, Trace, Variance};
pub use config::{EstimatorConfig, HighMassPolicy, RedshiftPolicy};
pub use error::{ConfigError, EstimateError, InputField, TableError};
pub use estimator::VarianceEstimator;
pub use survey::Survey;
pub use table::FitTable;

#[doc(hidden)]
pub mod tests;
