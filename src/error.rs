//! Error types returned by the estimator, table construction and config
//! loading.

use crate::survey::Survey;
use std::fmt;
use thiserror::Error;

/// Input value rejected by [`EstimateError::InvalidInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    MeanZ,
    DeltaZ,
    /// A stellar mass; `Some(index)` when the input was a sequence.
    LogMStellar(Option<usize>),
    /// The lower limit of a threshold sample.
    MinLogMass,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MeanZ => f.write_str("mean_z"),
            Self::DeltaZ => f.write_str("delta_z"),
            Self::LogMStellar(None) => f.write_str("log_m_stellar"),
            Self::LogMStellar(Some(index)) => write!(f, "log_m_stellar[{index}]"),
            Self::MinLogMass => f.write_str("min_log_mass"),
        }
    }
}

/// Errors returned while estimating cosmic variance.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EstimateError {
    /// The survey name is not one of the enumerated surveys.
    #[error("unknown survey `{name}`; expected one of UDF, GOODS, GEMS, EGS, COSMOS")]
    UnknownSurvey { name: String },
    /// A numeric input is non-finite or outside its physical domain.
    #[error("{field} must be {requirement} but was {value}")]
    InvalidInput {
        field: InputField,
        value: f64,
        requirement: &'static str,
    },
    /// The table defines no redshift bin usable for this survey and redshift.
    #[error("no redshift bin for {survey} supports mean redshift {mean_z}")]
    UnsupportedBin { survey: Survey, mean_z: f64 },
}

/// Errors returned by [`FitTable::new`](crate::table::FitTable::new).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableError {
    #[error("survey {0} appears more than once")]
    DuplicateSurvey(Survey),
    #[error("redshift bin `{label}` of {survey} has no stellar-mass entries")]
    EmptyBin { survey: Survey, label: String },
    #[error("{what} of {survey} is not finite")]
    NonFinite { survey: Survey, what: String },
    #[error("{what} of {survey} must satisfy {requirement}")]
    OutOfRange {
        survey: Survey,
        what: String,
        requirement: &'static str,
    },
    #[error("redshift bin `{label}` of {survey} has negative half-width {half_width}")]
    NegativeHalfWidth {
        survey: Survey,
        label: String,
        half_width: f64,
    },
    #[error("{what} in redshift bin `{label}` of {survey} are not strictly ascending")]
    Unordered {
        survey: Survey,
        label: String,
        what: &'static str,
    },
}

/// Errors returned while loading an
/// [`EstimatorConfig`](crate::config::EstimatorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
