//! Public value types for cosmic variance queries, results and traces, and
//! the [`CosmicVarianceFn`] trait implemented by estimators.

use crate::survey::Survey;
use serde::{Deserialize, Serialize};
use std::slice;

/// One stellar mass or a sequence of them, as `log10(M*/Msun)`.
///
/// Deserialises from either a bare number or an array so JSON queries keep
/// their scalar-or-sequence shape.
///
/// # Examples
///
/// ```
/// use cosmic_variance::Masses;
///
/// assert!(Masses::from(10.0).is_scalar());
/// assert_eq!(Masses::from(vec![10.0, 10.5]).as_slice(), &[10.0, 10.5]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Masses {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl Masses {
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// The masses as a slice; a scalar yields a single element.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(value) => slice::from_ref(value),
            Self::Sequence(values) => values,
        }
    }
}

impl From<f64> for Masses {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Masses {
    fn from(values: Vec<f64>) -> Self {
        Self::Sequence(values)
    }
}

impl From<&[f64]> for Masses {
    fn from(values: &[f64]) -> Self {
        Self::Sequence(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Masses {
    fn from(values: [f64; N]) -> Self {
        Self::Sequence(values.to_vec())
    }
}

/// Cosmic variance values with the same shape as the input [`Masses`].
///
/// Each value is the relative root cosmic variance `sigma_gg`, not its
/// square; [`Estimate::variance`] returns `sigma_gg^2`.
///
/// # Examples
///
/// ```
/// use cosmic_variance::{CosmicVarianceFn, FitTable, Query, VarianceEstimator};
///
/// let table = FitTable::moster2011();
/// let estimator = VarianceEstimator::new(&table);
/// let query = Query::new("COSMOS", 1.0, 0.2, 10.25);
/// let sigma = estimator.evaluate(&query)?.as_scalar().unwrap_or_default();
/// let estimate = &estimator.estimate(&query)?[0];
/// assert_eq!(sigma, estimate.sigma_gg);
/// assert_eq!(estimate.variance(), sigma * sigma);
/// # Ok::<(), cosmic_variance::EstimateError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variance {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl Variance {
    /// The value of a scalar result.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Sequence(_) => None,
        }
    }

    /// The values as a slice; a scalar yields a single element.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(value) => slice::from_ref(value),
            Self::Sequence(values) => values,
        }
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Reshape `values` to match `masses`.
    ///
    /// `values` must hold exactly one value per mass.
    pub(crate) fn shaped_like(masses: &Masses, mut values: Vec<f64>) -> Self {
        match (masses, values.pop()) {
            (Masses::Scalar(_), Some(value)) if values.is_empty() => Self::Scalar(value),
            (_, last) => {
                values.extend(last);
                Self::Sequence(values)
            }
        }
    }
}

/// Inputs for one cosmic variance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Query {
    pub survey: String,
    pub mean_z: f64,
    /// Full width of the redshift bin.
    pub delta_z: f64,
    pub log_m_stellar: Masses,
}

impl Query {
    #[must_use]
    pub fn new(
        survey: impl Into<String>,
        mean_z: f64,
        delta_z: f64,
        log_m_stellar: impl Into<Masses>,
    ) -> Self {
        Self {
            survey: survey.into(),
            mean_z,
            delta_z,
            log_m_stellar: log_m_stellar.into(),
        }
    }
}

/// Tabulated sample whose bias coefficients were used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// A stellar-mass bin centred on `log_mass`.
    Bin { log_mass: f64 },
    /// All galaxies above `min_log_mass`.
    Threshold { min_log_mass: f64 },
}

/// Breakdown of a single cosmic variance value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub survey: Survey,
    /// Label of the redshift bin whose coefficients were used.
    pub redshift_bin: String,
    /// The mass as supplied, before snapping.
    pub log_m_stellar: f64,
    pub selection: Selection,
    /// Dark-matter root cosmic variance for a bin of width 0.2.
    pub sigma_dm: f64,
    pub galaxy_bias: f64,
    /// Galaxy root cosmic variance for the requested bin width.
    pub sigma_gg: f64,
}

impl Estimate {
    /// Squared root cosmic variance.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "squaring sigma")]
    pub fn variance(&self) -> f64 {
        self.sigma_gg * self.sigma_gg
    }
}

/// Diagnostic trace for a cosmic variance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub query: Query,
    /// One estimate per input mass, in input order.
    pub estimates: Vec<Estimate>,
}

/// Trait for evaluating cosmic variance queries.
pub trait CosmicVarianceFn {
    /// Error type returned when evaluation fails.
    type Error: std::error::Error + Send + Sync;

    /// Evaluate the root cosmic variance for every mass in the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is rejected.
    fn evaluate(&self, query: &Query) -> Result<Variance, Self::Error>;

    /// Produce a diagnostic trace for a query.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is rejected.
    fn trace(&self, query: &Query) -> Result<Trace, Self::Error>;
}
