//! Cosmic variance estimator over a [`FitTable`].
//!
//! For each query the estimator validates every input, picks the redshift
//! bin nearest to `mean_z`, snaps each stellar mass to its nearest
//! tabulated bin, and evaluates the cookbook formula with the actual
//! `mean_z` and `delta_z`. Nothing is evaluated until all inputs pass
//! validation, so a call either returns every value or an error.

use crate::{
    api::{CosmicVarianceFn, Estimate, Masses, Query, Selection, Trace, Variance},
    config::{EstimatorConfig, HighMassPolicy, RedshiftPolicy},
    error::{EstimateError, InputField},
    formula::{BiasCoefficients, galaxy_sigma},
    survey::Survey,
    table::{FitTable, RedshiftBin, SurveyFit},
};
use tracing::debug;

/// Estimates galaxy root cosmic variance from tabulated cookbook fits.
///
/// The estimator borrows its table, so one table built at start-up can
/// back any number of estimators across threads.
///
/// # Examples
///
/// ```
/// use cosmic_variance::{FitTable, VarianceEstimator};
///
/// let table = FitTable::moster2011();
/// let estimator = VarianceEstimator::new(&table);
/// let sigma = estimator
///     .compute("COSMOS", 1.25, 0.5, [10.0, 10.2, 10.4])
///     .expect("valid query");
/// assert_eq!(sigma.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct VarianceEstimator<'t> {
    table: &'t FitTable,
    config: EstimatorConfig,
}

/// Survey fit and redshift bin chosen for a query.
struct BinChoice<'t> {
    survey: Survey,
    fit: &'t SurveyFit,
    bin: &'t RedshiftBin,
}

impl<'t> VarianceEstimator<'t> {
    /// Create an estimator with the default configuration.
    #[must_use]
    pub fn new(table: &'t FitTable) -> Self {
        Self::with_config(table, EstimatorConfig::default())
    }

    /// Create an estimator with an explicit configuration.
    ///
    /// The configuration is used as given; call
    /// [`EstimatorConfig::validate`] first when it comes from user input.
    #[must_use]
    pub fn with_config(table: &'t FitTable, config: EstimatorConfig) -> Self {
        Self { table, config }
    }

    #[must_use]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Root cosmic variance for each stellar mass.
    ///
    /// A scalar `log_m_stellar` yields [`Variance::Scalar`]; a sequence
    /// yields a [`Variance::Sequence`] of the same length and order.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnknownSurvey`] for an unrecognised survey,
    /// [`EstimateError::InvalidInput`] for a non-finite or out-of-domain
    /// number or for a `mean_z` or `delta_z` that would overflow the result,
    /// and [`EstimateError::UnsupportedBin`] when the table has no
    /// usable redshift bin for the survey.
    pub fn compute(
        &self,
        survey: &str,
        mean_z: f64,
        delta_z: f64,
        log_m_stellar: impl Into<Masses>,
    ) -> Result<Variance, EstimateError> {
        let masses = log_m_stellar.into();
        let values = self
            .estimate_masses(survey, mean_z, delta_z, &masses)?
            .into_iter()
            .map(|estimate| estimate.sigma_gg)
            .collect();
        Ok(Variance::shaped_like(&masses, values))
    }

    /// Root cosmic variance for all galaxies above `min_log_mass`.
    ///
    /// `min_log_mass` snaps to the nearest tabulated threshold; midpoints
    /// resolve to the lower limit.
    ///
    /// # Errors
    ///
    /// As [`Self::compute`]; additionally [`EstimateError::UnsupportedBin`]
    /// when the chosen bin has no threshold samples.
    pub fn compute_threshold(
        &self,
        survey: &str,
        mean_z: f64,
        delta_z: f64,
        min_log_mass: f64,
    ) -> Result<Estimate, EstimateError> {
        let choice = self.choose_bin(survey, mean_z, delta_z)?;
        self.check_mass(InputField::MinLogMass, min_log_mass)?;
        let entry = choice.bin.nearest_threshold(min_log_mass).ok_or(
            EstimateError::UnsupportedBin {
                survey: choice.survey,
                mean_z,
            },
        )?;
        let estimate = evaluate(
            &choice,
            mean_z,
            delta_z,
            min_log_mass,
            Selection::Threshold {
                min_log_mass: entry.min_log_mass,
            },
            &entry.bias,
        );
        check_finite(&estimate, mean_z, delta_z)?;
        Ok(estimate)
    }

    /// Per-mass breakdown of a query, in input order.
    ///
    /// # Errors
    ///
    /// As [`Self::compute`].
    pub fn estimate(&self, query: &Query) -> Result<Vec<Estimate>, EstimateError> {
        self.estimate_masses(
            &query.survey,
            query.mean_z,
            query.delta_z,
            &query.log_m_stellar,
        )
    }

    fn estimate_masses(
        &self,
        survey: &str,
        mean_z: f64,
        delta_z: f64,
        masses: &Masses,
    ) -> Result<Vec<Estimate>, EstimateError> {
        let choice = self.choose_bin(survey, mean_z, delta_z)?;
        let values = masses.as_slice();
        for (index, &log_mass) in values.iter().enumerate() {
            let field = if masses.is_scalar() {
                InputField::LogMStellar(None)
            } else {
                InputField::LogMStellar(Some(index))
            };
            self.check_mass(field, log_mass)?;
        }
        debug!(
            survey = %choice.survey,
            redshift_bin = %choice.bin.label,
            mean_z,
            delta_z,
            count = values.len(),
            "computing cosmic variance"
        );
        let estimates = values
            .iter()
            .map(|&log_mass| {
                let (selection, bias) = self.select_mass(choice.bin, log_mass)?;
                Some(evaluate(&choice, mean_z, delta_z, log_mass, selection, bias))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(EstimateError::UnsupportedBin {
                survey: choice.survey,
                mean_z,
            })?;
        for estimate in &estimates {
            check_finite(estimate, mean_z, delta_z)?;
        }
        Ok(estimates)
    }

    fn choose_bin(
        &self,
        survey: &str,
        mean_z: f64,
        delta_z: f64,
    ) -> Result<BinChoice<'t>, EstimateError> {
        let survey: Survey = survey.parse()?;
        if !mean_z.is_finite() || mean_z < 0.0 {
            return Err(EstimateError::InvalidInput {
                field: InputField::MeanZ,
                value: mean_z,
                requirement: "finite and non-negative",
            });
        }
        if !delta_z.is_finite() || delta_z <= 0.0 {
            return Err(EstimateError::InvalidInput {
                field: InputField::DeltaZ,
                value: delta_z,
                requirement: "finite and greater than 0",
            });
        }
        let unsupported = EstimateError::UnsupportedBin { survey, mean_z };
        let fit = self.table.survey(survey).ok_or_else(|| unsupported.clone())?;
        let bin = fit.nearest_bin(mean_z).ok_or_else(|| unsupported.clone())?;
        if self.config.redshift == RedshiftPolicy::Strict && !bin.contains(mean_z) {
            return Err(unsupported);
        }
        Ok(BinChoice { survey, fit, bin })
    }

    fn check_mass(&self, field: InputField, log_mass: f64) -> Result<(), EstimateError> {
        let domain = self.config.min_log_mass..=self.config.max_log_mass;
        if log_mass.is_finite() && domain.contains(&log_mass) {
            Ok(())
        } else {
            Err(EstimateError::InvalidInput {
                field,
                value: log_mass,
                requirement: "finite and within the configured log-mass domain",
            })
        }
    }

    /// Pick the coefficients for one mass. [`None`] means the bin has no
    /// mass entries.
    fn select_mass<'b>(
        &self,
        bin: &'b RedshiftBin,
        log_mass: f64,
    ) -> Option<(Selection, &'b BiasCoefficients)> {
        let above_top = bin.upper_mass_edge().is_some_and(|edge| log_mass > edge);
        let threshold = (self.config.high_mass == HighMassPolicy::Threshold && above_top)
            .then(|| bin.threshold_below(log_mass))
            .flatten();
        if let Some(threshold) = threshold {
            debug!(
                log_m_stellar = log_mass,
                min_log_mass = threshold.min_log_mass,
                "mass above tabulated bins; using threshold sample"
            );
            let selection = Selection::Threshold {
                min_log_mass: threshold.min_log_mass,
            };
            return Some((selection, &threshold.bias));
        }
        let entry = bin.nearest_mass(log_mass)?;
        if entry.log_mass.to_bits() != log_mass.to_bits() {
            debug!(
                log_m_stellar = log_mass,
                snapped = entry.log_mass,
                "snapped stellar mass to tabulated bin"
            );
        }
        let selection = Selection::Bin {
            log_mass: entry.log_mass,
        };
        Some((selection, &entry.bias))
    }
}

fn evaluate(
    choice: &BinChoice<'_>,
    mean_z: f64,
    delta_z: f64,
    log_m_stellar: f64,
    selection: Selection,
    bias: &BiasCoefficients,
) -> Estimate {
    Estimate {
        survey: choice.survey,
        redshift_bin: choice.bin.label.clone(),
        log_m_stellar,
        selection,
        sigma_dm: choice.fit.field.dark_matter_sigma(mean_z),
        galaxy_bias: bias.galaxy_bias(mean_z),
        sigma_gg: galaxy_sigma(&choice.fit.field, bias, mean_z, delta_z),
    }
}

/// Reject inputs that overflow the formula, e.g. a huge `mean_z` or a
/// subnormal `delta_z`. The redshift factors are checked first so the error
/// names the input that overflowed.
fn check_finite(estimate: &Estimate, mean_z: f64, delta_z: f64) -> Result<(), EstimateError> {
    if !estimate.sigma_dm.is_finite() || !estimate.galaxy_bias.is_finite() {
        return Err(EstimateError::InvalidInput {
            field: InputField::MeanZ,
            value: mean_z,
            requirement: "small enough for a finite cosmic variance",
        });
    }
    if !estimate.sigma_gg.is_finite() {
        return Err(EstimateError::InvalidInput {
            field: InputField::DeltaZ,
            value: delta_z,
            requirement: "large enough for a finite cosmic variance",
        });
    }
    Ok(())
}

impl CosmicVarianceFn for VarianceEstimator<'_> {
    type Error = EstimateError;

    fn evaluate(&self, query: &Query) -> Result<Variance, Self::Error> {
        self.compute(
            &query.survey,
            query.mean_z,
            query.delta_z,
            query.log_m_stellar.clone(),
        )
    }

    fn trace(&self, query: &Query) -> Result<Trace, Self::Error> {
        self.estimate(query).map(|estimates| Trace {
            query: query.clone(),
            estimates,
        })
    }
}
