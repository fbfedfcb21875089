//! Immutable tables of cosmic-variance fit coefficients.
//!
//! A [`FitTable`] maps each [`Survey`] to its field coefficients and an
//! ordered list of [`RedshiftBin`]s. Each bin carries ascending stellar-mass
//! entries and, optionally, mass-threshold samples. Tables are validated on
//! construction and never change afterwards, so a single table can be
//! shared by any number of estimators and threads.

mod moster2011;

use crate::{
    error::TableError,
    formula::{BiasCoefficients, FieldCoefficients},
    snap::nearest_index,
    survey::Survey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bias coefficients tabulated for one stellar-mass bin centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassEntry {
    pub log_mass: f64,
    pub bias: BiasCoefficients,
}

/// Bias coefficients tabulated for all galaxies above a mass limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub min_log_mass: f64,
    pub bias: BiasCoefficients,
}

/// A redshift slice with its stellar-mass coefficient sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedshiftBin {
    pub label: String,
    pub mean_z: f64,
    pub half_width: f64,
    /// Strictly ascending by `log_mass`.
    pub masses: Vec<MassEntry>,
    /// Strictly ascending by `min_log_mass`; may be empty.
    pub thresholds: Vec<ThresholdEntry>,
}

impl RedshiftBin {
    /// Whether `mean_z` lies within `[mean_z - half_width, mean_z + half_width]`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "bin edges")]
    pub fn contains(&self, mean_z: f64) -> bool {
        (self.mean_z - self.half_width..=self.mean_z + self.half_width).contains(&mean_z)
    }

    /// Mass entry nearest to `log_mass`; midpoints resolve to the lower entry.
    ///
    /// Returns [`None`] only for a bin without mass entries, which
    /// [`FitTable::new`] rejects.
    #[must_use]
    pub fn nearest_mass(&self, log_mass: f64) -> Option<&MassEntry> {
        nearest_index(self.masses.iter().map(|m| m.log_mass), log_mass)
            .and_then(|index| self.masses.get(index))
    }

    /// Threshold entry nearest to `min_log_mass`; midpoints resolve to the
    /// lower limit.
    #[must_use]
    pub fn nearest_threshold(&self, min_log_mass: f64) -> Option<&ThresholdEntry> {
        nearest_index(self.thresholds.iter().map(|t| t.min_log_mass), min_log_mass)
            .and_then(|index| self.thresholds.get(index))
    }

    /// Upper edge of the highest mass bin: its centre plus half the spacing
    /// to the bin below. A single-entry bin has its edge at the centre.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "bin edge")]
    pub fn upper_mass_edge(&self) -> Option<f64> {
        let (top, rest) = self.masses.split_last()?;
        let half_spacing = rest
            .last()
            .map_or(0.0, |below| (top.log_mass - below.log_mass) / 2.0);
        Some(top.log_mass + half_spacing)
    }

    /// Highest threshold sample whose lower limit does not exceed `log_mass`.
    #[must_use]
    pub fn threshold_below(&self, log_mass: f64) -> Option<&ThresholdEntry> {
        self.thresholds
            .iter()
            .rev()
            .find(|t| t.min_log_mass <= log_mass)
    }

    fn validate(&self, survey: Survey) -> Result<(), TableError> {
        let non_finite = |what: String| TableError::NonFinite { survey, what };
        if !self.mean_z.is_finite() || !self.half_width.is_finite() {
            return Err(non_finite(format!("redshift bin `{}`", self.label)));
        }
        if self.half_width < 0.0 {
            return Err(TableError::NegativeHalfWidth {
                survey,
                label: self.label.clone(),
                half_width: self.half_width,
            });
        }
        if self.masses.is_empty() {
            return Err(TableError::EmptyBin {
                survey,
                label: self.label.clone(),
            });
        }
        let negative_bias = |what: String| TableError::OutOfRange {
            survey,
            what,
            requirement: "b0 >= 0 and b2 >= 0",
        };
        for entry in &self.masses {
            let what = || format!("mass entry {} in bin `{}`", entry.log_mass, self.label);
            if !entry.log_mass.is_finite() || !entry.bias.is_finite() {
                return Err(non_finite(what()));
            }
            if !entry.bias.is_non_negative() {
                return Err(negative_bias(what()));
            }
        }
        for entry in &self.thresholds {
            let what = || {
                format!(
                    "threshold entry {} in bin `{}`",
                    entry.min_log_mass, self.label
                )
            };
            if !entry.min_log_mass.is_finite() || !entry.bias.is_finite() {
                return Err(non_finite(what()));
            }
            if !entry.bias.is_non_negative() {
                return Err(negative_bias(what()));
            }
        }
        let unordered = |what| TableError::Unordered {
            survey,
            label: self.label.clone(),
            what,
        };
        if !strictly_ascending(self.masses.iter().map(|m| m.log_mass)) {
            return Err(unordered("stellar-mass entries"));
        }
        if !strictly_ascending(self.thresholds.iter().map(|t| t.min_log_mass)) {
            return Err(unordered("threshold entries"));
        }
        Ok(())
    }
}

fn strictly_ascending(values: impl Iterator<Item = f64>) -> bool {
    let values: Vec<f64> = values.collect();
    values.windows(2).all(|pair| pair[0] < pair[1])
}

/// Fit coefficients for one survey field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyFit {
    pub survey: Survey,
    pub field: FieldCoefficients,
    /// Scanned in order; the first of two equally close bins wins.
    pub bins: Vec<RedshiftBin>,
}

impl SurveyFit {
    /// Bin whose centre is nearest to `mean_z`.
    #[must_use]
    pub fn nearest_bin(&self, mean_z: f64) -> Option<&RedshiftBin> {
        nearest_index(self.bins.iter().map(|b| b.mean_z), mean_z)
            .and_then(|index| self.bins.get(index))
    }
}

/// Read-only lookup table of fit coefficients keyed by survey.
#[derive(Debug, Clone, PartialEq)]
pub struct FitTable {
    surveys: BTreeMap<Survey, SurveyFit>,
}

impl FitTable {
    /// Build a table from custom fits.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if a survey is listed twice, any number is
    /// non-finite, a bin has no mass entries or a negative half-width,
    /// entries are not strictly ascending, or coefficients could yield a
    /// negative or infinite cosmic variance for `mean_z >= 0`.
    pub fn new(fits: Vec<SurveyFit>) -> Result<Self, TableError> {
        let mut surveys = BTreeMap::new();
        for fit in fits {
            if !fit.field.is_finite() {
                return Err(TableError::NonFinite {
                    survey: fit.survey,
                    what: "field coefficients".to_owned(),
                });
            }
            if !fit.field.is_well_posed() {
                return Err(TableError::OutOfRange {
                    survey: fit.survey,
                    what: "field coefficients".to_owned(),
                    requirement: "sigma_a >= 0 and sigma_b > 0",
                });
            }
            for bin in &fit.bins {
                bin.validate(fit.survey)?;
            }
            let survey = fit.survey;
            if surveys.insert(survey, fit).is_some() {
                return Err(TableError::DuplicateSurvey(survey));
            }
        }
        Ok(Self { surveys })
    }

    /// The embedded Moster et al. (2011) cookbook table.
    ///
    /// # Examples
    ///
    /// ```
    /// use cosmic_variance::{FitTable, Survey};
    ///
    /// let table = FitTable::moster2011();
    /// assert!(table.survey(Survey::Cosmos).is_some());
    /// ```
    #[must_use]
    pub fn moster2011() -> Self {
        let surveys = moster2011::survey_fits()
            .into_iter()
            .map(|fit| (fit.survey, fit))
            .collect();
        Self { surveys }
    }

    /// Fit for `survey`, if the table defines one.
    #[must_use]
    pub fn survey(&self, survey: Survey) -> Option<&SurveyFit> {
        self.surveys.get(&survey)
    }

    /// All survey fits in [`Survey`] order.
    pub fn surveys(&self) -> impl Iterator<Item = &SurveyFit> {
        self.surveys.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const BIAS: BiasCoefficients = BiasCoefficients::new(0.05, 3.0, 1.2);

    fn bin(label: &str, mean_z: f64, half_width: f64, masses: &[f64]) -> RedshiftBin {
        RedshiftBin {
            label: label.to_owned(),
            mean_z,
            half_width,
            masses: masses
                .iter()
                .map(|&log_mass| MassEntry { log_mass, bias: BIAS })
                .collect(),
            thresholds: Vec::new(),
        }
    }

    fn fit(survey: Survey, bins: Vec<RedshiftBin>) -> SurveyFit {
        SurveyFit {
            survey,
            field: FieldCoefficients::new(0.1, 0.3, 0.7),
            bins,
        }
    }

    #[fixture]
    fn cosmos_bin() -> RedshiftBin {
        let table = FitTable::moster2011();
        table
            .survey(Survey::Cosmos)
            .and_then(|fit| fit.bins.first())
            .cloned()
            .unwrap_or_else(|| panic!("embedded COSMOS bin"))
    }

    #[rstest]
    fn embedded_table_passes_validation() {
        let table = FitTable::moster2011();
        let fits: Vec<SurveyFit> = table.surveys().cloned().collect();
        assert_eq!(fits.len(), Survey::ALL.len());
        assert_eq!(FitTable::new(fits), Ok(table));
    }

    #[rstest]
    #[case(10.0, 9.75)]
    #[case(10.2, 10.25)]
    #[case(10.5, 10.25)]
    #[case(12.0, 11.25)]
    #[case(7.0, 8.75)]
    fn nearest_mass_in_embedded_bin(
        cosmos_bin: RedshiftBin,
        #[case] log_mass: f64,
        #[case] expected: f64,
    ) {
        let entry = cosmos_bin
            .nearest_mass(log_mass)
            .unwrap_or_else(|| panic!("mass entry"));
        assert_eq!(entry.log_mass.to_bits(), expected.to_bits());
    }

    #[rstest]
    #[case(11.0, Some(11.0))]
    #[case(10.9, Some(10.5))]
    #[case(11.7, Some(11.0))]
    #[case(8.0, None)]
    fn threshold_below_picks_highest_limit(
        cosmos_bin: RedshiftBin,
        #[case] log_mass: f64,
        #[case] expected: Option<f64>,
    ) {
        let found = cosmos_bin.threshold_below(log_mass).map(|t| t.min_log_mass);
        assert_eq!(found, expected);
    }

    #[rstest]
    fn upper_edge_is_half_a_bin_above_top(cosmos_bin: RedshiftBin) {
        assert_eq!(cosmos_bin.upper_mass_edge(), Some(11.5));
    }

    #[rstest]
    fn single_entry_bin_edge_is_its_centre() {
        assert_eq!(bin("z1", 1.0, 0.5, &[10.0]).upper_mass_edge(), Some(10.0));
    }

    #[rstest]
    fn nearest_bin_prefers_first_on_tie() {
        let survey = fit(
            Survey::Egs,
            vec![bin("low", 1.0, 0.5, &[10.0]), bin("high", 2.0, 0.5, &[10.0])],
        );
        let chosen = survey
            .nearest_bin(1.5)
            .unwrap_or_else(|| panic!("bin selected"));
        assert_eq!(chosen.label, "low");
        let chosen = survey
            .nearest_bin(1.6)
            .unwrap_or_else(|| panic!("bin selected"));
        assert_eq!(chosen.label, "high");
    }

    #[rstest]
    #[case(0.5, true)]
    #[case(1.5, true)]
    #[case(1.51, false)]
    #[case(0.0, false)]
    fn bin_contains_edges(#[case] mean_z: f64, #[case] expected: bool) {
        assert_eq!(bin("z1", 1.0, 0.5, &[10.0]).contains(mean_z), expected);
    }

    #[rstest]
    fn rejects_duplicate_survey() {
        let fits = vec![
            fit(Survey::Udf, vec![bin("a", 1.0, 0.5, &[10.0])]),
            fit(Survey::Udf, vec![bin("b", 2.0, 0.5, &[10.0])]),
        ];
        assert_eq!(
            FitTable::new(fits),
            Err(TableError::DuplicateSurvey(Survey::Udf))
        );
    }

    #[rstest]
    fn rejects_empty_bin() {
        let fits = vec![fit(Survey::Gems, vec![bin("a", 1.0, 0.5, &[])])];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::EmptyBin { survey: Survey::Gems, .. })
        ));
    }

    #[rstest]
    #[case(&[10.0, 9.5])]
    #[case(&[10.0, 10.0])]
    fn rejects_unordered_masses(#[case] masses: &[f64]) {
        let fits = vec![fit(Survey::Goods, vec![bin("a", 1.0, 0.5, masses)])];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::Unordered { .. })
        ));
    }

    #[rstest]
    fn rejects_negative_half_width() {
        let fits = vec![fit(Survey::Goods, vec![bin("a", 1.0, -0.5, &[10.0])])];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::NegativeHalfWidth { .. })
        ));
    }

    #[rstest]
    fn rejects_non_finite_mass() {
        let fits = vec![fit(Survey::Cosmos, vec![bin("a", 1.0, 0.5, &[f64::NAN])])];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::NonFinite { .. })
        ));
    }

    #[rstest]
    #[case(FieldCoefficients::new(-0.1, 0.3, 0.7))]
    #[case(FieldCoefficients::new(0.1, 0.0, 0.7))]
    #[case(FieldCoefficients::new(0.1, -0.3, 0.7))]
    fn rejects_ill_posed_field(#[case] field: FieldCoefficients) {
        let fits = vec![SurveyFit {
            field,
            ..fit(Survey::Egs, vec![bin("a", 1.0, 0.5, &[10.0])])
        }];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::OutOfRange { survey: Survey::Egs, .. })
        ));
    }

    #[rstest]
    #[case(BiasCoefficients::new(-0.05, 3.0, 1.2))]
    #[case(BiasCoefficients::new(0.05, 3.0, -1.2))]
    fn rejects_negative_bias(#[case] bias: BiasCoefficients) {
        let mut masses_bin = bin("a", 1.0, 0.5, &[10.0]);
        masses_bin.masses[0].bias = bias;
        let fits = vec![fit(Survey::Udf, vec![masses_bin])];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::OutOfRange { .. })
        ));

        let mut thresholds_bin = bin("b", 1.0, 0.5, &[10.0]);
        thresholds_bin.thresholds.push(ThresholdEntry {
            min_log_mass: 10.0,
            bias,
        });
        let fits = vec![fit(Survey::Udf, vec![thresholds_bin])];
        assert!(matches!(
            FitTable::new(fits),
            Err(TableError::OutOfRange { .. })
        ));
    }

    #[rstest]
    fn survey_without_bins_is_allowed() {
        let table = FitTable::new(vec![fit(Survey::Udf, Vec::new())])
            .unwrap_or_else(|e| panic!("valid table: {e}"));
        let udf = table
            .survey(Survey::Udf)
            .unwrap_or_else(|| panic!("UDF fit"));
        assert!(udf.nearest_bin(1.0).is_none());
        assert!(table.survey(Survey::Cosmos).is_none());
    }
}
