//! Fit parameters from Moster et al. (2011), "A Cosmic Variance Cookbook".
//!
//! Field coefficients come from Table 3 and galaxy bias coefficients from
//! Table 4. The bias fits are redshift independent, so each survey carries
//! a single bin spanning the redshift range the cookbook covers.

use super::{MassEntry, RedshiftBin, SurveyFit, ThresholdEntry};
use crate::{
    formula::{BiasCoefficients, FieldCoefficients},
    survey::Survey,
};

const BIN_LABEL: &str = "0<z<4";
const BIN_MEAN_Z: f64 = 2.0;
const BIN_HALF_WIDTH: f64 = 2.0;

/// Table 3: `(sigma_a, sigma_b, beta)` per field.
const FIELDS: [(Survey, FieldCoefficients); 5] = [
    (Survey::Udf, FieldCoefficients::new(0.251, 0.364, 0.358)),
    (Survey::Goods, FieldCoefficients::new(0.261, 0.854, 0.684)),
    (Survey::Gems, FieldCoefficients::new(0.161, 0.520, 0.729)),
    (Survey::Egs, FieldCoefficients::new(0.128, 0.383, 0.673)),
    (Survey::Cosmos, FieldCoefficients::new(0.069, 0.234, 0.834)),
];

/// Table 4, stellar-mass bins of width 0.5 dex: `(log_mass, b0, b1, b2)`.
const MASS_BINS: [(f64, f64, f64, f64); 6] = [
    (8.75, 0.062, 2.59, 1.025),
    (9.25, 0.074, 2.58, 1.039),
    (9.75, 0.042, 3.17, 1.147),
    (10.25, 0.053, 3.07, 1.225),
    (10.75, 0.069, 3.19, 1.269),
    (11.25, 0.173, 2.89, 1.438),
];

/// Table 4, threshold samples: `(min_log_mass, b0, b1, b2)`.
const THRESHOLDS: [(f64, f64, f64, f64); 6] = [
    (8.5, 0.063, 2.62, 1.104),
    (9.0, 0.085, 2.50, 1.098),
    (9.5, 0.058, 2.96, 1.192),
    (10.0, 0.072, 2.90, 1.257),
    (10.5, 0.093, 3.02, 1.332),
    (11.0, 0.185, 2.86, 1.448),
];

fn cookbook_bin() -> RedshiftBin {
    RedshiftBin {
        label: BIN_LABEL.to_owned(),
        mean_z: BIN_MEAN_Z,
        half_width: BIN_HALF_WIDTH,
        masses: MASS_BINS
            .iter()
            .map(|&(log_mass, b0, b1, b2)| MassEntry {
                log_mass,
                bias: BiasCoefficients::new(b0, b1, b2),
            })
            .collect(),
        thresholds: THRESHOLDS
            .iter()
            .map(|&(min_log_mass, b0, b1, b2)| ThresholdEntry {
                min_log_mass,
                bias: BiasCoefficients::new(b0, b1, b2),
            })
            .collect(),
    }
}

pub(super) fn survey_fits() -> Vec<SurveyFit> {
    FIELDS
        .iter()
        .map(|&(survey, field)| SurveyFit {
            survey,
            field,
            bins: vec![cookbook_bin()],
        })
        .collect()
}
