//! Closed-form cosmic variance equations from Moster et al. (2011).
//!
//! The cookbook splits the galaxy root cosmic variance into two factors:
//! - [`FieldCoefficients::dark_matter_sigma`] gives the dark-matter root
//!   variance of a field for a bin of width [`REFERENCE_DELTA_Z`]
//!   (equation 10).
//! - [`BiasCoefficients::galaxy_bias`] gives the bias of galaxies in a
//!   stellar-mass bin relative to dark matter (equation 13).
//!
//! Their product is rescaled to the requested bin width by
//! [`scale_to_bin_width`].

use serde::{Deserialize, Serialize};

/// Redshift bin width at which the dark-matter fits are tabulated.
pub const REFERENCE_DELTA_Z: f64 = 0.2;

/// Field-dependent fit parameters for equation 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCoefficients {
    pub sigma_a: f64,
    pub sigma_b: f64,
    pub beta: f64,
}

impl FieldCoefficients {
    #[must_use]
    pub const fn new(sigma_a: f64, sigma_b: f64, beta: f64) -> Self {
        Self {
            sigma_a,
            sigma_b,
            beta,
        }
    }

    /// Dark-matter root cosmic variance at `mean_z` for a bin of width
    /// [`REFERENCE_DELTA_Z`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cosmic_variance::formula::FieldCoefficients;
    ///
    /// let cosmos = FieldCoefficients::new(0.069, 0.234, 0.834);
    /// let sigma = cosmos.dark_matter_sigma(1.0);
    /// assert!((sigma - 0.069 / 1.234).abs() < 1e-12);
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "equation 10")]
    pub fn dark_matter_sigma(&self, mean_z: f64) -> f64 {
        self.sigma_a / (mean_z.powf(self.beta) + self.sigma_b)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.sigma_a.is_finite() && self.sigma_b.is_finite() && self.beta.is_finite()
    }

    /// Whether equation 10 stays finite and non-negative for every
    /// `mean_z >= 0`: `sigma_a >= 0` and `sigma_b > 0`.
    pub(crate) fn is_well_posed(&self) -> bool {
        self.sigma_a >= 0.0 && self.sigma_b > 0.0
    }
}

/// Stellar-mass-dependent galaxy bias parameters for equation 13.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
}

impl BiasCoefficients {
    #[must_use]
    pub const fn new(b0: f64, b1: f64, b2: f64) -> Self {
        Self { b0, b1, b2 }
    }

    /// Galaxy bias at `mean_z`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "equation 13")]
    pub fn galaxy_bias(&self, mean_z: f64) -> f64 {
        self.b0 * (mean_z + 1.0).powf(self.b1) + self.b2
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.b0.is_finite() && self.b1.is_finite() && self.b2.is_finite()
    }

    /// Whether equation 13 is non-negative for every `mean_z >= 0`.
    pub(crate) fn is_non_negative(&self) -> bool {
        self.b0 >= 0.0 && self.b2 >= 0.0
    }
}

/// Rescale a root variance computed for [`REFERENCE_DELTA_Z`] to a bin of
/// width `delta_z`.
///
/// Returns infinity for `delta_z == 0`; callers reject that input first.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "bin width scaling")]
pub fn scale_to_bin_width(sigma: f64, delta_z: f64) -> f64 {
    sigma * (REFERENCE_DELTA_Z / delta_z).sqrt()
}

/// Galaxy root cosmic variance for one field, bias sample and redshift bin.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "bias times dark-matter variance")]
pub fn galaxy_sigma(
    field: &FieldCoefficients,
    bias: &BiasCoefficients,
    mean_z: f64,
    delta_z: f64,
) -> f64 {
    let sigma_dm = field.dark_matter_sigma(mean_z);
    scale_to_bin_width(bias.galaxy_bias(mean_z) * sigma_dm, delta_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::approx_eq;
    use rstest::rstest;

    const COSMOS: FieldCoefficients = FieldCoefficients::new(0.069, 0.234, 0.834);
    const BIAS_10_25: BiasCoefficients = BiasCoefficients::new(0.053, 3.07, 1.225);

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "expected value")]
    fn dark_matter_sigma_at_zero_redshift() {
        assert!(approx_eq(COSMOS.dark_matter_sigma(0.0), 0.069 / 0.234, 1e-12));
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "expected value")]
    fn dark_matter_sigma_falls_with_redshift() {
        let low = COSMOS.dark_matter_sigma(0.5);
        let high = COSMOS.dark_matter_sigma(3.0);
        assert!(high < low);
        assert!(approx_eq(COSMOS.dark_matter_sigma(1.0), 0.069 / 1.234, 1e-12));
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "expected value")]
    fn galaxy_bias_at_zero_redshift() {
        assert!(approx_eq(BIAS_10_25.galaxy_bias(0.0), 0.053 + 1.225, 1e-12));
    }

    #[rstest]
    #[case(0.2, 1.0)]
    #[case(0.8, 0.5)]
    #[case(0.05, 2.0)]
    fn bin_width_scaling(#[case] delta_z: f64, #[case] factor: f64) {
        assert!(approx_eq(scale_to_bin_width(1.0, delta_z), factor, 1e-12));
    }

    #[rstest]
    fn galaxy_sigma_matches_cookbook_value() {
        let sigma = galaxy_sigma(&COSMOS, &BIAS_10_25, 0.5, 0.2);
        assert!(approx_eq(sigma, 0.122_297_054_013_481_72, 1e-12));
    }
}
