//! Estimator configuration types and serialisation.
//!
//! Every field has a default, so an empty TOML file or JSON object yields
//! [`EstimatorConfig::default`].

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How masses above the highest tabulated bin are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighMassPolicy {
    /// Snap to the nearest mass bin, i.e. the highest one.
    #[default]
    Nearest,
    /// Use the highest threshold sample whose lower limit does not exceed
    /// the mass, falling back to the highest bin when there is none.
    Threshold,
}

/// How the mean redshift is matched against redshift bins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedshiftPolicy {
    /// Use the bin with the nearest centre, wherever `mean_z` falls.
    #[default]
    Nearest,
    /// Use the nearest bin only when it covers `mean_z`.
    Strict,
}

/// Configuration for [`VarianceEstimator`](crate::estimator::VarianceEstimator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    pub high_mass: HighMassPolicy,
    pub redshift: RedshiftPolicy,
    /// Smallest accepted `log10(M*/Msun)`.
    pub min_log_mass: f64,
    /// Largest accepted `log10(M*/Msun)`; must exceed `min_log_mass`.
    pub max_log_mass: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            high_mass: HighMassPolicy::default(),
            redshift: RedshiftPolicy::default(),
            min_log_mass: 0.0,
            max_log_mass: 15.0,
        }
    }
}

impl EstimatorConfig {
    /// Ensure the configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if either mass limit is non-finite or
    /// `min_log_mass >= max_log_mass`.
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self, String> {
        if !self.min_log_mass.is_finite() || !self.max_log_mass.is_finite() {
            Err("log-mass limits must be finite".into())
        } else if self.min_log_mass >= self.max_log_mass {
            Err(format!(
                "min_log_mass ({}) must be less than max_log_mass ({})",
                self.min_log_mass, self.max_log_mass
            ))
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a TOML file layered over the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use cosmic_variance::config::{EstimatorConfig, HighMassPolicy};
    /// use std::io::Write;
    /// use tempfile::NamedTempFile;
    ///
    /// let mut file = NamedTempFile::new().expect("create temp file");
    /// writeln!(file, "high_mass = \"threshold\"").expect("write config");
    /// let cfg = EstimatorConfig::load_from_config(file.path()).expect("load config");
    /// assert_eq!(cfg.high_mass, HighMassPolicy::Threshold);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file cannot be read or parsed and
    /// [`ConfigError::Invalid`] if the values fail [`Self::validate`].
    pub fn load_from_config(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(Box::new)?;
        cfg.validate().map_err(ConfigError::Invalid)
    }
}
