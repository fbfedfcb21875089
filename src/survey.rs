//! Survey fields covered by the cookbook fits.

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A survey field with published cosmic-variance fit parameters.
///
/// # Examples
///
/// ```
/// use cosmic_variance::Survey;
///
/// let survey: Survey = "cosmos".parse().expect("known survey");
/// assert_eq!(survey, Survey::Cosmos);
/// assert_eq!(survey.to_string(), "COSMOS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Survey {
    /// Hubble Ultra Deep Field.
    Udf,
    /// Great Observatories Origins Deep Survey.
    Goods,
    /// Galaxy Evolution from Morphology and SEDs.
    Gems,
    /// Extended Groth Strip.
    Egs,
    /// Cosmic Evolution Survey.
    Cosmos,
}

impl Survey {
    /// Every survey, in cookbook table order.
    pub const ALL: [Self; 5] = [Self::Udf, Self::Goods, Self::Gems, Self::Egs, Self::Cosmos];

    /// Canonical upper-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Udf => "UDF",
            Self::Goods => "GOODS",
            Self::Gems => "GEMS",
            Self::Egs => "EGS",
            Self::Cosmos => "COSMOS",
        }
    }
}

impl fmt::Display for Survey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Survey {
    type Err = EstimateError;

    /// Parse a survey identifier, ignoring ASCII case and surrounding
    /// whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnknownSurvey`] for any other name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|survey| survey.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EstimateError::UnknownSurvey { name: s.to_owned() })
    }
}
