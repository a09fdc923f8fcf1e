use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XasCalcError};

/// One compound in the sample and how much of it the beam crosses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundContribution {
    /// Chemical formula, e.g. `LiNi0.5Mn0.25Co0.25O2`.
    #[serde(rename = "compound")]
    pub formula: String,
    /// Area density in g/cm².
    pub area_density: f64,
    #[serde(skip)]
    computed_absorption: Option<Vec<f64>>,
}

impl CompoundContribution {
    pub fn new(formula: impl Into<String>, area_density: f64) -> Self {
        CompoundContribution {
            formula: formula.into(),
            area_density,
            computed_absorption: None,
        }
    }

    /// Absorption of this compound alone on the model's grid, once computed.
    pub fn computed_absorption(&self) -> Option<&[f64]> {
        self.computed_absorption.as_deref()
    }

    pub(crate) fn set_computed_absorption(&mut self, absorption: Vec<f64>) {
        self.computed_absorption = Some(absorption);
    }

    pub(crate) fn clear_computed_absorption(&mut self) {
        self.computed_absorption = None;
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.area_density.is_finite() || self.area_density < 0.0 {
            return Err(XasCalcError::InvalidArgument(format!(
                "area density for '{}' must be finite and non-negative, got {}",
                self.formula, self.area_density
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CompoundContribution {
    /// `10.0 mg/cm² Fe`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} mg/cm² {}", self.area_density * 1000.0, self.formula)
    }
}

/// Joins element symbols and their amounts into a formula string.
///
/// `(["Li", "Ni", "O"], [1.0, 0.5, 2.0])` gives `Li1Ni0.5O2`.
pub fn compound_formula<S: AsRef<str>>(elements: &[S], amounts: &[f64]) -> Result<String> {
    if elements.len() != amounts.len() {
        return Err(XasCalcError::InvalidArgument(format!(
            "{} elements but {} amounts",
            elements.len(),
            amounts.len()
        )));
    }
    Ok(elements
        .iter()
        .zip(amounts)
        .map(|(el, amount)| format!("{}{amount}", el.as_ref()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_formula() {
        let formula = compound_formula(&["Li", "Ni", "Mn", "Co", "O"], &[1.0, 0.5, 0.25, 0.25, 2.0])
            .unwrap();
        assert_eq!(formula, "Li1Ni0.5Mn0.25Co0.25O2");
    }

    #[test]
    fn test_compound_formula_length_mismatch() {
        assert!(matches!(
            compound_formula(&["Fe", "O"], &[2.0]),
            Err(XasCalcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display_in_mg_per_cm2() {
        assert_eq!(CompoundContribution::new("Fe", 0.01).to_string(), "10.0 mg/cm² Fe");
    }

    #[test]
    fn test_serde_uses_compound_key() {
        let c: CompoundContribution =
            serde_json::from_str(r#"{"compound": "SiO2", "area_density": 0.002}"#).unwrap();
        assert_eq!(c.formula, "SiO2");
        assert_eq!(c.area_density, 0.002);
        assert!(c.computed_absorption().is_none());
    }

    #[test]
    fn test_negative_density_rejected() {
        assert!(CompoundContribution::new("C", -1.0).validate().is_err());
        assert!(CompoundContribution::new("C", f64::NAN).validate().is_err());
        assert!(CompoundContribution::new("C", 0.0).validate().is_ok());
    }
}
