use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chemistry::Parameter;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReadingError {
    #[error("{name} is not a finite number")]
    NonFinite { name: String },
    #[error("{parameter} must be {expected}, got {value}")]
    OutOfDomain {
        parameter: Parameter,
        value: f64,
        expected: &'static str,
    },
}

/// Rejects values no test kit can report: non-finite numbers, non-positive
/// alkalinity, and negative concentrations or pH.
pub fn validate_measurement(parameter: Parameter, value: f64) -> Result<(), ReadingError> {
    if !value.is_finite() {
        return Err(ReadingError::NonFinite {
            name: parameter.as_slug().to_string(),
        });
    }
    let (valid, expected) = match parameter {
        Parameter::Ta => (value > 0.0, "positive"),
        _ => (value >= 0.0, "non-negative"),
    };
    if !valid {
        return Err(ReadingError::OutOfDomain {
            parameter,
            value,
            expected,
        });
    }
    Ok(())
}

/// Name-based variant; unknown names only have to be finite.
pub fn validate_named(name: &str, value: f64) -> Result<(), ReadingError> {
    match name.parse::<Parameter>() {
        Ok(parameter) => validate_measurement(parameter, value),
        Err(_) if !value.is_finite() => Err(ReadingError::NonFinite {
            name: name.to_string(),
        }),
        Err(_) => Ok(()),
    }
}

/// One set of test-strip or meter measurements. Untested parameters are `None`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WaterReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fac: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cya: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<f64>,
}

impl WaterReading {
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Ta => self.ta,
            Parameter::Fac => self.fac,
            Parameter::Cya => self.cya,
            Parameter::Salt => self.salt,
        }
    }

    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        let slot = match parameter {
            Parameter::Ph => &mut self.ph,
            Parameter::Ta => &mut self.ta,
            Parameter::Fac => &mut self.fac,
            Parameter::Cya => &mut self.cya,
            Parameter::Salt => &mut self.salt,
        };
        *slot = Some(value);
        self
    }

    /// Measured values keyed by parameter, for projection through the effect model.
    pub fn values(&self) -> BTreeMap<Parameter, f64> {
        Parameter::ALL
            .iter()
            .filter_map(|p| self.get(*p).map(|v| (*p, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Parameter::ALL.iter().all(|p| self.get(*p).is_none())
    }

    /// Checks every measured value; untested parameters are skipped.
    pub fn validate(&self) -> Result<(), ReadingError> {
        self.values()
            .into_iter()
            .try_for_each(|(parameter, value)| validate_measurement(parameter, value))
    }
}
