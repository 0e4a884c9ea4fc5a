pub mod effects;
pub mod model;
pub mod targets;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use effects::EffectModel;
pub use model::{ChemistryModel, ModelError};
pub use targets::{ParameterSpec, TargetTable};

/// Water parameters the engine reasons about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Ph = 0,
    Ta = 1,
    Fac = 2,
    Cya = 3,
    Salt = 4,
}

impl Parameter {
    pub const COUNT: usize = 5;

    pub const ALL: [Parameter; Self::COUNT] = [
        Parameter::Ph,
        Parameter::Ta,
        Parameter::Fac,
        Parameter::Cya,
        Parameter::Salt,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Ph => "ph",
            Self::Ta => "ta",
            Self::Fac => "fac",
            Self::Cya => "cya",
            Self::Salt => "salt",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Ph => "",
            _ => "ppm",
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Ph => "pH",
            Self::Ta => "TA",
            Self::Fac => "FAC",
            Self::Cya => "CYA",
            Self::Salt => "Salt",
        };
        write!(f, "{display}")
    }
}

/// Chemical agents with a fixed per-unit effect vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Bisulfate = 0,
    Carbonate = 1,
    Bicarbonate = 2,
    Dichlor = 3,
    Salt = 4,
}

impl Agent {
    pub const COUNT: usize = 5;

    pub const ALL: [Agent; Self::COUNT] = [
        Agent::Bisulfate,
        Agent::Carbonate,
        Agent::Bicarbonate,
        Agent::Dichlor,
        Agent::Salt,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Bisulfate => "bisulfate",
            Self::Carbonate => "carbonate",
            Self::Bicarbonate => "bicarbonate",
            Self::Dichlor => "dichlor",
            Self::Salt => "salt",
        }
    }
}

impl Display for Agent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Bisulfate => "Sodium Bisulfate",
            Self::Carbonate => "Sodium Carbonate",
            Self::Bicarbonate => "Sodium Bicarbonate",
            Self::Dichlor => "Dichlor",
            Self::Salt => "Salt",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("unknown agent: {0}")]
    UnknownAgent(String),
}

impl FromStr for Parameter {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "ph" => Ok(Self::Ph),
            "ta" | "alkalinity" | "total_alkalinity" => Ok(Self::Ta),
            "fac" | "chlorine" | "free_chlorine" => Ok(Self::Fac),
            "cya" | "stabilizer" => Ok(Self::Cya),
            "salt" => Ok(Self::Salt),
            _ => Err(NameError::UnknownParameter(s.to_string())),
        }
    }
}

impl FromStr for Agent {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "bisulfate" | "sodium_bisulfate" | "ph_down" => Ok(Self::Bisulfate),
            "carbonate" | "sodium_carbonate" | "ph_up" => Ok(Self::Carbonate),
            "bicarbonate" | "sodium_bicarbonate" | "ta_up" => Ok(Self::Bicarbonate),
            "dichlor" => Ok(Self::Dichlor),
            "salt" => Ok(Self::Salt),
            _ => Err(NameError::UnknownAgent(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("pH".parse::<Parameter>(), Ok(Parameter::Ph));
        assert_eq!(" alkalinity ".parse::<Parameter>(), Ok(Parameter::Ta));
        assert_eq!("stabilizer".parse::<Parameter>(), Ok(Parameter::Cya));
        assert_eq!("ph_down".parse::<Agent>(), Ok(Agent::Bisulfate));
        assert_eq!(
            "ch".parse::<Parameter>(),
            Err(NameError::UnknownParameter("ch".to_string()))
        );
        assert!("mps".parse::<Agent>().is_err());
    }

    #[test]
    fn slugs_round_trip_through_from_str() {
        for parameter in Parameter::ALL {
            assert_eq!(parameter.as_slug().parse::<Parameter>(), Ok(parameter));
        }
        for agent in Agent::ALL {
            assert_eq!(agent.as_slug().parse::<Agent>(), Ok(agent));
        }
    }

    #[test]
    fn indices_follow_all_order() {
        for (i, parameter) in Parameter::ALL.iter().enumerate() {
            assert_eq!(parameter.index(), i);
        }
        for (i, agent) in Agent::ALL.iter().enumerate() {
            assert_eq!(agent.index(), i);
        }
    }
}
