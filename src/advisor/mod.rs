pub mod recommendations;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aeration::DEFAULT_K;
use crate::chemistry::{Agent, Parameter};

pub use recommendations::build_recommendations;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Chemistry,
    Aeration,
    Retest,
    Maintenance,
}

impl RecommendationKind {
    pub fn as_slug(&self) -> &'static str {
        match self {
            RecommendationKind::Chemistry => "chemistry",
            RecommendationKind::Aeration => "aeration",
            RecommendationKind::Retest => "retest",
            RecommendationKind::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub priority: usize,
    pub kind: RecommendationKind,
    pub title: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub doses: BTreeMap<Agent, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub projected: BTreeMap<Parameter, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aeration_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AdvisorSettings {
    /// The joint solve also runs when TA sits more than this far below target.
    pub ta_trigger_margin: f64,
    /// Rate coefficient used to estimate aeration time.
    pub aeration_k: f64,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            ta_trigger_margin: 5.0,
            aeration_k: DEFAULT_K,
        }
    }
}
