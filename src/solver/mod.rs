pub mod joint;
pub mod single;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chemistry::{Agent, EffectModel, Parameter};

pub use joint::solve_ph_ta;
pub use single::dose_to_target;

/// How a dosing plan should be carried out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Dose everything in one session; the projection reaches the targets.
    Direct,
    /// Partial step; retest and solve again afterwards.
    Sequential,
    /// Chemistry cannot satisfy both constraints; run an aeration cycle.
    Aeration,
}

/// A dosing plan. `doses` only holds agents with a positive amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Solution {
    pub feasible: bool,
    pub doses: BTreeMap<Agent, f64>,
    pub projected: BTreeMap<Parameter, f64>,
    pub strategy: Strategy,
    pub explanation: String,
}

impl Solution {
    pub(crate) fn plan(
        effects: &EffectModel,
        state: &BTreeMap<Parameter, f64>,
        doses: &[(Agent, f64)],
        strategy: Strategy,
        explanation: impl Into<String>,
    ) -> Self {
        let doses = doses
            .iter()
            .filter(|(_, amount)| *amount > 0.0)
            .copied()
            .collect::<BTreeMap<_, _>>();
        Self {
            feasible: true,
            projected: effects.project(state, &doses),
            doses,
            strategy,
            explanation: explanation.into(),
        }
    }

    pub(crate) fn infeasible(state: &BTreeMap<Parameter, f64>, explanation: impl Into<String>) -> Self {
        Self {
            feasible: false,
            doses: BTreeMap::new(),
            projected: state.clone(),
            strategy: Strategy::Aeration,
            explanation: explanation.into(),
        }
    }

    pub fn dose(&self, agent: Agent) -> f64 {
        self.doses.get(&agent).copied().unwrap_or(0.0)
    }

    pub fn projected(&self, parameter: Parameter) -> Option<f64> {
        self.projected.get(&parameter).copied()
    }

    pub fn requires_aeration(&self) -> bool {
        self.strategy == Strategy::Aeration
    }

    pub fn is_no_op(&self) -> bool {
        self.feasible && self.doses.is_empty()
    }
}

pub(crate) fn describe_doses(doses: &[(Agent, f64)]) -> String {
    doses
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(agent, amount)| format!("{amount:.1} units {}", agent.as_slug()))
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_drops_zero_doses_and_projects() {
        let effects = EffectModel::standard();
        let state = BTreeMap::from([(Parameter::Ph, 7.2), (Parameter::Ta, 66.0)]);
        let solution = Solution::plan(
            &effects,
            &state,
            &[(Agent::Bisulfate, 0.0), (Agent::Bicarbonate, 2.0)],
            Strategy::Direct,
            "top up",
        );

        assert!(solution.feasible);
        assert_eq!(solution.doses.len(), 1);
        assert_eq!(solution.dose(Agent::Bisulfate), 0.0);
        assert_eq!(solution.dose(Agent::Bicarbonate), 2.0);
        assert_eq!(solution.projected(Parameter::Ta), Some(80.0));
        assert_eq!(solution.projected(Parameter::Ph), Some(7.2));
    }

    #[test]
    fn infeasible_keeps_state_untouched() {
        let state = BTreeMap::from([(Parameter::Ph, 7.0), (Parameter::Ta, 140.0)]);
        let solution = Solution::infeasible(&state, "aerate");
        assert!(!solution.feasible);
        assert!(solution.requires_aeration());
        assert!(solution.doses.is_empty());
        assert_eq!(solution.projected, state);
        assert!(!solution.is_no_op());
    }

    #[test]
    fn describes_only_positive_doses() {
        let text = describe_doses(&[(Agent::Bisulfate, 5.333), (Agent::Carbonate, 0.0)]);
        assert_eq!(text, "5.3 units bisulfate");
    }

    #[test]
    fn strategy_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Strategy::Sequential).unwrap(),
            "\"sequential\""
        );
    }
}
