use std::collections::BTreeMap;

use crate::chemistry::{Agent, Parameter};

/// Per-unit effect coefficients, one row per agent.
///
/// Applying `x` units of an agent moves each parameter by `x * effect`;
/// doses of several agents sum linearly. Pairs that were never set stay at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectModel {
    coefficients: [[f64; Parameter::COUNT]; Agent::COUNT],
}

impl Default for EffectModel {
    fn default() -> Self {
        Self {
            coefficients: [[0.0; Parameter::COUNT]; Agent::COUNT],
        }
    }
}

impl EffectModel {
    pub fn standard() -> Self {
        Self::default()
            .with_effect(Agent::Bisulfate, Parameter::Ph, -0.15)
            .with_effect(Agent::Bisulfate, Parameter::Ta, -5.0)
            .with_effect(Agent::Carbonate, Parameter::Ph, 0.10)
            .with_effect(Agent::Carbonate, Parameter::Ta, 8.0)
            .with_effect(Agent::Bicarbonate, Parameter::Ta, 7.0)
            .with_effect(Agent::Dichlor, Parameter::Fac, 1.2)
            .with_effect(Agent::Dichlor, Parameter::Cya, 0.9)
            .with_effect(Agent::Salt, Parameter::Salt, 228.0)
    }

    pub fn with_effect(mut self, agent: Agent, parameter: Parameter, coefficient: f64) -> Self {
        self.set_effect(agent, parameter, coefficient);
        self
    }

    pub fn set_effect(&mut self, agent: Agent, parameter: Parameter, coefficient: f64) {
        self.coefficients[agent.index()][parameter.index()] = coefficient;
    }

    /// Replaces the whole effect vector of `agent`; parameters missing from `effects` become 0.
    pub fn replace_agent(&mut self, agent: Agent, effects: &BTreeMap<Parameter, f64>) {
        for parameter in Parameter::ALL {
            let coefficient = effects.get(&parameter).copied().unwrap_or(0.0);
            self.set_effect(agent, parameter, coefficient);
        }
    }

    pub fn effect(&self, agent: Agent, parameter: Parameter) -> f64 {
        self.coefficients[agent.index()][parameter.index()]
    }

    /// Non-zero entries of one agent's effect vector.
    pub fn effect_vector(&self, agent: Agent) -> BTreeMap<Parameter, f64> {
        Parameter::ALL
            .iter()
            .map(|p| (*p, self.effect(agent, *p)))
            .filter(|(_, coefficient)| *coefficient != 0.0)
            .collect()
    }

    /// Projects `state` forward under `doses`. Only parameters present in `state` are returned.
    pub fn project(
        &self,
        state: &BTreeMap<Parameter, f64>,
        doses: &BTreeMap<Agent, f64>,
    ) -> BTreeMap<Parameter, f64> {
        state
            .iter()
            .map(|(parameter, value)| {
                let shift = doses
                    .iter()
                    .map(|(agent, amount)| amount * self.effect(*agent, *parameter))
                    .sum::<f64>();
                (*parameter, value + shift)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_pairs_default_to_zero() {
        let model = EffectModel::standard();
        assert_eq!(model.effect(Agent::Dichlor, Parameter::Ph), 0.0);
        assert_eq!(model.effect(Agent::Dichlor, Parameter::Ta), 0.0);
        assert_eq!(model.effect(Agent::Bicarbonate, Parameter::Ph), 0.0);
        for agent in [Agent::Bisulfate, Agent::Carbonate, Agent::Bicarbonate] {
            assert_eq!(model.effect(agent, Parameter::Fac), 0.0);
            assert_eq!(model.effect(agent, Parameter::Cya), 0.0);
            assert_eq!(model.effect(agent, Parameter::Salt), 0.0);
        }
        assert!(EffectModel::default()
            .effect_vector(Agent::Carbonate)
            .is_empty());
    }

    #[test]
    fn ph_and_ta_are_coupled_through_two_agents() {
        let model = EffectModel::standard();
        assert_eq!(
            model.effect_vector(Agent::Bisulfate),
            BTreeMap::from([(Parameter::Ph, -0.15), (Parameter::Ta, -5.0)])
        );
        assert_eq!(
            model.effect_vector(Agent::Carbonate),
            BTreeMap::from([(Parameter::Ph, 0.10), (Parameter::Ta, 8.0)])
        );
        assert_eq!(
            model.effect_vector(Agent::Dichlor),
            BTreeMap::from([(Parameter::Fac, 1.2), (Parameter::Cya, 0.9)])
        );
    }

    #[test]
    fn projection_sums_agent_effects_linearly() {
        let model = EffectModel::standard();
        let state = BTreeMap::from([(Parameter::Ph, 7.6), (Parameter::Ta, 60.0)]);
        let doses = BTreeMap::from([(Agent::Bisulfate, 2.0), (Agent::Bicarbonate, 3.0)]);

        let projected = model.project(&state, &doses);
        assert_eq!(projected.len(), 2);
        assert!((projected[&Parameter::Ph] - 7.3).abs() < 1e-9);
        assert!((projected[&Parameter::Ta] - (60.0 - 10.0 + 21.0)).abs() < 1e-9);
    }

    #[test]
    fn replacing_an_agent_zeroes_unlisted_parameters() {
        let mut model = EffectModel::standard();
        model.replace_agent(Agent::Dichlor, &BTreeMap::from([(Parameter::Fac, 1.5)]));
        assert_eq!(model.effect(Agent::Dichlor, Parameter::Fac), 1.5);
        assert_eq!(model.effect(Agent::Dichlor, Parameter::Cya), 0.0);
    }
}
