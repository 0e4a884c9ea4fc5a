use std::collections::BTreeMap;

use crate::chemistry::{Agent, ChemistryModel, Parameter};
use crate::solver::{describe_doses, Solution, Strategy};

/// The one agent that raises `parameter` on its own, if any.
///
/// pH and TA go through the joint solver; CYA is only ever lowered by dilution.
pub fn raising_agent(parameter: Parameter) -> Option<Agent> {
    match parameter {
        Parameter::Fac => Some(Agent::Dichlor),
        Parameter::Salt => Some(Agent::Salt),
        Parameter::Ph | Parameter::Ta | Parameter::Cya => None,
    }
}

/// Doses the dedicated agent to bring `parameter` up to its operational target.
pub fn dose_to_target(model: &ChemistryModel, parameter: Parameter, current: f64) -> Option<Solution> {
    let agent = raising_agent(parameter)?;
    let target = model.spec(parameter).target;
    let state = BTreeMap::from([(parameter, current)]);

    if current >= target {
        return Some(Solution::plan(
            model.effects(),
            &state,
            &[],
            Strategy::Direct,
            "No adjustment needed",
        ));
    }

    let amount = (target - current) / model.effect(agent, parameter);
    let doses = [(agent, amount)];
    Some(Solution::plan(
        model.effects(),
        &state,
        &doses,
        Strategy::Direct,
        describe_doses(&doses),
    ))
}
