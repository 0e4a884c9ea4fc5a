use std::collections::BTreeMap;

use tracing::debug;

use crate::chemistry::{Agent, ChemistryModel, Parameter};
use crate::solver::{describe_doses, Solution, Strategy};

/// Joint pH/TA solve.
///
/// pH and TA are coupled through two agents: bisulfate lowers both, carbonate
/// raises both. At most one of them is dosed; bicarbonate then tops TA up
/// without touching pH. The case split is on the sign of `target - current`
/// for pH, and every formula used in a branch is non-negative given the
/// branch's entry condition.
#[must_use]
pub fn solve_ph_ta(model: &ChemistryModel, ph_current: f64, ta_current: f64) -> Solution {
    let delta_ph = model.spec(Parameter::Ph).target - ph_current;
    let state = BTreeMap::from([(Parameter::Ph, ph_current), (Parameter::Ta, ta_current)]);

    if delta_ph < 0.0 {
        lower_ph(model, &state, ta_current, delta_ph)
    } else if delta_ph > 0.0 {
        raise_ph(model, &state, ta_current, delta_ph)
    } else {
        hold_ph(model, &state, ta_current)
    }
}

fn lower_ph(
    model: &ChemistryModel,
    state: &BTreeMap<Parameter, f64>,
    ta_current: f64,
    delta_ph: f64,
) -> Solution {
    let ta = model.spec(Parameter::Ta);
    let acid = delta_ph / model.effect(Agent::Bisulfate, Parameter::Ph);
    let ta_after_acid = ta_current + acid * model.effect(Agent::Bisulfate, Parameter::Ta);

    if ta_after_acid < ta.target {
        let top_up = (ta.target - ta_after_acid) / model.effect(Agent::Bicarbonate, Parameter::Ta);
        let doses = [(Agent::Bisulfate, acid), (Agent::Bicarbonate, top_up)];
        debug!(acid, top_up, "lowering pH with alkalinity top-up");
        Solution::plan(
            model.effects(),
            state,
            &doses,
            Strategy::Direct,
            describe_doses(&doses),
        )
    } else if ta_after_acid >= ta.min {
        let doses = [(Agent::Bisulfate, acid)];
        debug!(acid, ta_after_acid, "lowering pH, alkalinity stays in range");
        Solution::plan(
            model.effects(),
            state,
            &doses,
            Strategy::Direct,
            format!(
                "{} (TA will drop to {ta_after_acid:.0})",
                describe_doses(&doses)
            ),
        )
    } else {
        let (acid, top_up) = clamped_acid_plan(model, ta_current, acid);
        let doses = [(Agent::Bisulfate, acid), (Agent::Bicarbonate, top_up)];
        debug!(acid, top_up, "acid dose clamped at alkalinity minimum");
        Solution::plan(
            model.effects(),
            state,
            &doses,
            Strategy::Sequential,
            format!(
                "{} (limited to protect TA; retest and solve again)",
                describe_doses(&doses)
            ),
        )
    }
}

/// Largest acid dose that keeps TA at or above its range minimum, plus the
/// bicarbonate needed to bring TA back to target afterwards.
fn clamped_acid_plan(model: &ChemistryModel, ta_current: f64, full_acid: f64) -> (f64, f64) {
    let ta = model.spec(Parameter::Ta);
    let acid_ta = model.effect(Agent::Bisulfate, Parameter::Ta);
    let max_acid = (ta_current - ta.min) / -acid_ta;
    let acid = full_acid.min(max_acid).max(0.0);
    let ta_after_acid = ta_current + acid * acid_ta;
    let top_up = ((ta.target - ta_after_acid) / model.effect(Agent::Bicarbonate, Parameter::Ta)).max(0.0);
    (acid, top_up)
}

fn raise_ph(
    model: &ChemistryModel,
    state: &BTreeMap<Parameter, f64>,
    ta_current: f64,
    delta_ph: f64,
) -> Solution {
    let ta = model.spec(Parameter::Ta);
    let base = delta_ph / model.effect(Agent::Carbonate, Parameter::Ph);
    let ta_after_base = ta_current + base * model.effect(Agent::Carbonate, Parameter::Ta);

    if ta_after_base > ta.max {
        debug!(base, ta_after_base, "carbonate would overshoot alkalinity max");
        return Solution::infeasible(
            state,
            "Aeration required: pH low and TA high. Run jets with cover open.",
        );
    }

    let top_up = if ta_after_base < ta.target {
        (ta.target - ta_after_base) / model.effect(Agent::Bicarbonate, Parameter::Ta)
    } else {
        0.0
    };
    let doses = [(Agent::Carbonate, base), (Agent::Bicarbonate, top_up)];
    debug!(base, top_up, "raising pH with carbonate");
    Solution::plan(
        model.effects(),
        state,
        &doses,
        Strategy::Direct,
        describe_doses(&doses),
    )
}

fn hold_ph(model: &ChemistryModel, state: &BTreeMap<Parameter, f64>, ta_current: f64) -> Solution {
    let ta = model.spec(Parameter::Ta);
    let delta_ta = ta.target - ta_current;

    if delta_ta > 0.0 {
        let top_up = delta_ta / model.effect(Agent::Bicarbonate, Parameter::Ta);
        let doses = [(Agent::Bicarbonate, top_up)];
        Solution::plan(
            model.effects(),
            state,
            &doses,
            Strategy::Direct,
            describe_doses(&doses),
        )
    } else if delta_ta < 0.0 {
        // No single agent lowers TA without moving pH; leave it to the next solve.
        Solution::plan(
            model.effects(),
            state,
            &[],
            Strategy::Sequential,
            "TA high but pH on target. Use bisulfate sparingly, retest.",
        )
    } else {
        Solution::plan(
            model.effects(),
            state,
            &[],
            Strategy::Direct,
            "No adjustment needed",
        )
    }
}
