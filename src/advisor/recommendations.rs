use std::collections::BTreeMap;

use tracing::debug;

use crate::advisor::{AdvisorSettings, Recommendation, RecommendationKind};
use crate::aeration::{estimate_time, KineticsError};
use crate::chemistry::{ChemistryModel, Parameter};
use crate::classify::classify;
use crate::solver::{dose_to_target, solve_ph_ta, Solution};
use crate::types::WaterReading;

/// Whether a reading calls for the joint pH/TA solve.
///
/// Out-of-range pH or TA always does. TA inside its range but more than
/// `margin` below target does too, so the alkalinity top-up that follows an
/// acid dose is still recommended after the retest.
pub fn needs_ph_ta_solve(model: &ChemistryModel, ph: f64, ta: f64, margin: f64) -> bool {
    let targets = model.targets();
    classify(targets, Parameter::Ph, ph).is_out_of_range()
        || classify(targets, Parameter::Ta, ta).is_out_of_range()
        || ta < targets.target(Parameter::Ta) - margin
}

/// Ranked actions for one reading: salt, then pH/TA, then sanitizer, then CYA.
pub fn build_recommendations(
    model: &ChemistryModel,
    reading: &WaterReading,
    settings: &AdvisorSettings,
) -> Result<Vec<Recommendation>, KineticsError> {
    let mut recommendations = Vec::new();

    if let Some(salt) = reading.salt {
        recommendations.extend(salt_recommendation(model, salt));
    }

    match (reading.ph, reading.ta) {
        (Some(ph), Some(ta)) if needs_ph_ta_solve(model, ph, ta, settings.ta_trigger_margin) => {
            let solution = solve_ph_ta(model, ph, ta);
            recommendations.push(ph_ta_recommendation(model, ph, ta, solution, settings)?);
        }
        (Some(_), None) | (None, Some(_)) => {
            debug!("pH/TA solve skipped, both values are needed");
        }
        _ => {}
    }

    if let Some(fac) = reading.fac {
        recommendations.extend(sanitizer_recommendation(model, fac, reading.cya));
    }

    if let Some(cya) = reading.cya {
        recommendations.extend(stabilizer_recommendation(model, cya));
    }

    for (index, recommendation) in recommendations.iter_mut().enumerate() {
        recommendation.priority = index + 1;
    }
    Ok(recommendations)
}

fn recommendation(kind: RecommendationKind, title: &str, rationale: String) -> Recommendation {
    Recommendation {
        priority: 0,
        kind,
        title: title.to_string(),
        rationale,
        doses: BTreeMap::new(),
        projected: BTreeMap::new(),
        aeration_hours: None,
    }
}

fn salt_recommendation(model: &ChemistryModel, salt: f64) -> Option<Recommendation> {
    let spec = model.spec(Parameter::Salt);
    if salt < spec.min {
        let solution = dose_to_target(model, Parameter::Salt, salt)?;
        let mut rec = recommendation(
            RecommendationKind::Chemistry,
            "Add salt",
            format!(
                "Salt {salt:.0} ppm is below {:.0}. {} raises it to {:.0} ppm.",
                spec.min, solution.explanation, spec.target
            ),
        );
        rec.doses = solution.doses;
        rec.projected = solution.projected;
        Some(rec)
    } else if salt > spec.max {
        Some(recommendation(
            RecommendationKind::Maintenance,
            "Dilute",
            format!(
                "Salt {salt:.0} ppm is above {:.0}. Drain 25% and refill.",
                spec.max
            ),
        ))
    } else {
        None
    }
}

fn ph_ta_recommendation(
    model: &ChemistryModel,
    ph: f64,
    ta: f64,
    solution: Solution,
    settings: &AdvisorSettings,
) -> Result<Recommendation, KineticsError> {
    if solution.requires_aeration() {
        let hours = estimate_time(
            ph,
            model.spec(Parameter::Ph).target,
            ta,
            settings.aeration_k,
        )?;
        debug!(ph, ta, hours, k = settings.aeration_k, "aeration recommended");
        let mut rec = recommendation(
            RecommendationKind::Aeration,
            "Aerate",
            format!("{} (~{hours:.1}h)", solution.explanation),
        );
        rec.projected = solution.projected;
        rec.aeration_hours = Some(hours);
        return Ok(rec);
    }

    if solution.doses.is_empty() {
        let mut rec = recommendation(
            RecommendationKind::Retest,
            "Retest pH/TA",
            solution.explanation,
        );
        rec.projected = solution.projected;
        return Ok(rec);
    }

    let mut rationale = solution.explanation;
    if solution.doses.len() > 1 {
        rationale.push_str(&format!(
            ". Projection assumes all {} doses are added.",
            solution.doses.len()
        ));
    }
    let mut rec = recommendation(RecommendationKind::Chemistry, "Adjust pH/TA", rationale);
    rec.doses = solution.doses;
    rec.projected = solution.projected;
    Ok(rec)
}

fn sanitizer_recommendation(
    model: &ChemistryModel,
    fac: f64,
    cya: Option<f64>,
) -> Option<Recommendation> {
    let spec = model.spec(Parameter::Fac);
    if fac >= spec.min {
        return None;
    }
    let solution = dose_to_target(model, Parameter::Fac, fac)?;

    let mut state = BTreeMap::from([(Parameter::Fac, fac)]);
    if let Some(cya) = cya {
        state.insert(Parameter::Cya, cya);
    }
    let projected = model.effects().project(&state, &solution.doses);

    let mut rationale = format!("Raise FAC to {:.0} ppm: {}.", spec.target, solution.explanation);
    if let Some(cya_after) = projected.get(&Parameter::Cya) {
        rationale.push_str(&format!(" CYA rises to {cya_after:.1} ppm."));
    }

    let mut rec = recommendation(RecommendationKind::Chemistry, "Add dichlor", rationale);
    rec.doses = solution.doses;
    rec.projected = projected;
    Some(rec)
}

fn stabilizer_recommendation(model: &ChemistryModel, cya: f64) -> Option<Recommendation> {
    let spec = model.spec(Parameter::Cya);
    match spec.hard_ceiling {
        Some(ceiling) if cya > ceiling => Some(recommendation(
            RecommendationKind::Maintenance,
            "Drain required",
            format!("CYA {cya:.0} ppm exceeds {ceiling:.0}. Chlorine lock, partial drain needed."),
        )),
        Some(ceiling) if cya > spec.max => Some(recommendation(
            RecommendationKind::Maintenance,
            "Plan drain",
            format!("CYA {cya:.0} ppm. Plan a drain before it passes {ceiling:.0}."),
        )),
        None if cya > spec.max => Some(recommendation(
            RecommendationKind::Maintenance,
            "Plan drain",
            format!("CYA {cya:.0} ppm is above {:.0}. Plan a partial drain.", spec.max),
        )),
        _ => None,
    }
}
