use thiserror::Error;

use crate::chemistry::{Agent, EffectModel, Parameter, ParameterSpec, TargetTable};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("{parameter}: {field} is not a finite number")]
    NonFiniteTarget {
        parameter: Parameter,
        field: &'static str,
    },
    #[error("{parameter}: expected min <= target <= max, got {min} / {target} / {max}")]
    InconsistentRange {
        parameter: Parameter,
        min: f64,
        target: f64,
        max: f64,
    },
    #[error("{parameter}: hard ceiling {ceiling} is below max {max}")]
    CeilingBelowMax {
        parameter: Parameter,
        ceiling: f64,
        max: f64,
    },
    #[error("{agent} effect on {parameter} is not a finite number")]
    NonFiniteEffect { agent: Agent, parameter: Parameter },
    #[error("{agent} effect on {parameter} must be {expected}, got {value}")]
    InvalidEffect {
        agent: Agent,
        parameter: Parameter,
        value: f64,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
enum Sign {
    Negative,
    Positive,
    Zero,
}

impl Sign {
    fn accepts(self, value: f64) -> bool {
        match self {
            Self::Negative => value < 0.0,
            Self::Positive => value > 0.0,
            Self::Zero => value == 0.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Positive => "positive",
            Self::Zero => "zero",
        }
    }
}

/// Coefficients the solvers divide by or branch on.
const REQUIRED_EFFECTS: [(Agent, Parameter, Sign); 8] = [
    (Agent::Bisulfate, Parameter::Ph, Sign::Negative),
    (Agent::Bisulfate, Parameter::Ta, Sign::Negative),
    (Agent::Carbonate, Parameter::Ph, Sign::Positive),
    (Agent::Carbonate, Parameter::Ta, Sign::Positive),
    (Agent::Bicarbonate, Parameter::Ta, Sign::Positive),
    (Agent::Bicarbonate, Parameter::Ph, Sign::Zero),
    (Agent::Dichlor, Parameter::Fac, Sign::Positive),
    (Agent::Salt, Parameter::Salt, Sign::Positive),
];

/// Validated, immutable effect and target tables.
///
/// Built once at startup and passed by reference into the solvers and the
/// classifier. Construction is the only place configuration errors surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ChemistryModel {
    effects: EffectModel,
    targets: TargetTable,
}

impl Default for ChemistryModel {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChemistryModel {
    pub fn new(effects: EffectModel, targets: TargetTable) -> Result<Self, ModelError> {
        for (parameter, spec) in targets.iter() {
            validate_spec(parameter, spec)?;
        }
        for agent in Agent::ALL {
            for parameter in Parameter::ALL {
                if !effects.effect(agent, parameter).is_finite() {
                    return Err(ModelError::NonFiniteEffect { agent, parameter });
                }
            }
        }
        for (agent, parameter, sign) in REQUIRED_EFFECTS {
            let value = effects.effect(agent, parameter);
            if !sign.accepts(value) {
                return Err(ModelError::InvalidEffect {
                    agent,
                    parameter,
                    value,
                    expected: sign.label(),
                });
            }
        }
        Ok(Self { effects, targets })
    }

    pub fn standard() -> Self {
        Self {
            effects: EffectModel::standard(),
            targets: TargetTable::standard(),
        }
    }

    pub fn effects(&self) -> &EffectModel {
        &self.effects
    }

    pub fn targets(&self) -> &TargetTable {
        &self.targets
    }

    pub fn effect(&self, agent: Agent, parameter: Parameter) -> f64 {
        self.effects.effect(agent, parameter)
    }

    pub fn spec(&self, parameter: Parameter) -> &ParameterSpec {
        self.targets.spec(parameter)
    }
}

fn validate_spec(parameter: Parameter, spec: &ParameterSpec) -> Result<(), ModelError> {
    let fields = [
        ("target", Some(spec.target)),
        ("min", Some(spec.min)),
        ("max", Some(spec.max)),
        ("hard_ceiling", spec.hard_ceiling),
    ];
    for (field, value) in fields {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteTarget { parameter, field });
        }
    }
    if spec.min > spec.target || spec.target > spec.max {
        return Err(ModelError::InconsistentRange {
            parameter,
            min: spec.min,
            target: spec.target,
            max: spec.max,
        });
    }
    if let Some(ceiling) = spec.hard_ceiling {
        if ceiling < spec.max {
            return Err(ModelError::CeilingBelowMax {
                parameter,
                ceiling,
                max: spec.max,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_pass_validation() {
        let model = ChemistryModel::new(EffectModel::standard(), TargetTable::standard())
            .expect("standard tables should validate");
        assert_eq!(model, ChemistryModel::standard());
    }

    #[test]
    fn rejects_target_outside_range() {
        let mut targets = TargetTable::standard();
        targets.set(Parameter::Ta, ParameterSpec::new(30.0, 40.0, 120.0));
        let err = ChemistryModel::new(EffectModel::standard(), targets).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InconsistentRange {
                parameter: Parameter::Ta,
                ..
            }
        ));
    }

    #[test]
    fn rejects_ceiling_below_max() {
        let mut targets = TargetTable::standard();
        targets.set(
            Parameter::Cya,
            ParameterSpec::new(0.0, 0.0, 50.0).with_hard_ceiling(40.0),
        );
        let err = ChemistryModel::new(EffectModel::standard(), targets).unwrap_err();
        assert_eq!(
            err,
            ModelError::CeilingBelowMax {
                parameter: Parameter::Cya,
                ceiling: 40.0,
                max: 50.0
            }
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut targets = TargetTable::standard();
        targets.set(Parameter::Salt, ParameterSpec::new(f64::NAN, 1500.0, 2000.0));
        assert!(matches!(
            ChemistryModel::new(EffectModel::standard(), targets),
            Err(ModelError::NonFiniteTarget { field: "target", .. })
        ));

        let effects =
            EffectModel::standard().with_effect(Agent::Dichlor, Parameter::Cya, f64::INFINITY);
        assert!(matches!(
            ChemistryModel::new(effects, TargetTable::standard()),
            Err(ModelError::NonFiniteEffect { .. })
        ));
    }

    #[test]
    fn rejects_solver_coefficients_with_wrong_sign() {
        let cases = [
            (Agent::Bisulfate, Parameter::Ph, 0.15),
            (Agent::Bisulfate, Parameter::Ta, 0.0),
            (Agent::Carbonate, Parameter::Ph, 0.0),
            (Agent::Bicarbonate, Parameter::Ph, 0.05),
            (Agent::Bicarbonate, Parameter::Ta, -7.0),
        ];
        for (agent, parameter, value) in cases {
            let effects = EffectModel::standard().with_effect(agent, parameter, value);
            let err = ChemistryModel::new(effects, TargetTable::standard()).unwrap_err();
            assert!(
                matches!(err, ModelError::InvalidEffect { agent: a, parameter: p, .. } if a == agent && p == parameter),
                "unexpected error for {agent}/{parameter}: {err}"
            );
        }
    }
}
