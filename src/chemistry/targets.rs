use serde::{Deserialize, Serialize};

use crate::chemistry::Parameter;

/// Operational target and acceptable range for one parameter.
///
/// `target` is the value the solver aims for; it need not be the midpoint of
/// `[min, max]` (pH sits at the low end to leave room for upward drift).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ParameterSpec {
    pub target: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_ceiling: Option<f64>,
}

impl ParameterSpec {
    pub fn new(target: f64, min: f64, max: f64) -> Self {
        Self {
            target,
            min,
            max,
            hard_ceiling: None,
        }
    }

    pub fn with_hard_ceiling(mut self, ceiling: f64) -> Self {
        self.hard_ceiling = Some(ceiling);
        self
    }

    pub fn contains(&self, value: f64) -> bool {
        !(value < self.min || value > self.max)
    }

    pub fn exceeds_hard_ceiling(&self, value: f64) -> bool {
        self.hard_ceiling.is_some_and(|ceiling| value > ceiling)
    }
}

/// Complete target table: every parameter always has a spec.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetTable {
    specs: [ParameterSpec; Parameter::COUNT],
}

impl Default for TargetTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TargetTable {
    pub fn standard() -> Self {
        let mut specs = [ParameterSpec::new(0.0, 0.0, 0.0); Parameter::COUNT];
        specs[Parameter::Ph.index()] = ParameterSpec::new(7.2, 7.2, 7.8);
        specs[Parameter::Ta.index()] = ParameterSpec::new(80.0, 40.0, 120.0);
        specs[Parameter::Fac.index()] = ParameterSpec::new(3.0, 1.0, 5.0);
        specs[Parameter::Cya.index()] = ParameterSpec::new(0.0, 0.0, 50.0).with_hard_ceiling(100.0);
        specs[Parameter::Salt.index()] = ParameterSpec::new(1750.0, 1500.0, 2000.0);
        Self { specs }
    }

    pub fn set(&mut self, parameter: Parameter, spec: ParameterSpec) {
        self.specs[parameter.index()] = spec;
    }

    pub fn spec(&self, parameter: Parameter) -> &ParameterSpec {
        &self.specs[parameter.index()]
    }

    pub fn target(&self, parameter: Parameter) -> f64 {
        self.spec(parameter).target
    }

    pub fn range(&self, parameter: Parameter) -> (f64, f64) {
        let spec = self.spec(parameter);
        (spec.min, spec.max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, &ParameterSpec)> + '_ {
        Parameter::ALL.into_iter().map(move |p| (p, self.spec(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_ordered() {
        for (parameter, spec) in TargetTable::standard().iter() {
            assert!(spec.min <= spec.target, "{parameter}: min above target");
            assert!(spec.target <= spec.max, "{parameter}: target above max");
            if let Some(ceiling) = spec.hard_ceiling {
                assert!(ceiling >= spec.max, "{parameter}: ceiling below max");
            }
        }
    }

    #[test]
    fn only_stabilizer_has_a_hard_ceiling() {
        let table = TargetTable::standard();
        for (parameter, spec) in table.iter() {
            assert_eq!(spec.hard_ceiling.is_some(), parameter == Parameter::Cya);
        }
        assert_eq!(table.spec(Parameter::Cya).hard_ceiling, Some(100.0));
    }

    #[test]
    fn ph_target_sits_at_range_floor() {
        let table = TargetTable::standard();
        assert_eq!(table.target(Parameter::Ph), 7.2);
        assert_eq!(table.range(Parameter::Ph), (7.2, 7.8));
        assert_eq!(table.target(Parameter::Ta), 80.0);
        assert_eq!(table.target(Parameter::Salt), 1750.0);
    }

    #[test]
    fn contains_is_inclusive() {
        let spec = ParameterSpec::new(80.0, 40.0, 120.0);
        assert!(spec.contains(40.0));
        assert!(spec.contains(120.0));
        assert!(!spec.contains(39.9));
        assert!(!spec.contains(120.1));
        assert!(!spec.exceeds_hard_ceiling(1_000.0));
    }
}
