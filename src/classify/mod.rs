pub mod report;

use serde::{Deserialize, Serialize};

use crate::chemistry::{Parameter, TargetTable};

pub use report::{check_reading, RangeCheck};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    WithinRange,
    OutOfRange,
}

impl RangeStatus {
    pub fn is_out_of_range(self) -> bool {
        matches!(self, Self::OutOfRange)
    }
}

/// `OutOfRange` iff `value < min` or `value > max`; both bounds are inside.
pub fn classify(targets: &TargetTable, parameter: Parameter, value: f64) -> RangeStatus {
    let (min, max) = targets.range(parameter);
    if value < min || value > max {
        RangeStatus::OutOfRange
    } else {
        RangeStatus::WithinRange
    }
}

/// Name-based lookup; names without a configured range are treated as unconstrained.
pub fn classify_named(targets: &TargetTable, name: &str, value: f64) -> RangeStatus {
    match name.parse::<Parameter>() {
        Ok(parameter) => classify(targets, parameter, value),
        Err(_) => RangeStatus::WithinRange,
    }
}

pub fn is_out_of_range(targets: &TargetTable, name: &str, value: f64) -> bool {
    classify_named(targets, name, value).is_out_of_range()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ph_inside_and_outside_range() {
        let targets = TargetTable::standard();
        assert_eq!(classify_named(&targets, "ph", 7.4), RangeStatus::WithinRange);
        assert_eq!(classify_named(&targets, "ph", 8.0), RangeStatus::OutOfRange);
        assert_eq!(classify_named(&targets, "ph", 7.0), RangeStatus::OutOfRange);
    }

    #[test]
    fn alkalinity_inside_and_outside_range() {
        let targets = TargetTable::standard();
        assert!(!is_out_of_range(&targets, "ta", 80.0));
        assert!(is_out_of_range(&targets, "ta", 140.0));
        assert!(is_out_of_range(&targets, "ta", 30.0));
    }

    #[test]
    fn bounds_are_within_range() {
        let targets = TargetTable::standard();
        for (parameter, spec) in targets.iter() {
            assert_eq!(
                classify(&targets, parameter, spec.min),
                RangeStatus::WithinRange
            );
            assert_eq!(
                classify(&targets, parameter, spec.max),
                RangeStatus::WithinRange
            );
            assert_eq!(
                classify(&targets, parameter, spec.max + 0.01),
                RangeStatus::OutOfRange
            );
            assert_eq!(
                classify(&targets, parameter, spec.min - 0.01),
                RangeStatus::OutOfRange
            );
        }
    }

    #[test]
    fn unknown_names_are_unconstrained() {
        let targets = TargetTable::standard();
        assert_eq!(classify_named(&targets, "ch", 500.0), RangeStatus::WithinRange);
        assert!(!is_out_of_range(&targets, "phosphates", -1.0));
    }

    #[test]
    fn stabilizer_uses_soft_range_not_ceiling() {
        let targets = TargetTable::standard();
        assert!(is_out_of_range(&targets, "cya", 60.0));
        assert!(!is_out_of_range(&targets, "cya", 50.0));
    }
}
