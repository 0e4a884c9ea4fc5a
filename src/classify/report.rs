use serde::{Deserialize, Serialize};

use crate::chemistry::{Parameter, TargetTable};
use crate::classify::{classify, RangeStatus};
use crate::types::WaterReading;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeCheck {
    pub parameter: Parameter,
    pub value: f64,
    pub target: f64,
    pub min: f64,
    pub max: f64,
    pub status: RangeStatus,
    /// Distance to the nearest violated bound; `None` while in range.
    pub deviation: Option<f64>,
    pub above_hard_ceiling: bool,
}

pub fn check_reading(targets: &TargetTable, reading: &WaterReading) -> Vec<RangeCheck> {
    Parameter::ALL
        .iter()
        .filter_map(|p| reading.get(*p).map(|value| check_value(targets, *p, value)))
        .collect()
}

pub fn check_value(targets: &TargetTable, parameter: Parameter, value: f64) -> RangeCheck {
    let spec = targets.spec(parameter);
    let status = classify(targets, parameter, value);
    let deviation = match status {
        RangeStatus::WithinRange => None,
        RangeStatus::OutOfRange if value < spec.min => Some(spec.min - value),
        RangeStatus::OutOfRange => Some(value - spec.max),
    };
    RangeCheck {
        parameter,
        value,
        target: spec.target,
        min: spec.min,
        max: spec.max,
        status,
        deviation,
        above_hard_ceiling: spec.exceeds_hard_ceiling(value),
    }
}
