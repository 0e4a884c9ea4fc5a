pub mod csv;
pub mod table;

use anyhow::Result;
use serde::Serialize;

use crate::chemistry::Parameter;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// pH is read to two decimals, everything else to one.
pub fn format_value(parameter: Parameter, value: f64) -> String {
    match parameter {
        Parameter::Ph => format!("{value:.2}"),
        _ => format!("{value:.1}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_by_parameter() {
        assert_eq!(format_value(Parameter::Ph, 7.2), "7.20");
        assert_eq!(format_value(Parameter::Ta, 80.0), "80.0");
    }
}
