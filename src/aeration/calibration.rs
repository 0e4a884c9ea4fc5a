use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aeration::{observed_k, KineticsError};

/// One completed aeration run and the rate coefficient it implies.
///
/// Storing samples across sessions is up to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationSample {
    pub ph_before: f64,
    pub ph_after: f64,
    pub duration_hours: f64,
    pub ta: f64,
    pub k_observed: f64,
    pub recorded_at: DateTime<Utc>,
}

impl CalibrationSample {
    pub fn from_run(
        ph_before: f64,
        ph_after: f64,
        duration_hours: f64,
        ta: f64,
    ) -> Result<Self, KineticsError> {
        let k_observed = observed_k(ph_before, ph_after, duration_hours, ta)?;
        debug!(ph_before, ph_after, duration_hours, ta, k_observed, "aeration calibration sample");
        Ok(Self {
            ph_before,
            ph_after,
            duration_hours,
            ta,
            k_observed,
            recorded_at: Utc::now(),
        })
    }

    /// Zero-duration runs and runs where pH did not rise carry no rate information.
    pub fn is_usable(&self) -> bool {
        self.k_observed.is_finite() && self.k_observed > 0.0
    }
}

/// Mean observed coefficient over usable samples, or `fallback` when there are none.
pub fn calibrated_k(samples: &[CalibrationSample], fallback: f64) -> f64 {
    let usable = samples
        .iter()
        .filter(|s| s.is_usable())
        .map(|s| s.k_observed)
        .collect::<Vec<_>>();
    if usable.is_empty() {
        return fallback;
    }
    usable.iter().sum::<f64>() / usable.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aeration::DEFAULT_K;

    #[test]
    fn falls_back_without_samples() {
        assert_eq!(calibrated_k(&[], DEFAULT_K), DEFAULT_K);
    }

    #[test]
    fn averages_usable_samples() {
        let samples = vec![
            CalibrationSample::from_run(7.0, 7.2, 2.0, 100.0).unwrap(),
            CalibrationSample::from_run(7.0, 7.2, 2.0, 200.0).unwrap(),
            CalibrationSample::from_run(7.0, 7.2, 0.0, 100.0).unwrap(),
            CalibrationSample::from_run(7.2, 7.1, 1.0, 100.0).unwrap(),
        ];
        assert!(!samples[2].is_usable());
        assert!(!samples[3].is_usable());

        let k = calibrated_k(&samples, DEFAULT_K);
        assert!((k - 0.15).abs() < 1e-9);
    }

    #[test]
    fn only_degenerate_samples_fall_back() {
        let samples = vec![CalibrationSample::from_run(7.0, 7.2, 0.0, 100.0).unwrap()];
        assert_eq!(calibrated_k(&samples, 0.12), 0.12);
    }

    #[test]
    fn rejects_invalid_alkalinity() {
        assert_eq!(
            CalibrationSample::from_run(7.0, 7.2, 1.0, -10.0),
            Err(KineticsError::NonPositiveAlkalinity(-10.0))
        );
    }
}
