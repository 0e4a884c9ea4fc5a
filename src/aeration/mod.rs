//! First-order aeration kinetics.
//!
//! Running the jets with the cover open off-gasses CO2 and raises pH at a rate
//! of `k * (100 / TA)` pH units per hour: the stronger the buffer, the slower
//! the rise. `k` starts at [`DEFAULT_K`] and is refined from observed runs.

pub mod calibration;
pub mod kinetics;

use thiserror::Error;

pub use calibration::{calibrated_k, CalibrationSample};
pub use kinetics::{estimate_time, observed_k, projected_ph};

pub const DEFAULT_K: f64 = 0.10;

/// TA at which the buffer factor is 1.
pub const REFERENCE_TA: f64 = 100.0;

/// pH plateau a running aeration cycle is not projected past.
pub const DEFAULT_PH_CEILING: f64 = 8.4;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum KineticsError {
    #[error("alkalinity must be positive, got {0}")]
    NonPositiveAlkalinity(f64),
    #[error("rate coefficient must be positive, got {0}")]
    NonPositiveRate(f64),
    #[error("{name} is not a finite number")]
    NonFinite { name: &'static str },
}
