//! Water-chemistry dosing advisor.
//!
//! A linear effect model of dosing agents, range classification, a joint
//! pH/TA solver that chooses between chemical and aeration strategies, and
//! first-order aeration kinetics with calibration.

pub mod advisor;
pub mod aeration;
pub mod chemistry;
pub mod classify;
pub mod config;
pub mod output;
pub mod server;
pub mod solver;
pub mod types;
