use crate::aeration::{KineticsError, REFERENCE_TA};

fn ensure_finite(values: &[(&'static str, f64)]) -> Result<(), KineticsError> {
    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some((name, _)) => Err(KineticsError::NonFinite { name: *name }),
        None => Ok(()),
    }
}

fn buffer_factor(ta: f64) -> Result<f64, KineticsError> {
    if ta <= 0.0 {
        return Err(KineticsError::NonPositiveAlkalinity(ta));
    }
    Ok(REFERENCE_TA / ta)
}

/// Hours of aeration needed to lift pH from `ph_current` to `ph_target`.
///
/// Zero when pH is already at or above target.
pub fn estimate_time(ph_current: f64, ph_target: f64, ta: f64, k: f64) -> Result<f64, KineticsError> {
    ensure_finite(&[
        ("ph_current", ph_current),
        ("ph_target", ph_target),
        ("ta", ta),
        ("k", k),
    ])?;
    let buffer = buffer_factor(ta)?;
    if k <= 0.0 {
        return Err(KineticsError::NonPositiveRate(k));
    }
    if ph_current >= ph_target {
        return Ok(0.0);
    }
    Ok((ph_target - ph_current) / (k * buffer))
}

/// Rate coefficient implied by one completed run.
///
/// A run with no measurable duration yields 0.
pub fn observed_k(
    ph_before: f64,
    ph_after: f64,
    duration_hours: f64,
    ta: f64,
) -> Result<f64, KineticsError> {
    ensure_finite(&[
        ("ph_before", ph_before),
        ("ph_after", ph_after),
        ("duration_hours", duration_hours),
        ("ta", ta),
    ])?;
    let buffer = buffer_factor(ta)?;
    if duration_hours <= 0.0 {
        return Ok(0.0);
    }
    Ok((ph_after - ph_before) / (duration_hours * buffer))
}

/// pH expected `elapsed_hours` into a run that started at `ph_start`, capped at `ceiling`.
pub fn projected_ph(
    ph_start: f64,
    elapsed_hours: f64,
    ta: f64,
    k: f64,
    ceiling: f64,
) -> Result<f64, KineticsError> {
    ensure_finite(&[
        ("ph_start", ph_start),
        ("elapsed_hours", elapsed_hours),
        ("ta", ta),
        ("k", k),
        ("ceiling", ceiling),
    ])?;
    let buffer = buffer_factor(ta)?;
    let rise = k * buffer * elapsed_hours.max(0.0);
    Ok((ph_start + rise).min(ceiling))
}
