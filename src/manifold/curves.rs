//! Retention and skill acquisition curves

use crate::{Error, Result};

/// Retention time constant in days at unit quality.
pub const RETENTION_TIME_CONSTANT_DAYS: f64 = 45.0;

/// Long-term retained fraction at unit quality.
pub const ASYMPTOTIC_RETENTION: f64 = 0.15;

/// Acquisition time constant in days at unit learning rate.
pub const ACQUISITION_TIME_CONSTANT_DAYS: f64 = 21.0;

/// Power-law exponent of skill acquisition.
pub const ACQUISITION_EXPONENT: f64 = 0.67;

/// Knowledge retained after `days`.
///
/// `R(t) = R∞ + (R₀ − R∞) e^{−t/τ}` with `τ = 45 q` and `R∞ = 0.15 q`, so
/// better teaching both slows the decay and raises the plateau.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for negative or non-finite `days`, a
/// negative `initial`, or a non-positive `quality`.
pub fn knowledge_retention(initial: f64, days: f64, quality: f64) -> Result<f64> {
    if !(initial.is_finite() && initial >= 0.0) {
        return Err(Error::InvalidInput(format!(
            "initial knowledge must be non-negative, got {initial}"
        )));
    }
    non_negative_days(days)?;
    if !(quality.is_finite() && quality > 0.0) {
        return Err(Error::InvalidInput(format!(
            "educational quality must be positive, got {quality}"
        )));
    }

    let tau = RETENTION_TIME_CONSTANT_DAYS * quality;
    let plateau = ASYMPTOTIC_RETENTION * quality;
    Ok(plateau + (initial - plateau) * (-days / tau).exp())
}

/// Skill reached after `days` of practice.
///
/// `S(t) = S_max (1 − e^{−t/τ})^0.67` with `τ = 21 / rate`.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for negative or non-finite `days`, a
/// negative `max_skill`, or a non-positive `learning_rate`.
pub fn skill_acquisition(days: f64, max_skill: f64, learning_rate: f64) -> Result<f64> {
    non_negative_days(days)?;
    if !(max_skill.is_finite() && max_skill >= 0.0) {
        return Err(Error::InvalidInput(format!(
            "max skill must be non-negative, got {max_skill}"
        )));
    }
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(Error::InvalidInput(format!(
            "learning rate must be positive, got {learning_rate}"
        )));
    }

    let tau = ACQUISITION_TIME_CONSTANT_DAYS / learning_rate;
    Ok(max_skill * (1.0 - (-days / tau).exp()).powf(ACQUISITION_EXPONENT))
}

fn non_negative_days(days: f64) -> Result<()> {
    if days.is_finite() && days >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("days must be non-negative, got {days}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_starts_full() {
        assert!((knowledge_retention(1.0, 0.0, 1.0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_retention_after_one_time_constant() {
        let expected = 0.15 + 0.85 * (-1.0_f64).exp();
        let r = knowledge_retention(1.0, 45.0, 1.0).unwrap();
        assert!((r - expected).abs() < 1e-12);
    }

    #[test]
    fn test_retention_approaches_plateau() {
        let r = knowledge_retention(2.0, 10_000.0, 1.0).unwrap();
        assert!((r - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_better_teaching_retains_more() {
        let standard = knowledge_retention(1.0, 30.0, 1.0).unwrap();
        let strong = knowledge_retention(1.0, 30.0, 1.5).unwrap();
        assert!(strong > standard);
    }

    #[test]
    fn test_skill_starts_at_zero_and_saturates() {
        assert_eq!(skill_acquisition(0.0, 1.0, 1.0).unwrap(), 0.0);
        assert!((skill_acquisition(1_000.0, 1.0, 1.0).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_faster_learners_acquire_more() {
        let slow = skill_acquisition(10.0, 1.0, 0.5).unwrap();
        let fast = skill_acquisition(10.0, 1.0, 2.0).unwrap();
        assert!(fast > slow);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(knowledge_retention(1.0, -1.0, 1.0).is_err());
        assert!(knowledge_retention(1.0, 1.0, 0.0).is_err());
        assert!(knowledge_retention(-1.0, 1.0, 1.0).is_err());
        assert!(skill_acquisition(-1.0, 1.0, 1.0).is_err());
        assert!(skill_acquisition(1.0, 1.0, 0.0).is_err());
        assert!(skill_acquisition(f64::NAN, 1.0, 1.0).is_err());
    }
}
