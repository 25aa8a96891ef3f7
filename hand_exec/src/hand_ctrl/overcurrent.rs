//! Overcurrent checks
//!
//! Stateless checks of the joint forces against the thresholds, evaluated every cycle. The
//! latches they feed are owned by the DOF controllers.

/// The proximal joint is loaded enough for the clutch to slip.
pub fn is_breakaway(proximal_force: f64, threshold: f64) -> bool {
    proximal_force.abs() > threshold
}

/// Combined load on a finger's joints exceeds the overcurrent threshold.
pub fn is_finger_overcurrent(proximal_force: f64, distal_force: f64, threshold: f64) -> bool {
    proximal_force.abs() + distal_force.abs() > threshold
}

/// Load on the spread exceeds the overcurrent threshold.
///
/// The spread joints mirror each other so their forces are summed with sign, equal and opposite
/// forces from the coupling itself cancel out.
pub fn is_spread_overcurrent(force_a: f64, force_b: f64, threshold: f64) -> bool {
    (force_a + force_b).abs() > threshold
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_thresholds_are_exclusive() {
        assert!(!is_breakaway(0.25, 0.25));
        assert!(is_breakaway(-0.26, 0.25));

        assert!(!is_finger_overcurrent(0.25, -0.25, 0.5));
        assert!(is_finger_overcurrent(0.3, -0.3, 0.5));
    }

    #[test]
    fn test_spread_sum_is_signed() {
        assert!(!is_spread_overcurrent(0.4, -0.4, 0.5));
        assert!(is_spread_overcurrent(0.3, 0.3, 0.5));
        assert!(is_spread_overcurrent(-0.3, -0.3, 0.5));
    }
}
