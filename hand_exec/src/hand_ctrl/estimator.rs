//! Effective DOF angle estimation
//!
//! The integrator of each DOF works in a single scalar frame, these functions derive that scalar
//! from the measured joint angles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hand_if::eqpt::hand::{JointId, JointReading, NUM_JOINTS, SPREAD_DOF};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Effective curl angle of a finger from its proximal and distal joint angles.
///
/// With the clutch engaged the distal joint sits at a third of the proximal one, so the
/// estimate equals the proximal angle. Any extra distal travel from a clutch breakaway is
/// added on top.
pub fn curl_angle(proximal_rad: f64, distal_rad: f64) -> f64 {
    proximal_rad + (distal_rad - proximal_rad / 3.0)
}

/// Effective spread angle, the mean of the two symmetric spread joints.
pub fn spread_angle(a_rad: f64, b_rad: f64) -> f64 {
    (a_rad + b_rad) / 2.0
}

/// Effective angle of the given DOF from a snapshot of all joint readings.
///
/// Returns zero for an index which is not a DOF.
pub fn dof_angle(dof: usize, readings: &[JointReading; NUM_JOINTS]) -> f64 {
    if dof == SPREAD_DOF {
        let (a, b) = JointId::spread_pair();
        return spread_angle(readings[a.index()].angle_rad, readings[b.index()].angle_rad);
    }

    match JointId::finger_pair(dof) {
        Some((prox, dist)) => curl_angle(
            readings[prox.index()].angle_rad,
            readings[dist.index()].angle_rad
        ),
        None => 0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn readings_from_angles(angles: [f64; NUM_JOINTS]) -> [JointReading; NUM_JOINTS] {
        let mut readings = [JointReading::default(); NUM_JOINTS];
        for (r, a) in readings.iter_mut().zip(angles.iter()) {
            r.angle_rad = *a;
        }
        readings
    }

    #[test]
    fn test_coupled_finger() {
        // Rigid 3:1 coupling gives back the proximal angle
        assert!((curl_angle(0.9, 0.3) - 0.9).abs() < 1e-12);

        // Distal joint ahead of the coupling after a breakaway
        assert!((curl_angle(0.6, 0.5) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_dof_angle() {
        let readings = readings_from_angles([0.2, 0.9, 0.3, 0.4, 1.2, 0.4, 0.3, 0.6]);

        assert!((dof_angle(0, &readings) - 0.9).abs() < 1e-12);
        assert!((dof_angle(1, &readings) - 1.2).abs() < 1e-12);
        assert!((dof_angle(2, &readings) - 0.8).abs() < 1e-12);
        assert!((dof_angle(SPREAD_DOF, &readings) - 0.3).abs() < 1e-12);
        assert_eq!(dof_angle(7, &readings), 0.0);
    }
}
