//! Parameters structure for HandCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hand_if::eqpt::hand::JointId;
use serde::{Deserialize, Serialize};

use crate::actuator::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Hand control.
///
/// All fields have defaults tuned for the simulated gripper, so a parameter file only needs to
/// list the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- BACKEND ----

    /// Prefix of the joint names in the physics model.
    pub joint_prefix: String,

    /// If true every cycle is a no-op, the hand is left entirely to the backend.
    pub disable_component: bool,

    // ---- FORCE THRESHOLDS ----

    /// Proximal joint force above which the clutch slips while closing.
    pub breakaway_force: f64,

    /// Sum of proximal and distal force magnitudes above which a finger latches overcurrent.
    pub finger_overcurrent_force: f64,

    /// Magnitude of the summed spread joint forces above which the spread latches overcurrent.
    pub spread_overcurrent_force: f64,

    /// Limits which break a finger when exceeded for long enough.
    pub breakage: BreakageLimits,

    // ---- OUTPUTS ----

    /// Factor applied to the joint forces to estimate the joint torques.
    pub torque_est_factor: f64,

    /// Distance under which the integrated target is considered to have reached the commanded
    /// target.
    ///
    /// Units: radians
    pub target_reached_tol_rad: f64,

    // ---- POSITION CONTROL ----

    /// Gains for the spread (knuckle one) joints.
    pub spread_pid: PidGains,

    /// Gains for the proximal (knuckle two) joints.
    pub proximal_pid: PidGains,

    /// Gains for the distal (knuckle three) joints.
    pub distal_pid: PidGains,
}

/// Wrench limits of a finger's joints and the number of consecutive cycles they may be exceeded
/// before the finger breaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakageLimits {
    /// Units: newtons
    pub proximal_force_n: f64,

    /// Units: newton meters
    pub proximal_torque_nm: f64,

    /// Units: newtons
    pub distal_force_n: f64,

    /// Units: newton meters
    pub distal_torque_nm: f64,

    /// Number of consecutive over limit cycles that break the finger.
    pub latch_count: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            joint_prefix: String::from("right"),
            disable_component: false,
            breakaway_force: 0.25,
            finger_overcurrent_force: 0.5,
            spread_overcurrent_force: 0.5,
            breakage: BreakageLimits::default(),
            torque_est_factor: 1000.0,
            target_reached_tol_rad: 1e-9,
            spread_pid: PidGains::symmetric(80.0, 20.0, 0.0, 10.0, 80.0),
            proximal_pid: PidGains::symmetric(40.0, 10.0, 0.0, 5.0, 40.0),
            distal_pid: PidGains::symmetric(20.0, 5.0, 0.0, 2.5, 20.0),
        }
    }
}

impl Default for BreakageLimits {
    fn default() -> Self {
        Self {
            proximal_force_n: 40.0,
            proximal_torque_nm: 8.0,
            distal_force_n: 40.0,
            distal_torque_nm: 6.0,
            latch_count: 100,
        }
    }
}

impl Params {
    /// The position controller gains to install on a joint.
    pub fn gains_for(&self, joint: JointId) -> &PidGains {
        if joint.is_spread() {
            &self.spread_pid
        }
        else if joint.is_distal() {
            &self.distal_pid
        }
        else {
            &self.proximal_pid
        }
    }

    /// Check the parameters are usable, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let thresholds = [
            ("breakaway_force", self.breakaway_force),
            ("finger_overcurrent_force", self.finger_overcurrent_force),
            ("spread_overcurrent_force", self.spread_overcurrent_force),
            ("breakage.proximal_force_n", self.breakage.proximal_force_n),
            ("breakage.proximal_torque_nm", self.breakage.proximal_torque_nm),
            ("breakage.distal_force_n", self.breakage.distal_force_n),
            ("breakage.distal_torque_nm", self.breakage.distal_torque_nm),
            ("torque_est_factor", self.torque_est_factor),
            ("target_reached_tol_rad", self.target_reached_tol_rad),
        ];

        for (name, value) in thresholds.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(format!("{} must be finite and positive, found {}", name, value));
            }
        }

        if self.breakage.latch_count == 0 {
            return Err(String::from("breakage.latch_count must be at least 1"));
        }

        for (name, gains) in [
            ("spread_pid", &self.spread_pid),
            ("proximal_pid", &self.proximal_pid),
            ("distal_pid", &self.distal_pid),
        ].iter() {
            if !gains.is_valid() {
                return Err(format!("{} has non-finite gains or inverted limits", name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file() {
        let params: Params = util::params::from_str(r#"
            joint_prefix = "left"

            [breakage]
            latch_count = 10

            [distal_pid]
            kp = 1.0
            ki = 0.0
            kd = 0.0
            i_min = 0.0
            i_max = 0.0
            cmd_min = -1.0
            cmd_max = 1.0
        "#).unwrap();

        assert_eq!(params.joint_prefix, "left");
        assert_eq!(params.breakage.latch_count, 10);
        assert_eq!(params.breakage.distal_torque_nm, 6.0);
        assert_eq!(params.finger_overcurrent_force, 0.5);
        assert_eq!(params.gains_for(JointId::F3K3).kp, 1.0);
        assert_eq!(params.gains_for(JointId::F2K1).kp, 80.0);
        assert_eq!(params.gains_for(JointId::F1K2).cmd_max, 40.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut params = Params::default();
        params.breakaway_force = -0.1;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.breakage.latch_count = 0;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.spread_pid.cmd_min = 100.0;
        assert!(params.validate().is_err());
    }
}
