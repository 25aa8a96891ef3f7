//! # Joint actuation interface
//!
//! The hand controller never moves joints itself, it only decides position targets. Whatever
//! owns the joints (a physics engine, the simulated hand in [`crate::sim_hand`], or a test
//! double) implements [`JointActuator`] and performs the position control.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hand_if::eqpt::hand::{JointId, JointReading, NUM_JOINTS};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Capability to sense and command the joints of the hand.
pub trait JointActuator {
    /// Read the current sensor values of a joint.
    fn read(&self, joint: JointId) -> JointReading;

    /// Set the position the backend's controller shall drive the joint to.
    ///
    /// The target only takes effect on the next call to [`JointActuator::apply`].
    fn set_position_target(&mut self, joint: JointId, target_rad: f64)
        -> Result<(), ActuatorError>;

    /// Set the gains of the backend's position controller for a joint.
    ///
    /// Zero gains release the joint, it no longer holds any position.
    fn set_position_pid(&mut self, joint: JointId, gains: &PidGains)
        -> Result<(), ActuatorError>;

    /// Apply all targets set since the last call in one step.
    fn apply(&mut self);

    /// Read every joint, in joint order.
    fn read_all(&self) -> [JointReading; NUM_JOINTS] {
        let mut readings = [JointReading::default(); NUM_JOINTS];

        for id in JointId::all().iter() {
            readings[id.index()] = self.read(*id);
        }

        readings
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gains and limits of a joint position PID controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,

    /// Integral term limits
    pub i_min: f64,
    pub i_max: f64,

    /// Output command limits
    pub cmd_min: f64,
    pub cmd_max: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by an actuation backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ActuatorError {
    #[error("Joint {0:?} rejected the target {1}")]
    InvalidTarget(JointId, f64),

    #[error("Joint {0:?} rejected the command: {1}")]
    Rejected(JointId, String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PidGains {
    /// Gains that disable position control.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.kp == 0.0 && self.ki == 0.0 && self.kd == 0.0
    }

    /// Build symmetric gains, the limits are `[-i_lim, i_lim]` and `[-cmd_lim, cmd_lim]`.
    pub fn symmetric(kp: f64, ki: f64, kd: f64, i_lim: f64, cmd_lim: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            i_min: -i_lim,
            i_max: i_lim,
            cmd_min: -cmd_lim,
            cmd_max: cmd_lim,
        }
    }

    /// Check that the limits are ordered and the gains are finite.
    pub fn is_valid(&self) -> bool {
        [self.kp, self.ki, self.kd, self.i_min, self.i_max, self.cmd_min, self.cmd_max]
            .iter()
            .all(|v| v.is_finite())
            && self.i_min <= self.i_max
            && self.cmd_min <= self.cmd_max
    }
}
