//! # Simulated hand
//!
//! A [`JointActuator`] standing in for the physics engine. Each joint is a rate limited first
//! order system driven towards its applied position target by its proportional gain. Contacts
//! block a joint at a fixed angle, the motor effort then builds up with the position error and
//! shows up as the joint force.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hand_if::eqpt::hand::{JointId, JointReading, JointWrench, NUM_JOINTS};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use util::{
    convert::Convert,
    maths::{clip, step_towards},
};

use crate::actuator::{ActuatorError, JointActuator, PidGains};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimHandParams {
    /// Duration of one physics step.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Maximum speed of any joint.
    ///
    /// Units: radians/second
    pub max_rate_rad_s: f64,

    /// Joint force produced per unit of clamped PID command.
    pub effort_scale: f64,

    /// Reported wrench force per unit of joint force.
    pub wrench_force_gain: f64,

    /// Reported wrench torque per unit of joint force.
    pub wrench_torque_gain: f64,

    /// Objects blocking joints.
    pub contacts: Vec<SimContact>,
}

/// An object stopping a joint from closing past `angle_rad`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimContact {
    pub joint: JointId,

    /// Units: radians
    pub angle_rad: f64,
}

/// The simulated hand.
#[derive(Debug, Clone)]
pub struct SimHand {
    params: SimHandParams,
    joints: [SimJoint; NUM_JOINTS],
}

#[derive(Debug, Default, Clone, Copy)]
struct SimJoint {
    angle_rad: f64,
    force: f64,
    gains: PidGains,

    /// Target set since the last apply.
    pending_target_rad: Option<f64>,

    /// Target the joint is being driven to.
    target_rad: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimHandParams {
    fn default() -> Self {
        Self {
            dt_s: 0.01,
            max_rate_rad_s: 2.0,
            effort_scale: 0.01,
            wrench_force_gain: 100.0,
            wrench_torque_gain: 10.0,
            contacts: Vec::new(),
        }
    }
}

impl SimHand {
    pub fn new(params: SimHandParams) -> Self {
        Self {
            params,
            joints: [SimJoint::default(); NUM_JOINTS],
        }
    }

    /// Current angle of every joint, in joint order.
    pub fn joint_angles(&self) -> SVector<f64, NUM_JOINTS> {
        let mut angles = [0f64; NUM_JOINTS];
        for (a, j) in angles.iter_mut().zip(self.joints.iter()) {
            *a = j.angle_rad;
        }
        angles.convert()
    }

    /// Place every joint at the given angles, e.g. to start from a pose other than fully open.
    pub fn set_joint_angles(&mut self, angles: &SVector<f64, NUM_JOINTS>) {
        let angles: [f64; NUM_JOINTS] = angles.convert();
        for (j, a) in self.joints.iter_mut().zip(angles.iter()) {
            j.angle_rad = *a;
        }
    }

    /// Advance the simulation by one step.
    pub fn step_physics(&mut self) {
        let dt_s = self.params.dt_s;
        let max_rate_rad_s = self.params.max_rate_rad_s;
        let effort_scale = self.params.effort_scale;

        for id in JointId::all().iter() {
            let contact = self.contact_angle(*id);
            let joint = &mut self.joints[id.index()];

            // Released joints just stay where they are
            let target_rad = match joint.target_rad {
                Some(t) if !joint.gains.is_zero() => t,
                _ => {
                    joint.force = 0.0;
                    continue;
                }
            };

            let rate_rad_s = (joint.gains.kp * (target_rad - joint.angle_rad).abs())
                .min(max_rate_rad_s);
            joint.angle_rad += step_towards(joint.angle_rad, target_rad, rate_rad_s * dt_s);

            if let Some(c) = contact {
                if joint.angle_rad > c {
                    joint.angle_rad = c;
                }
            }

            let command = clip(
                joint.gains.kp * (target_rad - joint.angle_rad),
                joint.gains.cmd_min,
                joint.gains.cmd_max
            );
            joint.force = command * effort_scale;
        }
    }

    fn contact_angle(&self, joint: JointId) -> Option<f64> {
        self.params.contacts
            .iter()
            .filter(|c| c.joint == joint)
            .map(|c| c.angle_rad)
            .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |b| b.min(a))))
    }
}

impl JointActuator for SimHand {
    fn read(&self, joint: JointId) -> JointReading {
        let j = &self.joints[joint.index()];

        JointReading {
            angle_rad: j.angle_rad,
            force: j.force,
            wrench: JointWrench {
                force_n: j.force.abs() * self.params.wrench_force_gain,
                torque_nm: j.force.abs() * self.params.wrench_torque_gain,
            },
        }
    }

    fn set_position_target(&mut self, joint: JointId, target_rad: f64)
        -> Result<(), ActuatorError>
    {
        if !target_rad.is_finite() {
            return Err(ActuatorError::InvalidTarget(joint, target_rad));
        }

        self.joints[joint.index()].pending_target_rad = Some(target_rad);
        Ok(())
    }

    fn set_position_pid(&mut self, joint: JointId, gains: &PidGains)
        -> Result<(), ActuatorError>
    {
        if !gains.is_valid() {
            return Err(ActuatorError::Rejected(joint, String::from("invalid gains")));
        }

        self.joints[joint.index()].gains = *gains;
        Ok(())
    }

    fn apply(&mut self) {
        for j in self.joints.iter_mut() {
            if let Some(t) = j.pending_target_rad.take() {
                j.target_rad = Some(t);
            }
        }
    }
}
