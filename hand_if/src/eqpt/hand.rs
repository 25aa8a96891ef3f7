//! # Hand Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of actuated joints in the hand.
pub const NUM_JOINTS: usize = 8;

/// The number of commanded degrees of freedom (three finger curls and the spread).
pub const NUM_DOFS: usize = 4;

/// The number of fingers in the hand.
pub const NUM_FINGERS: usize = 3;

/// Index of the spread degree of freedom in per-DOF arrays.
pub const SPREAD_DOF: usize = 3;

const JOINT_IDS: [JointId; NUM_JOINTS] = [
    JointId::F1K1,
    JointId::F1K2,
    JointId::F1K3,
    JointId::F2K1,
    JointId::F2K2,
    JointId::F2K3,
    JointId::F3K2,
    JointId::F3K3,
];

/// The (proximal, distal) joints of each finger, in finger order.
pub const FINGER_JOINTS: [(JointId, JointId); NUM_FINGERS] = [
    (JointId::F1K2, JointId::F1K3),
    (JointId::F2K2, JointId::F2K3),
    (JointId::F3K2, JointId::F3K3),
];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Magnitudes of the force and torque transmitted through a joint.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct JointWrench {
    /// Units: newtons
    pub force_n: f64,

    /// Units: newton meters
    pub torque_nm: f64,
}

/// Snapshot of a single joint's sensors for one cycle.
///
/// Owned by the actuation backend, the controller never mutates it.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct JointReading {
    /// Units: radians
    pub angle_rad: f64,

    /// Generalised force currently applied by the joint motor.
    pub force: f64,

    /// Wrench transmitted through the joint.
    pub wrench: JointWrench,
}

/// Outputs of the hand controller, recomputed every cycle.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct HandOutputs {
    /// Measured joint positions, in joint order.
    ///
    /// Units: radians
    pub joint_angles_rad: [f64; NUM_JOINTS],

    /// Measured joint force scaled into a torque estimate, in joint order.
    pub joint_torque_est: [f64; NUM_JOINTS],

    /// The DOF has reached its target or is being held.
    pub idle: [bool; NUM_DOFS],

    /// The DOF is latched in overcurrent.
    pub overcurrent: [bool; NUM_DOFS],

    /// The DOF has been permanently disabled by excessive load. Always false for the spread.
    pub broken: [bool; NUM_DOFS],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the hand's joints.
///
/// Knuckle one of fingers one and two forms the spread, knuckles two and three are the proximal
/// and distal joints of each finger. Finger three has no spread joint.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    F1K1,
    F1K2,
    F1K3,
    F2K1,
    F2K2,
    F2K3,
    F3K2,
    F3K3,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointId {
    /// All joints in index order.
    pub fn all() -> &'static [JointId; NUM_JOINTS] {
        &JOINT_IDS
    }

    /// Position of this joint in per-joint arrays.
    pub fn index(&self) -> usize {
        match self {
            JointId::F1K1 => 0,
            JointId::F1K2 => 1,
            JointId::F1K3 => 2,
            JointId::F2K1 => 3,
            JointId::F2K2 => 4,
            JointId::F2K3 => 5,
            JointId::F3K2 => 6,
            JointId::F3K3 => 7,
        }
    }

    /// The (proximal, distal) joints of the given finger, or `None` if `finger` is not a finger
    /// index.
    pub fn finger_pair(finger: usize) -> Option<(JointId, JointId)> {
        FINGER_JOINTS.get(finger).copied()
    }

    /// The two joints driven together by the spread DOF.
    pub fn spread_pair() -> (JointId, JointId) {
        (JointId::F1K1, JointId::F2K1)
    }

    /// True for the knuckle one joints.
    pub fn is_spread(&self) -> bool {
        matches!(self, JointId::F1K1 | JointId::F2K1)
    }

    /// True for the knuckle three joints.
    pub fn is_distal(&self) -> bool {
        matches!(self, JointId::F1K3 | JointId::F2K3 | JointId::F3K3)
    }

    /// Name of the joint in the physics model, e.g. `right_HandFingerOneKnuckleTwoJoint`.
    pub fn scoped_name(&self, prefix: &str) -> String {
        let (finger, knuckle) = match self {
            JointId::F1K1 => ("One", "One"),
            JointId::F1K2 => ("One", "Two"),
            JointId::F1K3 => ("One", "Three"),
            JointId::F2K1 => ("Two", "One"),
            JointId::F2K2 => ("Two", "Two"),
            JointId::F2K3 => ("Two", "Three"),
            JointId::F3K2 => ("Three", "Two"),
            JointId::F3K3 => ("Three", "Three"),
        };

        format!("{}_HandFinger{}Knuckle{}Joint", prefix, finger, knuckle)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_joint_indices() {
        for (i, id) in JointId::all().iter().enumerate() {
            assert_eq!(id.index(), i);
        }

        assert_eq!(JointId::finger_pair(2), Some((JointId::F3K2, JointId::F3K3)));
        assert_eq!(JointId::finger_pair(3), None);
        assert!(JointId::F2K1.is_spread());
        assert!(JointId::F3K3.is_distal());
        assert!(!JointId::F3K2.is_distal());
    }

    #[test]
    fn test_scoped_name() {
        assert_eq!(
            JointId::F2K3.scoped_name("right"),
            "right_HandFingerTwoKnuckleThreeJoint"
        );
    }
}
