//! # Hand control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::hand::NUM_DOFS;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Motion command for a single degree of freedom.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DofCmd {
    /// Angle the DOF shall move to.
    ///
    /// Units: radians
    pub target_angle_rad: f64,

    /// Maximum change of the commanded position per cycle. Telecommands with a negative step
    /// are rejected, the controller uses the magnitude of whatever it is given.
    ///
    /// Units: radians/cycle
    pub step_rad: f64,

    /// Start a new move. Consumed by the first cycle that is applied.
    #[serde(default)]
    pub move_trigger: bool,
}

/// Full command record for the hand, indices 0-2 are the finger curls, 3 is the spread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandCmd {
    pub dofs: [DofCmd; NUM_DOFS],

    /// Hold the fingers once the grasp is done.
    ///
    /// Passed through for the pressure limiting stage, unused by the position control.
    #[serde(default)]
    pub hold: bool,

    /// Maximum allowed tactile pressure.
    ///
    /// Passed through for the pressure limiting stage, unused by the position control.
    #[serde(default)]
    pub max_pressure: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HandCmd {
    /// Clear all move triggers, done once a cycle has consumed them.
    pub fn clear_triggers(&mut self) {
        for dof in self.dofs.iter_mut() {
            dof.move_trigger = false;
        }
    }

    /// True if any DOF has a pending move trigger.
    pub fn has_trigger(&self) -> bool {
        self.dofs.iter().any(|d| d.move_trigger)
    }
}
