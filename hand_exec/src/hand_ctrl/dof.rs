//! Common pieces of the DOF controllers
//!
//! Both the spread and the finger controllers advance a virtual commanded position towards the
//! commanded target at a bounded rate and latch overcurrent. That part lives here, together with
//! the [`DofCtrl`] tag used by the hand to dispatch to either controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use hand_if::{
    eqpt::hand::{JointId, JointReading, NUM_JOINTS},
    tc::hand_ctrl::DofCmd,
};
use log::info;
use serde::Serialize;

// Internal
use super::{dof_angle, FingerCtrl, Params, SpreadCtrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Integrator and latches shared by all DOFs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DofState {
    /// Commanded position tracked by the controller.
    ///
    /// Units: radians
    pub integrated_target: f64,

    /// The integrated target has reached the commanded target, or the DOF is frozen.
    pub idle: bool,

    /// Latched when the joint forces exceeded the overcurrent threshold.
    pub overcurrent: bool,
}

/// Position targets computed for the two joints of a DOF in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointTargets {
    pub joints: [(JointId, f64); 2],
}

/// Controller of a single DOF, tagged by its kind.
#[derive(Debug, Clone)]
pub enum DofCtrl {
    Spread(SpreadCtrl),
    Finger(FingerCtrl),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Behaviour shared by the spread and finger controllers.
pub trait DofController {
    /// Index of the controlled DOF.
    fn dof(&self) -> usize;

    /// Shared integrator state.
    fn state(&self) -> &DofState;

    /// Mutable integrator state.
    fn state_mut(&mut self) -> &mut DofState;

    /// Compute this cycle's joint targets.
    fn step(
        &mut self,
        cmd: &DofCmd,
        readings: &[JointReading; NUM_JOINTS],
        params: &Params
    ) -> JointTargets;

    /// True once the DOF can no longer be controlled.
    fn is_broken(&self) -> bool {
        false
    }

    /// Start a new move from the current physical pose.
    ///
    /// The integrator is resynchronised to the measured DOF angle, and the idle and overcurrent
    /// latches are released.
    fn start_move(&mut self, readings: &[JointReading; NUM_JOINTS]) {
        let angle = dof_angle(self.dof(), readings);
        let state = self.state_mut();

        state.integrated_target = angle;
        state.idle = false;
        state.overcurrent = false;
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DofState {
    fn default() -> Self {
        Self {
            integrated_target: 0.0,
            idle: true,
            overcurrent: false,
        }
    }
}

impl DofState {
    /// Advance the integrated target by at most `step_rad` towards `target_rad`.
    ///
    /// Sets `idle` once the target is reached, the integrated target is then clamped onto it.
    /// Returns true if the DOF is opening (moving towards smaller angles).
    pub fn integrate(&mut self, target_rad: f64, step_rad: f64, tol_rad: f64, label: &str) -> bool {
        let step_rad = step_rad.abs();

        if (target_rad - self.integrated_target).abs() <= tol_rad {
            self.integrated_target = target_rad;
            self.set_idle(label, "");
            return false;
        }

        if self.integrated_target > target_rad {
            self.integrated_target -= step_rad;
            if self.integrated_target <= target_rad + tol_rad {
                self.integrated_target = target_rad;
                self.set_idle(label, " -- opening");
            }
            else {
                self.idle = false;
            }
            true
        }
        else {
            self.integrated_target += step_rad;
            if self.integrated_target >= target_rad - tol_rad {
                self.integrated_target = target_rad;
                self.set_idle(label, " -- closing");
            }
            else {
                self.idle = false;
            }
            false
        }
    }

    /// Latch overcurrent, which also makes the DOF idle.
    pub fn latch_overcurrent(&mut self, label: &str) {
        if !self.overcurrent {
            info!("{} overcurrent", label);
        }
        self.overcurrent = true;
        self.idle = true;
    }

    fn set_idle(&mut self, label: &str, direction: &str) {
        if !self.idle {
            info!("{} idle{}", label, direction);
        }
        self.idle = true;
    }
}

impl JointTargets {
    pub fn new(a: (JointId, f64), b: (JointId, f64)) -> Self {
        Self { joints: [a, b] }
    }

    /// Targets holding both joints where they currently are.
    pub fn hold(a: JointId, b: JointId, readings: &[JointReading; NUM_JOINTS]) -> Self {
        Self::new(
            (a, readings[a.index()].angle_rad),
            (b, readings[b.index()].angle_rad)
        )
    }

    /// Target of the given joint, if it belongs to this DOF.
    pub fn get(&self, joint: JointId) -> Option<f64> {
        self.joints.iter().find(|(j, _)| *j == joint).map(|(_, t)| *t)
    }
}

impl DofCtrl {
    /// The finger controller, if this DOF is a finger.
    pub fn as_finger(&self) -> Option<&FingerCtrl> {
        match self {
            DofCtrl::Finger(f) => Some(f),
            DofCtrl::Spread(_) => None,
        }
    }

    /// Mutable finger controller, if this DOF is a finger.
    pub fn as_finger_mut(&mut self) -> Option<&mut FingerCtrl> {
        match self {
            DofCtrl::Finger(f) => Some(f),
            DofCtrl::Spread(_) => None,
        }
    }
}

impl DofController for DofCtrl {
    fn dof(&self) -> usize {
        match self {
            DofCtrl::Spread(s) => s.dof(),
            DofCtrl::Finger(f) => f.dof(),
        }
    }

    fn state(&self) -> &DofState {
        match self {
            DofCtrl::Spread(s) => s.state(),
            DofCtrl::Finger(f) => f.state(),
        }
    }

    fn state_mut(&mut self) -> &mut DofState {
        match self {
            DofCtrl::Spread(s) => s.state_mut(),
            DofCtrl::Finger(f) => f.state_mut(),
        }
    }

    fn step(
        &mut self,
        cmd: &DofCmd,
        readings: &[JointReading; NUM_JOINTS],
        params: &Params
    ) -> JointTargets {
        match self {
            DofCtrl::Spread(s) => s.step(cmd, readings, params),
            DofCtrl::Finger(f) => f.step(cmd, readings, params),
        }
    }

    fn is_broken(&self) -> bool {
        match self {
            DofCtrl::Spread(s) => s.is_broken(),
            DofCtrl::Finger(f) => f.is_broken(),
        }
    }
}
