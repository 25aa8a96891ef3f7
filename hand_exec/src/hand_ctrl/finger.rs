//! Finger controller
//!
//! Each finger has a proximal (knuckle two) and a distal (knuckle three) joint driven by one
//! motor. The breakaway clutch between them normally forces the distal joint to a third of the
//! proximal angle. When the proximal link is stopped by an object while closing the clutch
//! slips: the proximal joint stays where it was stopped and the distal joint keeps curling
//! around the object. When opening again the clutch re-engages once the distal joint has caught
//! up and the finger is nearly fully open.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hand_if::{
    eqpt::hand::{JointId, JointReading, FINGER_JOINTS, NUM_FINGERS, NUM_JOINTS},
    tc::hand_ctrl::DofCmd,
};
use log::info;
use serde::Serialize;

use super::{
    is_breakaway, is_finger_overcurrent, BreakageMonitor, DofController, DofState,
    JointTargets, Params
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Proximal angle under which a slipped clutch re-engages while opening.
///
/// Units: radians
pub const CLUTCH_REENGAGE_ANGLE_RAD: f64 = 0.03;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Finger controller state.
#[derive(Debug, Clone)]
pub struct FingerCtrl {
    index: usize,
    proximal: JointId,
    distal: JointId,
    label: String,

    state: DofState,

    clutch_broken: bool,

    /// Proximal angle at which the clutch slipped.
    ///
    /// Units: radians
    clutch_break_angle: f64,

    breakage: BreakageMonitor,
}

/// Snapshot of everything a finger controller remembers between cycles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct FingerRuntimeState {
    pub integrated_target: f64,
    pub idle: bool,
    pub overcurrent: bool,
    pub clutch_broken: bool,
    pub clutch_break_angle: f64,
    pub breakage_counter: u32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Observable mode of a finger, by decreasing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FingerMode {
    /// Permanently disabled.
    Broken,
    /// Frozen until the next move.
    Overcurrent,
    /// Target reached.
    Idle,
    /// Moving with the distal joint decoupled.
    ClutchBroken,
    /// Moving with the joints coupled.
    ClutchEngaged,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for FingerMode {
    fn default() -> Self {
        FingerMode::Idle
    }
}

impl FingerCtrl {
    /// Create the controller of finger `index` (0 to 2).
    ///
    /// Returns `None` for any other index.
    pub fn new(index: usize) -> Option<Self> {
        JointId::finger_pair(index).map(|joints| Self::with_joints(index, joints))
    }

    /// Controllers of all fingers, in finger order.
    pub fn all() -> [Self; NUM_FINGERS] {
        [0, 1, 2].map(|i| Self::with_joints(i, FINGER_JOINTS[i]))
    }

    fn with_joints(index: usize, (proximal, distal): (JointId, JointId)) -> Self {
        Self {
            index,
            proximal,
            distal,
            label: format!("finger {}", index),
            state: DofState::default(),
            clutch_broken: false,
            clutch_break_angle: 0.0,
            breakage: BreakageMonitor::default(),
        }
    }

    /// The (proximal, distal) joints of this finger.
    pub fn joints(&self) -> (JointId, JointId) {
        (self.proximal, self.distal)
    }

    pub fn is_clutch_broken(&self) -> bool {
        self.clutch_broken
    }

    pub fn mode(&self) -> FingerMode {
        if self.breakage.is_broken() {
            FingerMode::Broken
        }
        else if self.state.overcurrent {
            FingerMode::Overcurrent
        }
        else if self.state.idle {
            FingerMode::Idle
        }
        else if self.clutch_broken {
            FingerMode::ClutchBroken
        }
        else {
            FingerMode::ClutchEngaged
        }
    }

    pub fn runtime_state(&self) -> FingerRuntimeState {
        FingerRuntimeState {
            integrated_target: self.state.integrated_target,
            idle: self.state.idle,
            overcurrent: self.state.overcurrent,
            clutch_broken: self.clutch_broken,
            clutch_break_angle: self.clutch_break_angle,
            breakage_counter: self.breakage.counter(),
        }
    }

    /// Feed this cycle's joint wrenches to the breakage monitor.
    ///
    /// Returns true on the cycle the finger breaks.
    pub fn monitor_breakage(
        &mut self,
        readings: &[JointReading; NUM_JOINTS],
        params: &Params
    ) -> bool {
        let broke = self.breakage.update(
            &readings[self.proximal.index()].wrench,
            &readings[self.distal.index()].wrench,
            &params.breakage
        );

        if broke {
            info!("{} is broken", self.label);
            self.state.idle = true;
        }

        broke
    }

    /// Targets while the clutch has slipped.
    ///
    /// The proximal joint stays at the breakaway angle and the distal joint takes all the
    /// remaining travel. When opening and the distal joint is back under its coupled position the
    /// finger moves coupled again, and the clutch re-engages near full open.
    fn clutch_broken_targets(&mut self, is_opening: bool, proximal_angle: f64) -> (f64, f64) {
        let x = self.state.integrated_target;
        let mut proximal_target = self.clutch_break_angle;
        let mut distal_target = x - self.clutch_break_angle * 2.0 / 3.0;

        if is_opening && distal_target < self.clutch_break_angle / 3.0 {
            proximal_target = x;
            distal_target = x / 3.0;

            if proximal_angle < CLUTCH_REENGAGE_ANGLE_RAD {
                self.clutch_broken = false;
                info!("{} clutch is engaged", self.label);
            }
        }

        (proximal_target, distal_target)
    }
}

impl DofController for FingerCtrl {
    fn dof(&self) -> usize {
        self.index
    }

    fn state(&self) -> &DofState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DofState {
        &mut self.state
    }

    fn is_broken(&self) -> bool {
        self.breakage.is_broken()
    }

    fn step(
        &mut self,
        cmd: &DofCmd,
        readings: &[JointReading; NUM_JOINTS],
        params: &Params
    ) -> JointTargets {
        let proximal = readings[self.proximal.index()];
        let distal = readings[self.distal.index()];
        let hold = JointTargets::hold(self.proximal, self.distal, readings);

        if self.breakage.is_broken() || self.state.overcurrent {
            self.state.idle = true;
            return hold;
        }

        let is_opening = self.state.integrate(
            cmd.target_angle_rad,
            cmd.step_rad,
            params.target_reached_tol_rad,
            &self.label
        );

        if !is_opening && is_breakaway(proximal.force, params.breakaway_force) {
            if !self.clutch_broken {
                info!("{} clutch is disengaged", self.label);
            }
            self.clutch_broken = true;
            self.clutch_break_angle = proximal.angle_rad;
        }

        if is_finger_overcurrent(proximal.force, distal.force, params.finger_overcurrent_force) {
            self.state.latch_overcurrent(&self.label);
            return hold;
        }

        let (proximal_target, distal_target) = if self.clutch_broken {
            self.clutch_broken_targets(is_opening, proximal.angle_rad)
        }
        else {
            let x = self.state.integrated_target;
            (x, x / 3.0)
        };

        JointTargets::new((self.proximal, proximal_target), (self.distal, distal_target))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cmd(target_angle_rad: f64, step_rad: f64) -> DofCmd {
        DofCmd {
            target_angle_rad,
            step_rad,
            move_trigger: false,
        }
    }

    /// Readings with finger 0's proximal and distal joints set.
    fn readings(prox: (f64, f64), dist: (f64, f64)) -> [JointReading; NUM_JOINTS] {
        let mut r = [JointReading::default(); NUM_JOINTS];
        r[JointId::F1K2.index()].angle_rad = prox.0;
        r[JointId::F1K2.index()].force = prox.1;
        r[JointId::F1K3.index()].angle_rad = dist.0;
        r[JointId::F1K3.index()].force = dist.1;
        r
    }

    #[test]
    fn test_only_three_fingers() {
        assert!(FingerCtrl::new(2).is_some());
        assert!(FingerCtrl::new(3).is_none());

        let all = FingerCtrl::all();
        assert_eq!(all[1].dof(), 1);
        assert_eq!(all[2].joints(), (JointId::F3K2, JointId::F3K3));
    }

    #[test]
    fn test_coupled_closing() {
        let params = Params::default();
        let mut finger = FingerCtrl::new(0).unwrap();
        let r = readings((0.0, 0.0), (0.0, 0.0));

        for cycle in 1..=10 {
            let t = finger.step(&cmd(1.0, 0.1), &r, &params);
            let x = finger.state().integrated_target;

            assert!((x - 0.1 * cycle as f64).abs() < 1e-9);
            assert_eq!(t.get(JointId::F1K2), Some(x));
            assert_eq!(t.get(JointId::F1K3), Some(x / 3.0));
            assert_eq!(finger.state().idle, cycle == 10);
        }

        assert_eq!(finger.state().integrated_target, 1.0);
        assert_eq!(finger.mode(), FingerMode::Idle);
    }

    #[test]
    fn test_breakaway_and_reengage() {
        let params = Params::default();
        let mut finger = FingerCtrl::new(0).unwrap();
        finger.state_mut().integrated_target = 0.6;
        finger.state_mut().idle = false;

        // Proximal link blocked at 0.6 while closing
        let t = finger.step(&cmd(1.5, 0.1), &readings((0.6, 0.3), (0.2, 0.1)), &params);
        assert!(finger.is_clutch_broken());
        assert_eq!(finger.runtime_state().clutch_break_angle, 0.6);
        assert_eq!(finger.mode(), FingerMode::ClutchBroken);
        assert_eq!(t.get(JointId::F1K2), Some(0.6));
        assert!((t.get(JointId::F1K3).unwrap() - (0.7 - 0.4)).abs() < 1e-12);

        // Keeps closing with the distal joint only, even with the load gone
        let t = finger.step(&cmd(1.5, 0.1), &readings((0.6, 0.0), (0.3, 0.0)), &params);
        assert!(finger.is_clutch_broken());
        assert_eq!(t.get(JointId::F1K2), Some(0.6));
        assert!((t.get(JointId::F1K3).unwrap() - (0.8 - 0.4)).abs() < 1e-12);

        // Opening: the distal joint unwinds first while the proximal joint is held
        let t = finger.step(&cmd(0.0, 0.1), &readings((0.6, 0.0), (0.4, 0.0)), &params);
        assert!((finger.state().integrated_target - 0.7).abs() < 1e-12);
        assert_eq!(t.get(JointId::F1K2), Some(0.6));

        // Distal caught up, moving coupled again but still far from open
        finger.state_mut().integrated_target = 0.5;
        let t = finger.step(&cmd(0.0, 0.1), &readings((0.5, 0.0), (0.15, 0.0)), &params);
        let x = finger.state().integrated_target;
        assert_eq!(t.get(JointId::F1K2), Some(x));
        assert_eq!(t.get(JointId::F1K3), Some(x / 3.0));
        assert!(finger.is_clutch_broken());

        // Near fully open the clutch engages again
        finger.step(&cmd(0.0, 0.1), &readings((0.02, 0.0), (0.0, 0.0)), &params);
        assert!(!finger.is_clutch_broken());
    }

    #[test]
    fn test_no_breakaway_when_opening() {
        let params = Params::default();
        let mut finger = FingerCtrl::new(0).unwrap();
        finger.state_mut().integrated_target = 1.0;

        finger.step(&cmd(0.0, 0.1), &readings((1.0, 0.3), (0.33, 0.0)), &params);
        assert!(!finger.is_clutch_broken());
    }

    #[test]
    fn test_overcurrent_holds_measured_angles() {
        let params = Params::default();
        let mut finger = FingerCtrl::new(0).unwrap();
        finger.state_mut().integrated_target = 0.5;

        let r = readings((0.45, 0.3), (0.2, -0.3));
        let t = finger.step(&cmd(1.0, 0.1), &r, &params);

        assert_eq!(t, JointTargets::hold(JointId::F1K2, JointId::F1K3, &r));
        assert_eq!(t.get(JointId::F1K2), Some(0.45));
        assert_eq!(t.get(JointId::F1K3), Some(0.2));
        assert!(finger.state().overcurrent);
        assert!(finger.state().idle);
        assert_eq!(finger.mode(), FingerMode::Overcurrent);

        // Held at whatever the joints measure until a new move
        let x = finger.state().integrated_target;
        let r2 = readings((0.44, 0.0), (0.21, 0.0));
        let t2 = finger.step(&cmd(1.0, 0.1), &r2, &params);
        assert_eq!(t2.get(JointId::F1K2), Some(0.44));
        assert_eq!(finger.state().integrated_target, x);

        finger.start_move(&r2);
        assert!(!finger.state().overcurrent);
        assert!(!finger.state().idle);
        assert!((finger.state().integrated_target - (0.44 + 0.21 - 0.44 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_broken_finger_holds() {
        let mut params = Params::default();
        params.breakage.latch_count = 2;
        let mut finger = FingerCtrl::new(0).unwrap();

        let mut r = readings((0.3, 0.0), (0.1, 0.0));
        r[JointId::F1K2.index()].wrench.force_n = 100.0;

        assert!(!finger.monitor_breakage(&r, &params));
        assert!(finger.monitor_breakage(&r, &params));
        assert!(finger.is_broken());
        assert_eq!(finger.mode(), FingerMode::Broken);

        finger.start_move(&r);
        let t = finger.step(&cmd(1.0, 0.1), &r, &params);
        assert_eq!(t.get(JointId::F1K2), Some(0.3));
        assert_eq!(t.get(JointId::F1K3), Some(0.1));
        assert!(finger.state().idle);
    }
}
