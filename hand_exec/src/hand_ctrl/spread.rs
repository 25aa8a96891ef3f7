//! Spread controller
//!
//! The spread is a single DOF driving knuckle one of fingers one and two symmetrically. There is
//! no clutch, both joints simply follow the integrated target.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hand_if::{
    eqpt::hand::{JointId, JointReading, NUM_JOINTS, SPREAD_DOF},
    tc::hand_ctrl::DofCmd,
};

use super::{dof_angle, is_spread_overcurrent, DofController, DofState, JointTargets, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Spread DOF controller state.
#[derive(Debug, Default, Clone)]
pub struct SpreadCtrl {
    state: DofState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpreadCtrl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DofController for SpreadCtrl {
    fn dof(&self) -> usize {
        SPREAD_DOF
    }

    fn state(&self) -> &DofState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DofState {
        &mut self.state
    }

    fn step(
        &mut self,
        cmd: &DofCmd,
        readings: &[JointReading; NUM_JOINTS],
        params: &Params
    ) -> JointTargets {
        let (a, b) = JointId::spread_pair();
        let mean_spread = dof_angle(SPREAD_DOF, readings);
        let frozen = JointTargets::new((a, mean_spread), (b, mean_spread));

        if self.state.overcurrent {
            return frozen;
        }

        self.state.integrate(
            cmd.target_angle_rad,
            cmd.step_rad,
            params.target_reached_tol_rad,
            "spread"
        );

        if is_spread_overcurrent(
            readings[a.index()].force,
            readings[b.index()].force,
            params.spread_overcurrent_force
        ) {
            self.state.latch_overcurrent("spread");
            return frozen;
        }

        let x = self.state.integrated_target;
        JointTargets::new((a, x), (b, x))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn readings(angle_a: f64, angle_b: f64, force_a: f64, force_b: f64)
        -> [JointReading; NUM_JOINTS]
    {
        let mut r = [JointReading::default(); NUM_JOINTS];
        r[JointId::F1K1.index()].angle_rad = angle_a;
        r[JointId::F1K1.index()].force = force_a;
        r[JointId::F2K1.index()].angle_rad = angle_b;
        r[JointId::F2K1.index()].force = force_b;
        r
    }

    #[test]
    fn test_follows_integrator() {
        let params = Params::default();
        let mut spread = SpreadCtrl::new();
        let cmd = DofCmd {
            target_angle_rad: 0.3,
            step_rad: 0.1,
            move_trigger: false,
        };

        let t = spread.step(&cmd, &readings(0.0, 0.0, 0.0, 0.0), &params);
        assert_eq!(t.get(JointId::F1K1), Some(0.1));
        assert_eq!(t.get(JointId::F2K1), Some(0.1));
        assert!(!spread.state().idle);
    }

    #[test]
    fn test_overcurrent_freezes_at_mean() {
        let params = Params::default();
        let mut spread = SpreadCtrl::new();
        spread.state_mut().integrated_target = 0.5;
        spread.state_mut().idle = false;
        let cmd = DofCmd {
            target_angle_rad: 1.0,
            step_rad: 0.05,
            move_trigger: false,
        };
        let r = readings(0.4, 0.6, 0.3, 0.3);

        let first = spread.step(&cmd, &r, &params);
        assert_eq!(first.get(JointId::F1K1), Some(0.5));
        assert_eq!(first.get(JointId::F2K1), Some(0.5));
        assert!(spread.state().overcurrent);
        assert!(spread.state().idle);

        // Frozen until a new move starts, even with the force gone
        let x = spread.state().integrated_target;
        let r_relaxed = readings(0.4, 0.6, 0.0, 0.0);
        for _ in 0..5 {
            assert_eq!(spread.step(&cmd, &r_relaxed, &params), first);
        }
        assert_eq!(spread.state().integrated_target, x);

        spread.start_move(&r_relaxed);
        assert!(!spread.state().overcurrent);
        assert_eq!(spread.state().integrated_target, 0.5);
        let moving = spread.step(&cmd, &r_relaxed, &params);
        assert!((moving.get(JointId::F1K1).unwrap() - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_opposing_forces_cancel() {
        let params = Params::default();
        let mut spread = SpreadCtrl::new();
        let cmd = DofCmd {
            target_angle_rad: 1.0,
            step_rad: 0.1,
            move_trigger: false,
        };

        spread.step(&cmd, &readings(0.0, 0.0, 0.4, -0.4), &params);
        assert!(!spread.state().overcurrent);
    }
}
