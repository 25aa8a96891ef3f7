//! Implementations for the HandCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{Mutex, TryLockError};
use hand_if::{
    eqpt::hand::{HandOutputs, JointId, JointReading, NUM_DOFS, NUM_FINGERS, NUM_JOINTS},
    tc::hand_ctrl::HandCmd,
};
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{
    DofController, DofCtrl, FingerCtrl, FingerMode, FingerRuntimeState, HandCtrlError, Params,
    SpreadCtrl, DOF_PROC_ORDER
};
use crate::actuator::{JointActuator, PidGains};
use util::{
    params,
    module::State,
    archive::{ArchiveError, Archived, Archiver},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Joint whose force provides the torque estimate of each joint, in joint order.
///
/// Only one joint per spread pair and the proximal joint of each finger are sensed, the other
/// joint of the pair reports the same estimate.
const TORQUE_EST_SOURCE: [JointId; NUM_JOINTS] = [
    JointId::F1K1,
    JointId::F1K2,
    JointId::F1K2,
    JointId::F1K1,
    JointId::F2K2,
    JointId::F2K2,
    JointId::F3K2,
    JointId::F3K2,
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Hand control module state.
///
/// Owns the actuation backend and every DOF controller. All runtime state sits behind a single
/// guard which a cycle only ever tries to take: a cycle started while another one is still
/// running is skipped as a whole.
pub struct HandCtrl<A: JointActuator> {
    pub(crate) params: Params,

    runtime: Mutex<Option<Runtime<A>>>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: HandOutputs,
    arch_output: Archiver,
}

/// Data required to initialise HandCtrl.
pub struct InitData<A> {
    /// Path to the parameter file, relative to the params directory.
    pub params_path: &'static str,

    /// The actuation backend, `None` if it could not be created.
    pub actuator: Option<A>,

    /// Write the CSV archives each cycle.
    pub archive: bool,
}

/// Input data to Hand Control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The hand command to execute. Move triggers it carries are consumed only if the cycle is
    /// applied.
    pub cmd: HandCmd,
}

/// Status report for HandCtrl processing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    /// The cycle was skipped because another cycle held the runtime state.
    pub skipped: bool,

    /// The component is disabled, nothing was done.
    pub disabled: bool,

    /// DOFs whose move trigger was accepted this cycle.
    pub triggered: [bool; NUM_DOFS],

    /// Integrated target of each DOF after this cycle.
    ///
    /// Units: radians
    pub integrated_target_rad: [f64; NUM_DOFS],

    /// Position target written to each joint.
    ///
    /// Units: radians
    pub joint_targets_rad: [f64; NUM_JOINTS],

    /// Joints whose target was rejected by the backend.
    pub rejected: [bool; NUM_JOINTS],

    pub finger_modes: [FingerMode; NUM_FINGERS],

    pub fingers: [FingerRuntimeState; NUM_FINGERS],
}

/// Everything mutated by a cycle.
struct Runtime<A> {
    actuator: A,

    /// Controllers indexed by DOF, fingers first then the spread.
    dofs: [DofCtrl; NUM_DOFS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of an attempt to run a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// The cycle ran and all targets were applied.
    Applied {
        output: HandOutputs,
        report: StatusReport,
    },

    /// A previous cycle was still in progress, nothing was done.
    Skipped,

    /// The component is disabled, nothing was done.
    Disabled,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Default for HandCtrl<A> {
    fn default() -> Self {
        Self {
            params: Params::default(),
            runtime: Mutex::new(None),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: HandOutputs::default(),
            arch_output: Archiver::default(),
        }
    }
}

impl<A: JointActuator> State for HandCtrl<A> {
    type InitData = InitData<A>;
    type InitError = HandCtrlError;

    type InputData = InputData;
    type OutputData = HandOutputs;
    type StatusReport = StatusReport;
    type ProcError = HandCtrlError;

    /// Initialise the HandCtrl module.
    ///
    /// Fails if the parameters cannot be loaded or are invalid, or if no actuation backend was
    /// provided.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data.params_path)?;

        self.init_with_params(params, init_data.actuator)?;

        if init_data.archive {
            self.arch_report = Archiver::from_path(
                session, "hand_ctrl/status_report.csv", &report_columns()
            )?;
            self.arch_output = Archiver::from_path(
                session, "hand_ctrl/output.csv", &output_columns()
            )?;
        }

        Ok(())
    }

    /// Perform cyclic processing of Hand Control.
    ///
    /// On a skipped or disabled cycle the previous output is returned unchanged.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        match self.try_cycle(&input_data.cmd)? {
            CycleOutcome::Applied { output, report } => {
                self.output = output;
                self.report = report;
            },
            CycleOutcome::Skipped => {
                self.report = StatusReport {
                    skipped: true,
                    ..StatusReport::default()
                };
            },
            CycleOutcome::Disabled => {
                self.report = StatusReport {
                    disabled: true,
                    ..StatusReport::default()
                };
            }
        }

        Ok((self.output, self.report))
    }
}

impl<A: JointActuator> Archived for HandCtrl<A> {
    fn write(&mut self) -> Result<(), ArchiveError> {
        // Archiving is optional, unopened archivers are skipped
        if self.arch_report.is_open() {
            self.arch_report.write_row(&report_row(&self.report))?;
        }
        if self.arch_output.is_open() {
            self.arch_output.write_row(&output_row(&self.output))?;
        }

        Ok(())
    }
}

impl<A: JointActuator> HandCtrl<A> {
    /// Initialise from an already loaded set of parameters.
    ///
    /// Installs the configured position gains on every joint.
    pub fn init_with_params(&mut self, params: Params, actuator: Option<A>)
        -> Result<(), HandCtrlError>
    {
        params.validate().map_err(HandCtrlError::InvalidParams)?;

        let mut actuator = actuator.ok_or(HandCtrlError::BackendUnavailable)?;

        for joint in JointId::all().iter() {
            if let Err(e) = actuator.set_position_pid(*joint, params.gains_for(*joint)) {
                warn!(
                    "Could not set the gains of {}: {}",
                    joint.scoped_name(&params.joint_prefix), e
                );
            }
        }

        let runtime = self.runtime.get_mut().map_err(|_| HandCtrlError::StatePoisoned)?;
        *runtime = Some(Runtime::new(actuator));

        self.params = params;

        info!("HandCtrl initialised");

        Ok(())
    }

    /// Run one control cycle if no other cycle is in progress.
    ///
    /// Never blocks. Move triggers in `cmd` are only consumed when the outcome is
    /// [`CycleOutcome::Applied`], it is up to the caller to clear them then.
    pub fn try_cycle(&self, cmd: &HandCmd) -> Result<CycleOutcome, HandCtrlError> {
        if self.params.disable_component {
            return Ok(CycleOutcome::Disabled);
        }

        let mut guard = match self.runtime.try_lock() {
            Ok(g) => g,
            Err(TryLockError::WouldBlock) => {
                trace!("HandCtrl cycle skipped, previous cycle still in progress");
                return Ok(CycleOutcome::Skipped);
            },
            Err(TryLockError::Poisoned(_)) => return Err(HandCtrlError::StatePoisoned)
        };

        let runtime = guard.as_mut().ok_or(HandCtrlError::NotInitialised)?;
        let (output, report) = runtime.cycle(cmd, &self.params);

        Ok(CycleOutcome::Applied { output, report })
    }

    /// Run a closure on the actuation backend, waiting for any cycle in progress to finish.
    ///
    /// Used by whoever advances the backend between cycles.
    pub fn with_actuator<R, F>(&self, f: F) -> Result<R, HandCtrlError>
    where
        F: FnOnce(&mut A) -> R
    {
        let mut guard = self.runtime.lock().map_err(|_| HandCtrlError::StatePoisoned)?;
        let runtime = guard.as_mut().ok_or(HandCtrlError::NotInitialised)?;

        Ok(f(&mut runtime.actuator))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl<A: JointActuator> Runtime<A> {
    fn new(actuator: A) -> Self {
        let [f0, f1, f2] = FingerCtrl::all();

        Self {
            actuator,
            dofs: [
                DofCtrl::Finger(f0),
                DofCtrl::Finger(f1),
                DofCtrl::Finger(f2),
                DofCtrl::Spread(SpreadCtrl::new()),
            ],
        }
    }

    fn cycle(&mut self, cmd: &HandCmd, params: &Params) -> (HandOutputs, StatusReport) {
        let mut report = StatusReport::default();

        // One snapshot of the sensors is used for the whole cycle
        let readings = self.actuator.read_all();

        // Resync the DOFs starting a new move
        for (dof, ctrl) in self.dofs.iter_mut().enumerate() {
            if cmd.dofs[dof].move_trigger {
                ctrl.start_move(&readings);
                report.triggered[dof] = true;
                info!(
                    "DOF {} move to {:.4} rad triggered from {:.4} rad",
                    dof, cmd.dofs[dof].target_angle_rad, ctrl.state().integrated_target
                );
            }
        }

        for &dof in DOF_PROC_ORDER.iter() {
            let targets = self.dofs[dof].step(&cmd.dofs[dof], &readings, params);

            for (joint, target) in targets.joints.iter() {
                report.joint_targets_rad[joint.index()] = *target;

                // A rejected target only affects that joint
                if let Err(e) = self.actuator.set_position_target(*joint, *target) {
                    report.rejected[joint.index()] = true;
                    warn!(
                        "Target {:.4} rad rejected by {}: {}",
                        target, joint.scoped_name(&params.joint_prefix), e
                    );
                }
            }
        }

        for ctrl in self.dofs.iter_mut() {
            if let Some(finger) = ctrl.as_finger_mut() {
                if finger.monitor_breakage(&readings, params) {
                    let (proximal, distal) = finger.joints();
                    Self::release(&mut self.actuator, proximal, params);
                    Self::release(&mut self.actuator, distal, params);
                }
            }
        }

        let output = self.outputs(&readings, params);

        for (i, ctrl) in self.dofs.iter().enumerate() {
            report.integrated_target_rad[i] = ctrl.state().integrated_target;

            if let Some(finger) = ctrl.as_finger() {
                report.finger_modes[i] = finger.mode();
                report.fingers[i] = finger.runtime_state();
            }
        }

        self.actuator.apply();

        (output, report)
    }

    /// Release position control of a joint by installing zero gains.
    fn release(actuator: &mut A, joint: JointId, params: &Params) {
        if let Err(e) = actuator.set_position_pid(joint, &PidGains::zero()) {
            warn!(
                "Could not release {}: {}",
                joint.scoped_name(&params.joint_prefix), e
            );
        }
    }

    fn outputs(&self, readings: &[JointReading; NUM_JOINTS], params: &Params) -> HandOutputs {
        let mut output = HandOutputs::default();

        for (i, r) in readings.iter().enumerate() {
            output.joint_angles_rad[i] = r.angle_rad;
            output.joint_torque_est[i] =
                readings[TORQUE_EST_SOURCE[i].index()].force * params.torque_est_factor;
        }

        for (i, ctrl) in self.dofs.iter().enumerate() {
            output.idle[i] = ctrl.state().idle;
            output.overcurrent[i] = ctrl.state().overcurrent;
            output.broken[i] = ctrl.is_broken();
        }

        output
    }
}

impl StatusReport {
    /// True if the cycle ran, and so consumed its move triggers.
    pub fn is_applied(&self) -> bool {
        !self.skipped && !self.disabled
    }
}

// ---------------------------------------------------------------------------
// ARCHIVE LAYOUT
// ---------------------------------------------------------------------------

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn output_columns() -> Vec<String> {
    let mut cols = Vec::new();

    for prefix in ["angle_rad", "torque_est"].iter() {
        cols.extend(JointId::all().iter().map(|j| format!("{}_{:?}", prefix, j)));
    }
    for prefix in ["idle", "overcurrent", "broken"].iter() {
        cols.extend((0..NUM_DOFS).map(|i| format!("{}_{}", prefix, i)));
    }

    cols
}

fn output_row(output: &HandOutputs) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 * NUM_JOINTS + 3 * NUM_DOFS);

    row.extend_from_slice(&output.joint_angles_rad);
    row.extend_from_slice(&output.joint_torque_est);
    for flags in [output.idle, output.overcurrent, output.broken].iter() {
        row.extend(flags.iter().map(|b| flag(*b)));
    }

    row
}

fn report_columns() -> Vec<String> {
    let mut cols = vec![String::from("skipped"), String::from("disabled")];

    cols.extend((0..NUM_DOFS).map(|i| format!("triggered_{}", i)));
    cols.extend((0..NUM_DOFS).map(|i| format!("integrated_target_rad_{}", i)));
    cols.extend(JointId::all().iter().map(|j| format!("target_rad_{:?}", j)));
    cols.extend(JointId::all().iter().map(|j| format!("rejected_{:?}", j)));
    for i in 0..NUM_FINGERS {
        cols.push(format!("clutch_broken_{}", i));
        cols.push(format!("clutch_break_angle_rad_{}", i));
        cols.push(format!("breakage_counter_{}", i));
    }

    cols
}

fn report_row(report: &StatusReport) -> Vec<f64> {
    let mut row = vec![flag(report.skipped), flag(report.disabled)];

    row.extend(report.triggered.iter().map(|b| flag(*b)));
    row.extend_from_slice(&report.integrated_target_rad);
    row.extend_from_slice(&report.joint_targets_rad);
    row.extend(report.rejected.iter().map(|b| flag(*b)));
    for f in report.fingers.iter() {
        row.push(flag(f.clutch_broken));
        row.push(f.clutch_break_angle);
        row.push(f.breakage_counter as f64);
    }

    row
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::actuator::ActuatorError;
    use hand_if::{eqpt::hand::SPREAD_DOF, tc::hand_ctrl::DofCmd};

    /// Actuator recording everything the controller asks of it.
    #[derive(Default)]
    struct MockActuator {
        readings: [JointReading; NUM_JOINTS],
        targets: [Option<f64>; NUM_JOINTS],
        gains: [Option<PidGains>; NUM_JOINTS],
        num_gain_sets: [usize; NUM_JOINTS],
        reject: Vec<JointId>,
        num_applies: usize,
    }

    impl JointActuator for MockActuator {
        fn read(&self, joint: JointId) -> JointReading {
            self.readings[joint.index()]
        }

        fn set_position_target(&mut self, joint: JointId, target_rad: f64)
            -> Result<(), ActuatorError>
        {
            if self.reject.contains(&joint) {
                return Err(ActuatorError::InvalidTarget(joint, target_rad));
            }
            self.targets[joint.index()] = Some(target_rad);
            Ok(())
        }

        fn set_position_pid(&mut self, joint: JointId, gains: &PidGains)
            -> Result<(), ActuatorError>
        {
            self.gains[joint.index()] = Some(*gains);
            self.num_gain_sets[joint.index()] += 1;
            Ok(())
        }

        fn apply(&mut self) {
            self.num_applies += 1;
        }
    }

    fn init_ctrl(params: Params, actuator: MockActuator) -> HandCtrl<MockActuator> {
        let mut ctrl = HandCtrl::default();
        ctrl.init_with_params(params, Some(actuator)).unwrap();
        ctrl
    }

    fn move_cmd(dof: usize, target_angle_rad: f64, step_rad: f64) -> HandCmd {
        let mut cmd = HandCmd::default();
        cmd.dofs[dof] = DofCmd {
            target_angle_rad,
            step_rad,
            move_trigger: false,
        };
        cmd
    }

    fn applied(outcome: CycleOutcome) -> (HandOutputs, StatusReport) {
        match outcome {
            CycleOutcome::Applied { output, report } => (output, report),
            o => panic!("Expected an applied cycle, got {:?}", o),
        }
    }

    #[test]
    fn test_backend_unavailable() {
        let mut ctrl = HandCtrl::<MockActuator>::default();

        assert!(matches!(
            ctrl.init_with_params(Params::default(), None),
            Err(HandCtrlError::BackendUnavailable)
        ));
        assert!(matches!(
            ctrl.try_cycle(&HandCmd::default()),
            Err(HandCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_invalid_params() {
        let mut ctrl = HandCtrl::<MockActuator>::default();
        let mut params = Params::default();
        params.breakage.latch_count = 0;

        assert!(matches!(
            ctrl.init_with_params(params, Some(MockActuator::default())),
            Err(HandCtrlError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_init_installs_gains() {
        let params = Params::default();
        let ctrl = init_ctrl(params.clone(), MockActuator::default());

        ctrl.with_actuator(|a| {
            assert_eq!(a.gains[JointId::F1K1.index()], Some(params.spread_pid));
            assert_eq!(a.gains[JointId::F2K2.index()], Some(params.proximal_pid));
            assert_eq!(a.gains[JointId::F3K3.index()], Some(params.distal_pid));
        }).unwrap();
    }

    #[test]
    fn test_closing_finger() {
        let ctrl = init_ctrl(Params::default(), MockActuator::default());
        let cmd = move_cmd(0, 1.0, 0.1);

        for cycle in 1..=10 {
            let (output, report) = applied(ctrl.try_cycle(&cmd).unwrap());
            let x = report.integrated_target_rad[0];

            assert!((x - 0.1 * cycle as f64).abs() < 1e-9);
            assert_eq!(report.joint_targets_rad[JointId::F1K2.index()], x);
            assert_eq!(report.joint_targets_rad[JointId::F1K3.index()], x / 3.0);
            assert_eq!(output.idle[0], cycle == 10);
            assert!(output.idle[1] && output.idle[2] && output.idle[SPREAD_DOF]);
        }

        ctrl.with_actuator(|a| {
            assert_eq!(a.num_applies, 10);
            assert_eq!(a.targets[JointId::F1K2.index()], Some(1.0));
        }).unwrap();
    }

    #[test]
    fn test_skip_while_cycle_in_progress() {
        let ctrl = init_ctrl(Params::default(), MockActuator::default());
        let cmd = move_cmd(0, 1.0, 0.1);

        {
            let _guard = ctrl.runtime.lock().unwrap();
            assert_eq!(ctrl.try_cycle(&cmd).unwrap(), CycleOutcome::Skipped);
        }

        ctrl.with_actuator(|a| {
            assert_eq!(a.num_applies, 0);
            assert!(a.targets.iter().all(|t| t.is_none()));
        }).unwrap();

        let (_, report) = applied(ctrl.try_cycle(&cmd).unwrap());
        assert!((report.integrated_target_rad[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_disabled() {
        let mut params = Params::default();
        params.disable_component = true;
        let mut ctrl = init_ctrl(params, MockActuator::default());

        assert_eq!(ctrl.try_cycle(&HandCmd::default()).unwrap(), CycleOutcome::Disabled);

        let (_, report) = ctrl.proc(&InputData::default()).unwrap();
        assert!(report.disabled);
        assert!(!report.is_applied());

        ctrl.with_actuator(|a| assert_eq!(a.num_applies, 0)).unwrap();
    }

    #[test]
    fn test_move_trigger_resyncs() {
        let mut actuator = MockActuator::default();
        actuator.readings[JointId::F1K2.index()].angle_rad = 0.3;
        actuator.readings[JointId::F1K3.index()].angle_rad = 0.2;
        actuator.readings[JointId::F1K1.index()].angle_rad = 0.1;
        actuator.readings[JointId::F2K1.index()].angle_rad = 0.3;

        let ctrl = init_ctrl(Params::default(), actuator);

        let mut cmd = move_cmd(0, 1.0, 0.0);
        cmd.dofs[0].move_trigger = true;
        cmd.dofs[SPREAD_DOF] = DofCmd {
            target_angle_rad: 0.5,
            step_rad: 0.0,
            move_trigger: true,
        };

        let (output, report) = applied(ctrl.try_cycle(&cmd).unwrap());

        assert_eq!(report.triggered, [true, false, false, true]);
        assert!((report.integrated_target_rad[0] - 0.4).abs() < 1e-12);
        assert!((report.integrated_target_rad[SPREAD_DOF] - 0.2).abs() < 1e-12);
        assert!(!output.idle[0]);
        assert!(!output.overcurrent[0]);
        assert!(!output.idle[SPREAD_DOF]);
    }

    #[test]
    fn test_overcurrent_output() {
        let mut actuator = MockActuator::default();
        actuator.readings[JointId::F2K2.index()].angle_rad = 0.35;
        actuator.readings[JointId::F2K2.index()].force = 0.3;
        actuator.readings[JointId::F2K3.index()].angle_rad = 0.15;
        actuator.readings[JointId::F2K3.index()].force = -0.3;

        let ctrl = init_ctrl(Params::default(), actuator);
        let (output, report) = applied(ctrl.try_cycle(&move_cmd(1, 1.0, 0.1)).unwrap());

        assert!(output.overcurrent[1]);
        assert!(output.idle[1]);
        assert_eq!(report.finger_modes[1], FingerMode::Overcurrent);
        assert_eq!(report.joint_targets_rad[JointId::F2K2.index()], 0.35);
        assert_eq!(report.joint_targets_rad[JointId::F2K3.index()], 0.15);
        assert_eq!(output.joint_torque_est[JointId::F2K2.index()], 300.0);
        assert_eq!(output.joint_torque_est[JointId::F2K3.index()], 300.0);
    }

    #[test]
    fn test_torque_estimate_shared_by_pairs() {
        let mut actuator = MockActuator::default();
        let forces = [
            (JointId::F1K1, 0.05),
            (JointId::F1K2, 0.1),
            (JointId::F2K1, 0.02),
            (JointId::F2K2, 0.03),
            (JointId::F2K3, 0.2),
            (JointId::F3K2, 0.04),
            (JointId::F3K3, -0.2),
        ];
        for (j, f) in forces.iter() {
            actuator.readings[j.index()].force = *f;
        }

        let ctrl = init_ctrl(Params::default(), actuator);
        let (output, _) = applied(ctrl.try_cycle(&HandCmd::default()).unwrap());

        let expected = [50.0, 100.0, 100.0, 50.0, 30.0, 30.0, 40.0, 40.0];
        for (est, exp) in output.joint_torque_est.iter().zip(expected.iter()) {
            assert!((est - exp).abs() < 1e-9, "{:?} != {:?}", output.joint_torque_est, expected);
        }
    }

    #[test]
    fn test_breakage_latch() {
        let mut actuator = MockActuator::default();
        actuator.readings[JointId::F3K3.index()].wrench.torque_nm = 7.0;
        let ctrl = init_ctrl(Params::default(), actuator);
        let cmd = move_cmd(2, 1.0, 0.01);

        for _ in 0..99 {
            let (output, _) = applied(ctrl.try_cycle(&cmd).unwrap());
            assert!(!output.broken[2]);
        }

        let (output, report) = applied(ctrl.try_cycle(&cmd).unwrap());
        assert!(output.broken[2]);
        assert!(output.idle[2]);
        assert_eq!(report.fingers[2].breakage_counter, 101);
        assert_eq!(report.finger_modes[2], FingerMode::Broken);

        ctrl.with_actuator(|a| {
            a.readings[JointId::F3K3.index()].wrench.torque_nm = 0.0;
            assert_eq!(a.gains[JointId::F3K2.index()], Some(PidGains::zero()));
            assert_eq!(a.gains[JointId::F3K3.index()], Some(PidGains::zero()));
        }).unwrap();

        for _ in 0..5 {
            let (output, report) = applied(ctrl.try_cycle(&cmd).unwrap());
            assert!(output.broken[2]);
            assert_eq!(report.fingers[2].breakage_counter, 101);
        }

        // Gains installed once at init and once on breakage
        ctrl.with_actuator(|a| {
            assert_eq!(a.num_gain_sets[JointId::F3K2.index()], 2);
            assert_eq!(a.num_gain_sets[JointId::F2K2.index()], 1);
        }).unwrap();
    }

    #[test]
    fn test_idle_cycle_is_idempotent() {
        let ctrl = init_ctrl(Params::default(), MockActuator::default());
        let cmd = HandCmd::default();

        let (output_a, report_a) = applied(ctrl.try_cycle(&cmd).unwrap());
        let (output_b, report_b) = applied(ctrl.try_cycle(&cmd).unwrap());

        assert_eq!(output_a, output_b);
        assert_eq!(report_a, report_b);
        assert_eq!(output_b.idle, [true; NUM_DOFS]);
    }

    #[test]
    fn test_rejected_target_is_not_fatal() {
        let mut actuator = MockActuator::default();
        actuator.reject.push(JointId::F1K2);
        let ctrl = init_ctrl(Params::default(), actuator);

        let (_, report) = applied(ctrl.try_cycle(&move_cmd(0, 1.0, 0.1)).unwrap());
        assert!(report.rejected[JointId::F1K2.index()]);
        assert!(!report.rejected[JointId::F1K3.index()]);

        ctrl.with_actuator(|a| {
            assert_eq!(a.targets[JointId::F1K2.index()], None);
            assert!(a.targets[JointId::F1K3.index()].is_some());
            assert!(a.targets[JointId::F3K2.index()].is_some());
            assert_eq!(a.num_applies, 1);
        }).unwrap();
    }

    #[test]
    fn test_proc_updates_output() {
        let mut ctrl = init_ctrl(Params::default(), MockActuator::default());
        let input = InputData {
            cmd: move_cmd(0, 1.0, 0.1),
        };

        let (output, report) = ctrl.proc(&input).unwrap();
        assert!(report.is_applied());
        assert!(!output.idle[0]);
        assert_eq!(ctrl.output, output);

        // Nothing archived without a session
        assert!(ctrl.write().is_ok());
    }

    #[test]
    fn test_archive_layout() {
        assert_eq!(output_columns().len(), output_row(&HandOutputs::default()).len());
        assert_eq!(report_columns().len(), report_row(&StatusReport::default()).len());
    }
}
