//! # Data Store

use hand_if::eqpt::hand::HandOutputs;
use log::trace;

use crate::{actuator::JointActuator, hand_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore<A: JointActuator> {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // HandCtrl
    pub hand_ctrl: hand_ctrl::HandCtrl<A>,
    pub hand_ctrl_input: hand_ctrl::InputData,
    pub hand_ctrl_output: HandOutputs,
    pub hand_ctrl_status_rpt: hand_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of cycles HandCtrl skipped
    pub num_skipped_cycles: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<A: JointActuator> Default for DataStore<A> {
    fn default() -> Self {
        Self {
            num_cycles: 0,
            sim_time_s: 0.0,
            hand_ctrl: hand_ctrl::HandCtrl::default(),
            hand_ctrl_input: hand_ctrl::InputData::default(),
            hand_ctrl_output: HandOutputs::default(),
            hand_ctrl_status_rpt: hand_ctrl::StatusReport::default(),
            num_consec_cycle_overruns: 0,
            num_skipped_cycles: 0,
        }
    }
}

impl<A: JointActuator> DataStore<A> {
    /// Perform actions required at the start of a cycle.
    ///
    /// The hand command is kept from one cycle to the next, only its move triggers are consumed.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        self.sim_time_s = self.num_cycles as f64 * cycle_period_s;
    }

    /// Perform actions required at the end of a cycle.
    ///
    /// Move triggers are cleared once HandCtrl has applied a cycle, a skipped or disabled cycle
    /// leaves them pending for the next one.
    pub fn cycle_end(&mut self) {
        if self.hand_ctrl_status_rpt.is_applied() {
            self.hand_ctrl_input.cmd.clear_triggers();
        }
        else {
            self.num_skipped_cycles += 1;
            trace!("Move triggers kept pending, HandCtrl did not apply cycle {}", self.num_cycles);
        }

        self.num_cycles += 1;
    }
}
