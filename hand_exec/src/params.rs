//! # Hand Executable Parameters
//!
//! This module provide parameters for the hand executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hand_lib::sim_hand::SimHandParams;
use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandExecParams {

    /// Target period of one cycle, also the simulated time advanced by each cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of cycles to run when no script is given
    pub num_cycles: u128,

    /// Sleep at the end of each cycle to keep to the cycle period
    pub realtime: bool,

    /// Write the HandCtrl archives every cycle
    pub archive: bool,

    /// Parameters of the simulated hand
    #[serde(default)]
    pub sim: SimHandParams,
}
