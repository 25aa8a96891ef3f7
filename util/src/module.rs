//! Module interfaces
//!
//! Every cyclic module of `hand_exec` implements [`State`], so that the executable drives them
//! all the same way: `init` once with the session, then `proc` once per cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The state of a cyclic module.
pub trait State {
    /// Everything the module needs to start, e.g. its parameter file and its backends.
    type InitData;
    type InitError;

    /// Inputs of one cycle.
    type InputData;
    /// Outputs of one cycle.
    type OutputData;
    /// Diagnostics of one cycle.
    type StatusReport;
    type ProcError;

    /// Initialise the module.
    ///
    /// Modules archiving their data create their archives in the `session` here.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle.
    ///
    /// Faults the module can live with are reported in the status report, only those that stop
    /// the cycle from being computed are returned as errors.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
