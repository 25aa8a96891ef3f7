//! Hand control module
//!
//! Converts finger motion commands (target angle, step per cycle, move trigger) into position
//! targets for the eight joints of the hand, reproducing the mechanical behaviour of the real
//! gripper:
//!
//! - each finger's proximal and distal joints are coupled 3:1 through a breakaway clutch that
//!   slips once the proximal joint is loaded,
//! - excessive motor force latches an overcurrent state freezing the DOF until the next move,
//! - sustained excessive wrench permanently breaks a finger.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod breakage;
mod dof;
mod estimator;
mod finger;
mod overcurrent;
mod params;
mod spread;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use hand_if::eqpt::hand::{NUM_DOFS, SPREAD_DOF};

// Internal
pub use breakage::*;
pub use dof::*;
pub use estimator::*;
pub use finger::*;
pub use overcurrent::*;
pub use params::*;
pub use spread::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Order in which the DOFs are processed during a cycle, spread first then the fingers.
pub const DOF_PROC_ORDER: [usize; NUM_DOFS] = [SPREAD_DOF, 0, 1, 2];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during HandCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum HandCtrlError {
    #[error("No actuation backend was provided")]
    BackendUnavailable,

    #[error("HandCtrl has not been initialised")]
    NotInitialised,

    #[error("Could not load the HandCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid HandCtrl parameters: {0}")]
    InvalidParams(String),

    #[error("Could not create the HandCtrl archives: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),

    #[error("The HandCtrl runtime state was poisoned by a panic during a previous cycle")]
    StatePoisoned,
}
