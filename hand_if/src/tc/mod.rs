//! # Telecommand module
//!
//! This module provides telecommand functionality to the hand interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod hand_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::eqpt::hand::NUM_DOFS;
use hand_ctrl::HandCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the hand by its operator.
///
/// Encoded as JSON, for instance
/// `{"type": "MoveDof", "payload": {"dof": 0, "target_angle_rad": 1.0, "step_rad": 0.01}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Do nothing.
    None,

    /// Replace the whole hand command.
    HandMove(HandCmd),

    /// Set a new target for one DOF and trigger the move.
    MoveDof {
        dof: usize,
        target_angle_rad: f64,
        step_rad: f64,
    },

    /// Set the hold flag.
    Hold(bool),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC refers to DOF {0} but the hand only has {} DOFs", NUM_DOFS)]
    InvalidDof(usize),

    #[error("TC contains a non-finite value")]
    NonFinite,

    #[error("TC contains a negative step of {0} rad")]
    NegativeStep(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let tc: Tc = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        match tc {
            Tc::MoveDof {
                dof,
                target_angle_rad,
                step_rad,
            } => {
                if dof >= NUM_DOFS {
                    return Err(TcParseError::InvalidDof(dof));
                }
                if !target_angle_rad.is_finite() || !step_rad.is_finite() {
                    return Err(TcParseError::NonFinite);
                }
                if step_rad < 0.0 {
                    return Err(TcParseError::NegativeStep(step_rad));
                }
            }
            Tc::HandMove(ref cmd) => {
                for d in cmd.dofs.iter() {
                    if !d.target_angle_rad.is_finite() || !d.step_rad.is_finite() {
                        return Err(TcParseError::NonFinite);
                    }
                    if d.step_rad < 0.0 {
                        return Err(TcParseError::NegativeStep(d.step_rad));
                    }
                }
            }
            _ => (),
        }

        Ok(tc)
    }
}
