//! # Hand interface crate.
//!
//! Provides all common interfaces between the hand controller and the world around it: the
//! telecommands that drive it and the joint data it exchanges with the actuation backend.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Joint identifiers, sensor readings and outputs of the hand equipment
pub mod eqpt;
