//! # Hand library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the hand executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Joint actuation interface - what the hand needs from whatever moves its joints
pub mod actuator;

/// Data store - global data of the executable
pub mod data_store;

/// Hand control module - converts finger motion commands into joint position targets
pub mod hand_ctrl;

/// Simulated hand - a simple joint model used when no physics engine is attached
#[cfg(feature = "sim")]
pub mod sim_hand;
