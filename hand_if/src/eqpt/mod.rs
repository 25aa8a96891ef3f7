//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the hand equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod hand;
