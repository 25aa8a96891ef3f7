//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clip a value into the range `[lower, upper]`.
///
/// Unlike `f64::clamp` this does not panic when the range is inverted, `lower` wins instead.
pub fn clip<T>(value: T, lower: T, upper: T) -> T
where
    T: Float
{
    lower.max(value.min(upper))
}

/// Signed step of at most `max_step` moving `from` towards `to`.
pub fn step_towards<T>(from: T, to: T, max_step: T) -> T
where
    T: Float
{
    let max_step = max_step.abs();
    clip(to - from, -max_step, max_step)
}
