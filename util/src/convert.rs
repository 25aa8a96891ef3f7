//! Implements `Convert` functions between fixed size arrays and `nalgebra` types.
//!
//! The hand's interfaces carry plain arrays while the simulation works on vectors, these
//! conversions are the mapping at that boundary.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::SVector;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait Convert<O> {
    fn convert(&self) -> O;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<const N: usize> Convert<SVector<f64, N>> for [f64; N] {
    fn convert(&self) -> SVector<f64, N> {
        SVector::from_column_slice(self)
    }
}

impl<const N: usize> Convert<[f64; N]> for SVector<f64, N> {
    fn convert(&self) -> [f64; N] {
        let mut out = [0.0; N];
        out.copy_from_slice(self.as_slice());
        out
    }
}
