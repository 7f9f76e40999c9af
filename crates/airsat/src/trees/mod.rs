//! Decision-tree storage and traversal.
//!
//! # Overview
//!
//! Trees are stored as flat parallel arrays ([`Tree`]) for cache-friendly
//! traversal; a [`Forest`] sums leaf values over its trees on top of a base
//! score to produce a raw margin. All splits are numeric `value < threshold`
//! comparisons; categorical columns arrive as integer codes from the
//! encoding layer. Missing values (`NaN`) follow each node's default
//! direction.

mod forest;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{Tree, TreeValidationError};

use ndarray::ArrayView1;

/// Node index local to one tree (0 = root).
pub type NodeId = u32;

/// Read-only access to one sample's feature values.
///
/// Implemented for plain slices and ndarray views so traversal works with
/// both hand-built rows and columns of a feature-major matrix.
pub trait SampleRow {
    /// Value of feature `idx` for this sample.
    fn feature(&self, idx: usize) -> f32;
}

impl SampleRow for &[f32] {
    #[inline]
    fn feature(&self, idx: usize) -> f32 {
        self[idx]
    }
}

impl<const N: usize> SampleRow for [f32; N] {
    #[inline]
    fn feature(&self, idx: usize) -> f32 {
        self[idx]
    }
}

impl SampleRow for ArrayView1<'_, f32> {
    #[inline]
    fn feature(&self, idx: usize) -> f32 {
        self[idx]
    }
}
