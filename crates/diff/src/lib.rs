//! Structural image comparison: decode two captures, score grayscale MSSIM,
//! render a diff visualization.

pub mod compare;
pub mod error;

pub use {
    compare::{Comparison, compare_images},
    error::{DiffError, Result},
};
