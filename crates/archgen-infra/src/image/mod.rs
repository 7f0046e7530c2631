//! Perceptual image comparison.

pub mod fetch;
pub mod metrics;
