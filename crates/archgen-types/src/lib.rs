//! Shared domain types for Archgen.
//!
//! This crate contains the core domain types used across the Archgen
//! pipeline: DesignDna, BaselineArtifactBundle, Version, DriftReport, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod design;
pub mod dna;
pub mod drift;
pub mod error;
pub mod generation;
