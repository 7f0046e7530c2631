//! Deterministic generation pipeline for Archgen.
//!
//! This crate defines the "ports" (store and backend traits) that the
//! infrastructure layer implements, plus the pure pipeline stages: DNA
//! normalization and hashing, seed derivation, prompt construction with
//! consistency locking, drift validation, and the orchestrator state
//! machine. It depends only on `archgen-types` -- never on
//! `archgen-infra` or any database/IO crate.

pub mod cache;
pub mod dna;
pub mod drift;
pub mod generate;
pub mod layout;
pub mod orchestrator;
pub mod prompt;
pub mod seed;
pub mod service;
pub mod store;
