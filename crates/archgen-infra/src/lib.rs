//! Infrastructure implementations for the Archgen pipeline.
//!
//! Everything archgen-core defines as a trait gets its concrete form
//! here: SQLite and in-memory stores, the REST generation backend, the
//! perceptual image metrics, and the TTL score cache. archgen-core never
//! depends on this crate.

pub mod cache;
pub mod config;
pub mod generate;
pub mod image;
pub mod memory;
pub mod sqlite;
