//! In-memory store implementations.
//!
//! Same contracts as the SQLite layer, backed by concurrent maps. Used
//! for tests and for ephemeral single-process runs.

pub mod baseline;
pub mod history;
