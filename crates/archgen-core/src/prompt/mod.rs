//! Prompt construction.
//!
//! Pure string assembly: no I/O, no randomness, no clocks. Identical
//! inputs always yield byte-identical output, which reproducible tests
//! and prompt caching both rely on.

mod builder;
mod lock;

pub use builder::{PromptBuilder, PromptBundle, PromptMode};
pub use lock::{intensify, with_consistency_lock};
