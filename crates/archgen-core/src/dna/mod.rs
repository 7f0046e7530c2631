//! DNA normalization, hashing, and structural comparison.

mod compare;
mod hash;
mod normalize;

pub use compare::compare;
pub use hash::{dna_hash, short_hash};
pub use normalize::normalize;
