//! Generation backend trait and the rate-limited client wrapper.

mod backend;
mod client;

pub use backend::GenerationBackend;
pub use client::GenerationClient;
