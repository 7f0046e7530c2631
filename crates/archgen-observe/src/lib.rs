//! Observability utilities for the Archgen pipeline: tracing subscriber
//! setup and shared span attribute names.

pub mod pipeline_attrs;
pub mod tracing_setup;
