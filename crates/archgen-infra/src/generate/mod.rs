//! Concrete generation backends.

pub mod rest;
