//! Domain models for grove.
//!
//! These are the core types shared across all crates.

pub mod directory;
pub mod group;
