//! Nullable infrastructure for deterministic testing.
//!
//! The directory service and the OS group database are abstracted behind
//! the traits in `grove_core::repository`. This crate provides in-memory
//! implementations that:
//! - Never touch the network or the host's group database
//! - Share state across clones, so a test can keep a handle for
//!   inspection while a repository owns another
//! - Report failures the way the real backends do
//!
//! Usage: swap real backends for nullables in tests.

pub mod directory;
pub mod system;

pub use directory::NullDirectory;
pub use system::NullSystemGroups;
