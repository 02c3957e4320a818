//! Directory-backed repository implementations.

mod group;

pub use group::{DirectoryGroupRepository, membership_changes};
