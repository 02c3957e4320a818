//! grove system — local operating-system group management.
//!
//! [`ShadowBackend`] drives the host's shadow-utils (`groupadd`,
//! `usermod`, `groupdel`) and enumerates groups through `getent`;
//! [`SystemGroupRepository`] layers the group lifecycle on top of any
//! [`SystemGroupBackend`](grove_core::repository::SystemGroupBackend).

mod backend;
mod config;
mod error;
mod group_file;
mod repository;

pub use backend::ShadowBackend;
pub use config::SystemConfig;
pub use error::SystemError;
pub use group_file::parse_group_file;
pub use repository::SystemGroupRepository;
