//! grove LDAP — directory connection management and the
//! directory-backed group repository.
//!
//! This crate provides:
//! - Connection management ([`LdapManager`], [`LdapConfig`])
//! - A [`DirectoryClient`](grove_core::repository::DirectoryClient)
//!   implementation over `ldap3`
//! - Schema conventions and container bootstrap ([`schema`])
//! - Group lifecycle and lookup ([`DirectoryGroupRepository`])
//! - Error types ([`LdapError`])

mod client;
mod connection;
mod error;
pub mod repository;
pub mod schema;

pub use connection::{LdapConfig, LdapManager};
pub use error::LdapError;
pub use repository::DirectoryGroupRepository;
