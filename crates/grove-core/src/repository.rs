//! Backend trait definitions for the two group stores.
//!
//! All backend operations are async. Group lifecycle logic is generic
//! over these traits so it can run against a real LDAP server and the
//! host's shadow-utils, or against in-memory fakes in tests.

use crate::error::GroveResult;
use crate::models::directory::{DirectoryEntry, Modification, SearchScope};
use crate::models::group::SystemGroup;

// ---------------------------------------------------------------------------
// Directory service
// ---------------------------------------------------------------------------

pub trait DirectoryClient: Send + Sync {
    /// Search below `base`. A missing base entry is reported as
    /// [`GroveError::NotFound`](crate::GroveError::NotFound).
    fn search(
        &self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> impl Future<Output = GroveResult<Vec<DirectoryEntry>>> + Send;
    fn add(&self, entry: DirectoryEntry) -> impl Future<Output = GroveResult<()>> + Send;
    fn modify(
        &self,
        dn: &str,
        changes: Vec<Modification>,
    ) -> impl Future<Output = GroveResult<()>> + Send;
    fn delete(&self, dn: &str) -> impl Future<Output = GroveResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// OS group database
// ---------------------------------------------------------------------------

pub trait SystemGroupBackend: Send + Sync {
    fn create_group(&self, name: &str) -> impl Future<Output = GroveResult<()>> + Send;
    /// Append `account` to the supplementary members of `group`.
    fn add_member(
        &self,
        group: &str,
        account: &str,
    ) -> impl Future<Output = GroveResult<()>> + Send;
    fn delete_group(&self, name: &str) -> impl Future<Output = GroveResult<()>> + Send;
    /// Every group in the OS group database, in database order.
    fn list_groups(&self) -> impl Future<Output = GroveResult<Vec<SystemGroup>>> + Send;
}
