//! OS group lifecycle and lookup.

use grove_core::allocation;
use grove_core::error::GroveResult;
use grove_core::models::group::SystemGroup;
use grove_core::repository::SystemGroupBackend;
use tracing::info;

/// Group lifecycle over a [`SystemGroupBackend`].
///
/// Membership updates are additive: members missing from the in-memory
/// list are never removed from the OS group. Failures are not rolled
/// back, so an update that fails halfway leaves the earlier members
/// added.
#[derive(Clone)]
pub struct SystemGroupRepository<B> {
    backend: B,
}

impl<B: SystemGroupBackend> SystemGroupRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Create the OS group, add its members, then read back the gid the
    /// OS assigned.
    pub async fn add(&self, group: &mut SystemGroup) -> GroveResult<()> {
        self.backend.create_group(&group.name).await?;
        self.update(group).await?;

        if let Some(created) = self.find_by_name(&group.name).await? {
            group.gid = created.gid;
        }

        info!(group = %group.name, gid = group.gid, "Added system group");
        Ok(())
    }

    /// Add every listed member to the OS group, one command per member.
    pub async fn update(&self, group: &SystemGroup) -> GroveResult<()> {
        for member in &group.members {
            self.backend.add_member(&group.name, member).await?;
        }
        Ok(())
    }

    pub async fn delete(&self, group: &SystemGroup) -> GroveResult<()> {
        self.backend.delete_group(&group.name).await?;
        info!(group = %group.name, "Deleted system group");
        Ok(())
    }

    /// Every OS group, in database order, with members taken verbatim.
    pub async fn list(&self) -> GroveResult<Vec<SystemGroup>> {
        self.backend.list_groups().await
    }

    pub async fn find_by_name(&self, name: &str) -> GroveResult<Option<SystemGroup>> {
        Ok(self.list().await?.into_iter().find(|g| g.name == name))
    }

    pub async fn find_by_gid(&self, gid: u32) -> GroveResult<Option<SystemGroup>> {
        Ok(self.list().await?.into_iter().find(|g| g.gid == gid))
    }

    /// One more than the highest gid in the OS group database.
    pub async fn next_gid(&self) -> GroveResult<u32> {
        allocation::next_gid(&self.backend).await
    }
}
