//! Directory-to-OS group synchronisation behind `grove sync`.

use grove_core::error::{GroveError, GroveResult};
use grove_core::events::GroupEventSink;
use grove_core::models::group::SystemGroup;
use grove_core::repository::{DirectoryClient, SystemGroupBackend};
use grove_ldap::DirectoryGroupRepository;
use grove_system::SystemGroupRepository;
use tracing::info;

/// Push a directory group's members into the OS group of the same name,
/// creating the OS group first if needed. OS members missing from the
/// directory group are kept.
///
/// Returns the OS group as re-read after the change.
pub async fn sync_group<C, S, E, B>(
    name: &str,
    directory: &DirectoryGroupRepository<C, S, E>,
    system: &SystemGroupRepository<B>,
) -> GroveResult<SystemGroup>
where
    C: DirectoryClient,
    S: SystemGroupBackend,
    E: GroupEventSink,
    B: SystemGroupBackend,
{
    let source = directory
        .find_by_name(name)
        .await?
        .ok_or_else(|| GroveError::NotFound {
            entity: "directory group".into(),
            id: name.to_string(),
        })?;

    match system.find_by_name(name).await? {
        Some(mut existing) => {
            existing.members = source.members;
            system.update(&existing).await?;
        }
        None => {
            let mut created = SystemGroup::new(name, source.members);
            system.add(&mut created).await?;
        }
    }

    let synced = system
        .find_by_name(name)
        .await?
        .ok_or_else(|| GroveError::NotFound {
            entity: "system group".into(),
            id: name.to_string(),
        })?;
    info!(group = %name, members = synced.members.len(), "Synced directory group to system");
    Ok(synced)
}
