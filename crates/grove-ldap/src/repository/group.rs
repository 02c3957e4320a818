//! Directory-backed group repository.

use std::collections::BTreeSet;

use grove_core::allocation;
use grove_core::error::{GroveError, GroveResult};
use grove_core::events::{GroupEvent, GroupEventKind, GroupEventSink};
use grove_core::models::directory::{DirectoryEntry, Modification, SearchScope};
use grove_core::models::group::{
    CreateDirectoryGroup, DirectoryGroup, GroupQuery, groups_base, root_dn_of, validate_group_name,
};
use grove_core::repository::{DirectoryClient, SystemGroupBackend};
use tracing::{debug, info};

use crate::error::LdapError;
use crate::schema::{
    ATTR_CN, ATTR_GID_NUMBER, ATTR_MEMBER_UID, FILTER_ANY, FILTER_POSIX_GROUP, group_entry,
};

/// Convert a raw `posixGroup` search result into a [`DirectoryGroup`].
///
/// `cn` and `gidNumber` are scalars and take their first value;
/// `memberUid` is always kept as a list, even with a single member.
fn try_into_group(entry: DirectoryEntry) -> Result<DirectoryGroup, LdapError> {
    let malformed = |reason: String| LdapError::MalformedEntry {
        dn: entry.dn.clone(),
        reason,
    };

    let name = entry
        .first(ATTR_CN)
        .ok_or_else(|| malformed(format!("missing {ATTR_CN}")))?;
    let gid = entry
        .first(ATTR_GID_NUMBER)
        .ok_or_else(|| malformed(format!("missing {ATTR_GID_NUMBER}")))?
        .parse::<u32>()
        .map_err(|e| malformed(format!("invalid {ATTR_GID_NUMBER}: {e}")))?;
    let root_dn = root_dn_of(&entry.dn)
        .ok_or_else(|| malformed("not below a groups container".into()))?;

    Ok(DirectoryGroup {
        name: name.to_string(),
        gid,
        members: entry.values(ATTR_MEMBER_UID).to_vec(),
        root_dn: root_dn.to_string(),
    })
}

/// Changes that turn `current` members into `desired` members.
///
/// Returns nothing when both hold the same members. Otherwise the old
/// attribute (if any) is deleted outright and the desired values (if
/// any) are added back.
pub fn membership_changes(current: &[String], desired: &[String]) -> Vec<Modification> {
    let unchanged = current.len() == desired.len()
        && current.iter().collect::<BTreeSet<_>>() == desired.iter().collect::<BTreeSet<_>>();
    if unchanged {
        return Vec::new();
    }

    let mut changes = Vec::new();
    if !current.is_empty() {
        changes.push(Modification::Delete {
            attr: ATTR_MEMBER_UID.into(),
            values: Vec::new(),
        });
    }
    if !desired.is_empty() {
        changes.push(Modification::Add {
            attr: ATTR_MEMBER_UID.into(),
            values: desired.to_vec(),
        });
    }
    changes
}

/// Lifecycle and lookup of `posixGroup` entries in the directory.
///
/// Generic over the directory client, the OS group backend (used only to
/// allocate default gids) and the lifecycle event sink, so it has no
/// dependency on a live server.
#[derive(Clone)]
pub struct DirectoryGroupRepository<C, S, E> {
    client: C,
    system: S,
    events: E,
    root_dn: String,
}

impl<C, S, E> DirectoryGroupRepository<C, S, E>
where
    C: DirectoryClient,
    S: SystemGroupBackend,
    E: GroupEventSink,
{
    pub fn new(client: C, system: S, events: E, root_dn: impl Into<String>) -> Self {
        Self {
            client,
            system,
            events,
            root_dn: root_dn.into(),
        }
    }

    /// Root DN searched by [`list`](Self::list) and [`find`](Self::find).
    pub fn root_dn(&self) -> &str {
        &self.root_dn
    }

    /// Construct a group in memory. Nothing is written to the directory.
    ///
    /// Without an explicit gid, the next free gid is taken from the OS
    /// group database (see [`allocation`]).
    pub async fn build(&self, input: CreateDirectoryGroup) -> GroveResult<DirectoryGroup> {
        validate_group_name(&input.name)?;
        let gid = match input.gid {
            Some(gid) if gid != 0 => gid,
            _ => allocation::next_gid(&self.system).await?,
        };

        Ok(DirectoryGroup {
            name: input.name,
            gid,
            members: input.members,
            root_dn: input.root_dn.unwrap_or_else(|| self.root_dn.clone()),
        })
    }

    /// Create the directory entry for `group`.
    ///
    /// Fails with [`GroveError::AlreadyExists`] if an entry is already
    /// stored under the group's DN, and with [`GroveError::Validation`] if
    /// the name cannot be used as a DN value.
    pub async fn add(&self, group: &DirectoryGroup) -> GroveResult<()> {
        validate_group_name(&group.name)?;
        let dn = group.dn();
        if self.fetch(&dn).await?.is_some() {
            return Err(GroveError::AlreadyExists {
                entity: "group".into(),
                id: dn,
            });
        }

        let entry = group_entry(group);
        self.emit(GroupEventKind::PreAdd, group);
        self.client.add(entry).await?;
        self.emit(GroupEventKind::PostAdd, group);

        info!(dn = %dn, gid = group.gid, "Added directory group");
        Ok(())
    }

    /// Overwrite the stored member list with `group.members`. No other
    /// attribute of the entry is touched.
    ///
    /// Fails with [`GroveError::NotFound`] if the group was never added.
    pub async fn update(&self, group: &DirectoryGroup) -> GroveResult<()> {
        let dn = group.dn();
        let existing = self
            .fetch(&dn)
            .await?
            .ok_or_else(|| GroveError::NotFound {
                entity: "group".into(),
                id: dn.clone(),
            })?;

        let changes = membership_changes(existing.values(ATTR_MEMBER_UID), &group.members);
        self.emit(GroupEventKind::PreUpdate, group);
        if changes.is_empty() {
            debug!(dn = %dn, "Membership unchanged, skipping modify");
        } else {
            self.client.modify(&dn, changes).await?;
        }
        self.emit(GroupEventKind::PostUpdate, group);

        info!(dn = %dn, members = group.members.len(), "Updated directory group");
        Ok(())
    }

    /// Remove the group's entry. A missing entry is reported by the
    /// directory client as [`GroveError::NotFound`].
    pub async fn delete(&self, group: &DirectoryGroup) -> GroveResult<()> {
        let dn = group.dn();
        self.emit(GroupEventKind::PreRemove, group);
        self.client.delete(&dn).await?;
        self.emit(GroupEventKind::PostRemove, group);

        info!(dn = %dn, "Deleted directory group");
        Ok(())
    }

    /// All groups below the configured root, in directory order.
    pub async fn list(&self) -> GroveResult<Vec<DirectoryGroup>> {
        let entries = self.search_groups().await?;
        let groups = entries
            .into_iter()
            .map(try_into_group)
            .collect::<Result<Vec<_>, LdapError>>()?;
        Ok(groups)
    }

    /// The first group matching `query`, or `None`. An empty query
    /// matches nothing; use [`list`](Self::list) to enumerate.
    pub async fn find(&self, query: &GroupQuery) -> GroveResult<Option<DirectoryGroup>> {
        if query.is_empty() {
            return Ok(None);
        }
        for entry in self.search_groups().await? {
            let group = try_into_group(entry)?;
            if query.matches(&group) {
                return Ok(Some(group));
            }
        }
        Ok(None)
    }

    pub async fn find_by_name(&self, name: &str) -> GroveResult<Option<DirectoryGroup>> {
        self.find(&GroupQuery::by_name(name)).await
    }

    pub async fn find_by_gid(&self, gid: u32) -> GroveResult<Option<DirectoryGroup>> {
        self.find(&GroupQuery::by_gid(gid)).await
    }

    async fn search_groups(&self) -> GroveResult<Vec<DirectoryEntry>> {
        self.client
            .search(
                &groups_base(&self.root_dn),
                SearchScope::Subtree,
                FILTER_POSIX_GROUP,
            )
            .await
    }

    /// The entry stored at `dn`, or `None` if there is none.
    async fn fetch(&self, dn: &str) -> GroveResult<Option<DirectoryEntry>> {
        match self.client.search(dn, SearchScope::Base, FILTER_ANY).await {
            Ok(entries) => Ok(entries.into_iter().next()),
            Err(GroveError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn emit(&self, kind: GroupEventKind, group: &DirectoryGroup) {
        self.events.emit(GroupEvent::new(kind, group));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn identical_members_produce_no_changes() {
        assert!(membership_changes(&names(&["a", "b"]), &names(&["b", "a"])).is_empty());
        assert!(membership_changes(&[], &[]).is_empty());
    }

    #[test]
    fn changed_members_replace_the_attribute() {
        let changes = membership_changes(&names(&["a"]), &names(&["a", "b"]));
        assert_eq!(
            changes,
            vec![
                Modification::Delete {
                    attr: "memberUid".into(),
                    values: vec![],
                },
                Modification::Add {
                    attr: "memberUid".into(),
                    values: names(&["a", "b"]),
                },
            ]
        );
    }

    #[test]
    fn first_members_are_only_added() {
        let changes = membership_changes(&[], &names(&["a"]));
        assert!(matches!(changes.as_slice(), [Modification::Add { .. }]));
    }

    #[test]
    fn clearing_members_only_deletes() {
        let changes = membership_changes(&names(&["a"]), &[]);
        assert!(matches!(changes.as_slice(), [Modification::Delete { .. }]));
    }

    #[test]
    fn single_member_stays_a_list() {
        let entry = DirectoryEntry::new("cn=ops,ou=groups,dc=example,dc=com")
            .with_attr("cn", ["ops"])
            .with_attr("gidNumber", ["2000"])
            .with_attr("memberUid", ["alice"]);

        let group = try_into_group(entry).unwrap();
        assert_eq!(group.members, names(&["alice"]));
        assert_eq!(group.root_dn, "dc=example,dc=com");
    }

    #[test]
    fn non_numeric_gid_is_malformed() {
        let entry = DirectoryEntry::new("cn=ops,ou=groups,dc=t")
            .with_attr("cn", ["ops"])
            .with_attr("gidNumber", ["many"]);

        let err = try_into_group(entry).unwrap_err();
        assert!(matches!(err, LdapError::MalformedEntry { .. }));
    }
}
