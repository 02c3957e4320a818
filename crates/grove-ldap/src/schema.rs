//! Directory schema conventions and container bootstrap.
//!
//! Groups are RFC 2307 `posixGroup` entries named by `cn` and stored in
//! a single `ou=groups` container below the configured root DN.

use grove_core::error::{GroveError, GroveResult};
use grove_core::models::directory::{DirectoryEntry, SearchScope};
use grove_core::models::group::{DirectoryGroup, groups_base};
use grove_core::repository::DirectoryClient;
use tracing::info;

// -----------------------------------------------------------------------
// Object classes and attributes
// -----------------------------------------------------------------------

pub const OC_POSIX_GROUP: &str = "posixGroup";
pub const OC_TOP: &str = "top";
pub const OC_ORGANIZATIONAL_UNIT: &str = "organizationalUnit";

pub const ATTR_OBJECT_CLASS: &str = "objectClass";
pub const ATTR_CN: &str = "cn";
pub const ATTR_OU: &str = "ou";
pub const ATTR_GID_NUMBER: &str = "gidNumber";
pub const ATTR_MEMBER_UID: &str = "memberUid";

/// Matches any entry; used for existence checks.
pub const FILTER_ANY: &str = "(objectClass=*)";
/// Matches group entries.
pub const FILTER_POSIX_GROUP: &str = "(objectClass=posixGroup)";

/// The entry written when a group is first added. `memberUid` is only
/// present when the group has members.
pub fn group_entry(group: &DirectoryGroup) -> DirectoryEntry {
    let mut entry = DirectoryEntry::new(group.dn())
        .with_attr(ATTR_OBJECT_CLASS, [OC_POSIX_GROUP, OC_TOP])
        .with_attr(ATTR_CN, [group.name.as_str()])
        .with_attr(ATTR_GID_NUMBER, [group.gid.to_string()]);
    if !group.members.is_empty() {
        entry = entry.with_attr(ATTR_MEMBER_UID, group.members.iter().cloned());
    }
    entry
}

/// Create the `ou=groups` container below `root_dn` if it is missing.
///
/// Returns `true` when the container was created, `false` when it
/// already existed.
pub async fn ensure_groups_container<C: DirectoryClient>(
    client: &C,
    root_dn: &str,
) -> GroveResult<bool> {
    let base = groups_base(root_dn);
    match client.search(&base, SearchScope::Base, FILTER_ANY).await {
        Ok(entries) if !entries.is_empty() => return Ok(false),
        Ok(_) | Err(GroveError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    let entry = DirectoryEntry::new(&base)
        .with_attr(ATTR_OBJECT_CLASS, [OC_ORGANIZATIONAL_UNIT, OC_TOP])
        .with_attr(ATTR_OU, ["groups"]);
    client.add(entry).await?;

    info!(dn = %base, "Created groups container");
    Ok(true)
}
