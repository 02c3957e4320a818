//! Group domain models.
//!
//! A [`DirectoryGroup`] lives in the directory service under
//! `cn=<name>,ou=groups,<root_dn>`; a [`SystemGroup`] lives in the local
//! OS group database. Nothing ties the two together: a caller that wants
//! both stores to agree has to correlate them by name itself.

use serde::{Deserialize, Serialize};

use crate::error::{GroveError, GroveResult};

/// Root DN used when neither the caller nor the configuration names one.
pub const DEFAULT_ROOT_DN: &str = "dc=grove-servers,dc=org";

/// Relative DN of the container that holds every group entry.
pub const GROUPS_RDN: &str = "ou=groups";

/// DN of the groups container below `root_dn`.
pub fn groups_base(root_dn: &str) -> String {
    format!("{GROUPS_RDN},{root_dn}")
}

/// DN of the group entry `name` below `root_dn`.
pub fn group_dn(name: &str, root_dn: &str) -> String {
    format!("cn={name},{GROUPS_RDN},{root_dn}")
}

/// Characters with special meaning inside a DN attribute value.
const DN_SPECIAL: &[char] = &[',', '+', '=', '"', '\\', '<', '>', ';'];

/// Check that `name` can be used verbatim as the `cn` of a group DN.
///
/// Names that would need DN escaping are rejected rather than escaped,
/// since they are not valid POSIX group names either.
pub fn validate_group_name(name: &str) -> GroveResult<()> {
    let invalid = |reason: &str| {
        Err(GroveError::Validation {
            message: format!("invalid group name {name:?}: {reason}"),
        })
    };

    if name.is_empty() {
        return invalid("empty");
    }
    if name.starts_with([' ', '#']) || name.ends_with(' ') {
        return invalid("leading '#' or surrounding spaces");
    }
    if let Some(c) = name.chars().find(|c| DN_SPECIAL.contains(c) || c.is_control()) {
        return invalid(&format!("contains {c:?}"));
    }
    Ok(())
}

/// Recover the root DN from an entry DN by stripping everything up to and
/// including the first `ou=groups,` component.
///
/// Returns `None` when the DN does not sit below a groups container.
pub fn root_dn_of(dn: &str) -> Option<&str> {
    dn.split_once(&format!("{GROUPS_RDN},"))
        .map(|(_, root)| root)
}

/// A POSIX-style group stored in the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    pub name: String,
    pub gid: u32,
    /// Member account names (`memberUid`). Lookups return them in the
    /// order the server reports; writes send them as an unordered set.
    pub members: Vec<String>,
    pub root_dn: String,
}

impl DirectoryGroup {
    pub fn new(
        name: impl Into<String>,
        gid: u32,
        members: Vec<String>,
        root_dn: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            gid,
            members,
            root_dn: root_dn.into(),
        }
    }

    /// The distinguished name this group is stored under. It is derived
    /// from `name` and `root_dn` only, so renaming a group means deleting
    /// and re-adding it.
    pub fn dn(&self) -> String {
        group_dn(&self.name, &self.root_dn)
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary::new(self.gid, &self.name, &self.members)
    }

    /// JSON form handed to external consumers (API responses, CLI output).
    pub fn serialized(&self) -> serde_json::Result<serde_json::Value> {
        self.summary().to_json()
    }
}

/// Input for constructing a [`DirectoryGroup`].
///
/// A `gid` of `None` or `Some(0)` asks for automatic allocation.
/// A `root_dn` of `None` uses the repository's configured root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDirectoryGroup {
    pub name: String,
    pub gid: Option<u32>,
    pub members: Vec<String>,
    pub root_dn: Option<String>,
}

/// Directory group lookup criteria. On each record the gid is tested
/// before the name; the first record matching either wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupQuery {
    pub gid: Option<u32>,
    pub name: Option<String>,
}

impl GroupQuery {
    pub fn by_gid(gid: u32) -> Self {
        Self {
            gid: Some(gid),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            gid: None,
            name: Some(name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gid.is_none() && self.name.is_none()
    }

    pub fn matches(&self, group: &DirectoryGroup) -> bool {
        if self.gid == Some(group.gid) {
            return true;
        }
        self.name.as_deref() == Some(group.name.as_str())
    }
}

/// A group in the local operating-system group database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemGroup {
    pub name: String,
    /// OS-assigned group id; 0 until the group has been created and
    /// re-read from the group database.
    pub gid: u32,
    pub members: Vec<String>,
}

impl SystemGroup {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            gid: 0,
            members,
        }
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary::new(self.gid, &self.name, &self.members)
    }
}

/// Serialized group representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: u32,
    pub name: String,
    pub users: Vec<String>,
    /// Always `true`; kept for consumers that poll readiness.
    pub is_ready: bool,
}

impl GroupSummary {
    fn new(id: u32, name: &str, users: &[String]) -> Self {
        Self {
            id,
            name: name.to_string(),
            users: users.to_vec(),
            is_ready: true,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
