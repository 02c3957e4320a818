//! Nullable directory — an in-memory LDAP-like tree for testing.

use std::sync::{Arc, Mutex, MutexGuard};

use grove_core::error::{GroveError, GroveResult};
use grove_core::models::directory::{DirectoryEntry, Modification, SearchScope};
use grove_core::repository::DirectoryClient;

#[derive(Default)]
struct State {
    /// Entries in insertion order, which doubles as search result order.
    entries: Vec<DirectoryEntry>,
    modify_log: Vec<(String, Vec<Modification>)>,
}

/// An in-memory directory tree.
///
/// Searches require the base DN to exist, either as an entry or as an
/// ancestor of one. Filters are limited to a single equality or presence
/// assertion such as `(objectClass=posixGroup)` or `(objectClass=*)`.
#[derive(Clone, Default)]
pub struct NullDirectory {
    state: Arc<Mutex<State>>,
}

impl NullDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry without going through `add`.
    pub fn insert(&self, entry: DirectoryEntry) {
        let mut state = self.lock();
        match state.entries.iter_mut().find(|e| same_dn(&e.dn, &entry.dn)) {
            Some(existing) => *existing = entry,
            None => state.entries.push(entry),
        }
    }

    pub fn entry(&self, dn: &str) -> Option<DirectoryEntry> {
        self.lock()
            .entries
            .iter()
            .find(|e| same_dn(&e.dn, dn))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every modify request received so far, oldest first.
    pub fn modify_log(&self) -> Vec<(String, Vec<Modification>)> {
        self.lock().modify_log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("null directory state poisoned")
    }
}

impl DirectoryClient for NullDirectory {
    async fn search(
        &self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> GroveResult<Vec<DirectoryEntry>> {
        let filter = Filter::parse(filter)?;
        let state = self.lock();

        let base_exists = state
            .entries
            .iter()
            .any(|e| same_dn(&e.dn, base) || is_below(&e.dn, base));
        if !base_exists {
            return Err(no_such_object(base));
        }

        Ok(state
            .entries
            .iter()
            .filter(|e| match scope {
                SearchScope::Base => same_dn(&e.dn, base),
                SearchScope::Subtree => same_dn(&e.dn, base) || is_below(&e.dn, base),
            })
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn add(&self, entry: DirectoryEntry) -> GroveResult<()> {
        let mut state = self.lock();
        if state.entries.iter().any(|e| same_dn(&e.dn, &entry.dn)) {
            return Err(GroveError::AlreadyExists {
                entity: "directory entry".into(),
                id: entry.dn,
            });
        }
        state.entries.push(entry);
        Ok(())
    }

    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> GroveResult<()> {
        let mut state = self.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| same_dn(&e.dn, dn))
            .ok_or_else(|| no_such_object(dn))?;

        // Apply to a copy so a failing change leaves the entry untouched.
        let mut updated = entry.clone();
        for change in &changes {
            apply(&mut updated, change)?;
        }
        *entry = updated;

        state.modify_log.push((dn.to_string(), changes));
        Ok(())
    }

    async fn delete(&self, dn: &str) -> GroveResult<()> {
        let mut state = self.lock();
        let position = state
            .entries
            .iter()
            .position(|e| same_dn(&e.dn, dn))
            .ok_or_else(|| no_such_object(dn))?;
        if state.entries.iter().any(|e| is_below(&e.dn, dn)) {
            return Err(GroveError::Directory(format!(
                "operation not allowed on non-leaf: {dn}"
            )));
        }
        state.entries.remove(position);
        Ok(())
    }
}

fn apply(entry: &mut DirectoryEntry, change: &Modification) -> GroveResult<()> {
    match change {
        Modification::Add { attr, values } => {
            let key = attr_key(entry, attr);
            entry
                .attrs
                .entry(key)
                .or_default()
                .extend(values.iter().cloned());
        }
        Modification::Delete { attr, values } => {
            let key = attr_key(entry, attr);
            let current = entry.attrs.get_mut(&key).ok_or_else(|| {
                GroveError::Directory(format!("no such attribute {attr} on {}", entry.dn))
            })?;
            if values.is_empty() {
                entry.attrs.remove(&key);
            } else {
                current.retain(|v| !values.contains(v));
                if current.is_empty() {
                    entry.attrs.remove(&key);
                }
            }
        }
    }
    Ok(())
}

/// The stored spelling of `attr` on `entry`, or `attr` itself if absent.
fn attr_key(entry: &DirectoryEntry, attr: &str) -> String {
    entry
        .attrs
        .keys()
        .find(|k| k.eq_ignore_ascii_case(attr))
        .cloned()
        .unwrap_or_else(|| attr.to_string())
}

fn same_dn(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn is_below(dn: &str, base: &str) -> bool {
    let dn = dn.to_ascii_lowercase();
    let suffix = format!(",{}", base.to_ascii_lowercase());
    dn.ends_with(&suffix)
}

fn no_such_object(dn: &str) -> GroveError {
    GroveError::NotFound {
        entity: "directory entry".into(),
        id: dn.to_string(),
    }
}

/// A single `(attr=value)` or `(attr=*)` assertion.
struct Filter {
    attr: String,
    value: Option<String>,
}

impl Filter {
    fn parse(raw: &str) -> GroveResult<Self> {
        let unsupported = || GroveError::Directory(format!("unsupported filter: {raw}"));
        let inner = raw
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(unsupported)?;
        let (attr, value) = inner.split_once('=').ok_or_else(unsupported)?;
        if attr.is_empty() || inner.contains(['(', ')', '&', '|', '!']) {
            return Err(unsupported());
        }
        Ok(Self {
            attr: attr.to_string(),
            value: (value != "*").then(|| value.to_string()),
        })
    }

    fn matches(&self, entry: &DirectoryEntry) -> bool {
        match &self.value {
            // Every real entry carries an objectClass.
            None if self.attr.eq_ignore_ascii_case("objectClass") => true,
            None => !entry.values(&self.attr).is_empty(),
            Some(value) => entry.has_value(&self.attr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ou(root: &str) -> DirectoryEntry {
        DirectoryEntry::new(format!("ou=groups,{root}"))
            .with_attr("objectClass", ["organizationalUnit"])
    }

    fn posix(dn: &str) -> DirectoryEntry {
        DirectoryEntry::new(dn).with_attr("objectClass", ["posixGroup", "top"])
    }

    #[tokio::test]
    async fn search_respects_scope_and_filter() {
        let dir = NullDirectory::new();
        dir.insert(ou("dc=t"));
        dir.insert(posix("cn=a,ou=groups,dc=t"));

        let all = dir
            .search("ou=groups,dc=t", SearchScope::Subtree, "(objectClass=*)")
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let groups = dir
            .search("ou=groups,dc=t", SearchScope::Subtree, "(objectClass=posixGroup)")
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);

        let base = dir
            .search("cn=a,ou=groups,dc=t", SearchScope::Base, "(objectClass=*)")
            .await
            .unwrap();
        assert_eq!(base[0].dn, "cn=a,ou=groups,dc=t");
    }

    #[tokio::test]
    async fn missing_base_is_not_found() {
        let dir = NullDirectory::new();
        let err = dir
            .search("cn=x,ou=groups,dc=t", SearchScope::Base, "(objectClass=*)")
            .await
            .unwrap_err();
        assert!(matches!(err, GroveError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_all_values_removes_attribute() {
        let dir = NullDirectory::new();
        dir.insert(posix("cn=a,dc=t").with_attr("memberUid", ["x", "y"]));

        dir.modify(
            "cn=a,dc=t",
            vec![Modification::Delete {
                attr: "memberuid".into(),
                values: vec![],
            }],
        )
        .await
        .unwrap();

        assert!(dir.entry("cn=a,dc=t").unwrap().values("memberUid").is_empty());
        assert_eq!(dir.modify_log().len(), 1);
    }

    #[tokio::test]
    async fn failed_modify_leaves_entry_unchanged() {
        let dir = NullDirectory::new();
        dir.insert(posix("cn=a,dc=t").with_attr("memberUid", ["x"]));

        let err = dir
            .modify(
                "cn=a,dc=t",
                vec![
                    Modification::Add {
                        attr: "memberUid".into(),
                        values: vec!["y".into()],
                    },
                    Modification::Delete {
                        attr: "description".into(),
                        values: vec![],
                    },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GroveError::Directory(_)));
        assert_eq!(dir.entry("cn=a,dc=t").unwrap().values("memberUid"), ["x"]);
        assert!(dir.modify_log().is_empty());
    }

    #[test]
    fn compound_filters_are_rejected() {
        assert!(Filter::parse("(&(cn=a)(gidNumber=1))").is_err());
        assert!(Filter::parse("cn=a").is_err());
    }
}
