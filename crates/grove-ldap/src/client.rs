//! [`DirectoryClient`] implementation over an `ldap3` connection.

use std::collections::{BTreeMap, HashSet};

use grove_core::error::GroveResult;
use grove_core::models::directory::{DirectoryEntry, Modification, SearchScope};
use grove_core::repository::DirectoryClient;
use ldap3::{Mod, Scope, SearchEntry};
use tracing::debug;

use crate::connection::LdapManager;
use crate::error::LdapError;

fn to_scope(scope: SearchScope) -> Scope {
    match scope {
        SearchScope::Base => Scope::Base,
        SearchScope::Subtree => Scope::Subtree,
    }
}

// ldap3 takes attribute values as sets: order and exact duplicates are
// not carried on the wire.
fn to_mod(change: Modification) -> Mod<String> {
    match change {
        Modification::Add { attr, values } => Mod::Add(attr, values.into_iter().collect()),
        Modification::Delete { attr, values } => Mod::Delete(attr, values.into_iter().collect()),
    }
}

impl DirectoryClient for LdapManager {
    async fn search(
        &self,
        base: &str,
        scope: SearchScope,
        filter: &str,
    ) -> GroveResult<Vec<DirectoryEntry>> {
        debug!(base, ?scope, filter, "LDAP search");
        let mut ldap = self.handle();
        let (entries, _) = ldap
            .search(base, to_scope(scope), filter, vec!["*"])
            .await
            .map_err(LdapError::from)?
            .success()
            .map_err(|e| LdapError::at(base, e))?;

        Ok(entries
            .into_iter()
            .map(|raw| {
                let entry = SearchEntry::construct(raw);
                DirectoryEntry {
                    dn: entry.dn,
                    attrs: entry.attrs.into_iter().collect::<BTreeMap<_, _>>(),
                }
            })
            .collect())
    }

    async fn add(&self, entry: DirectoryEntry) -> GroveResult<()> {
        debug!(dn = %entry.dn, "LDAP add");
        let attrs: Vec<(String, HashSet<String>)> = entry
            .attrs
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect();

        let mut ldap = self.handle();
        ldap.add(&entry.dn, attrs)
            .await
            .map_err(LdapError::from)?
            .success()
            .map_err(|e| LdapError::at(&entry.dn, e))?;
        Ok(())
    }

    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> GroveResult<()> {
        debug!(dn, changes = changes.len(), "LDAP modify");
        let mods: Vec<Mod<String>> = changes.into_iter().map(to_mod).collect();

        let mut ldap = self.handle();
        ldap.modify(dn, mods)
            .await
            .map_err(LdapError::from)?
            .success()
            .map_err(|e| LdapError::at(dn, e))?;
        Ok(())
    }

    async fn delete(&self, dn: &str) -> GroveResult<()> {
        debug!(dn, "LDAP delete");
        let mut ldap = self.handle();
        ldap.delete(dn)
            .await
            .map_err(LdapError::from)?
            .success()
            .map_err(|e| LdapError::at(dn, e))?;
        Ok(())
    }
}
