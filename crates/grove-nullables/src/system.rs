//! Nullable OS group database — in-memory stand-in for shadow-utils.

use std::sync::{Arc, Mutex, MutexGuard};

use grove_core::error::{GroveError, GroveResult};
use grove_core::models::group::SystemGroup;
use grove_core::repository::SystemGroupBackend;

/// First gid handed out to groups created through this backend, matching
/// the usual `GID_MIN` of `/etc/login.defs`.
pub const FIRST_GID: u32 = 1000;

/// `groupadd` exit status for a name that is already taken.
const EXIT_NAME_IN_USE: i32 = 9;
/// `groupdel` / `usermod` exit status for a group that does not exist.
const EXIT_GROUP_MISSING: i32 = 6;

struct State {
    groups: Vec<SystemGroup>,
    next_gid: u32,
}

/// An in-memory OS group database.
///
/// Failures are reported as [`GroveError::CommandFailed`] with the exit
/// codes shadow-utils uses, so callers see the same errors they would
/// get from `grove_system::ShadowBackend`.
#[derive(Clone)]
pub struct NullSystemGroups {
    state: Arc<Mutex<State>>,
}

impl NullSystemGroups {
    pub fn new() -> Self {
        Self::with_groups(Vec::new())
    }

    /// Seed the database. New groups get gids above both [`FIRST_GID`]
    /// and every seeded gid.
    pub fn with_groups(groups: Vec<SystemGroup>) -> Self {
        let next_gid = groups
            .iter()
            .map(|g| g.gid.saturating_add(1))
            .max()
            .unwrap_or(FIRST_GID)
            .max(FIRST_GID);
        Self {
            state: Arc::new(Mutex::new(State { groups, next_gid })),
        }
    }

    pub fn group(&self, name: &str) -> Option<SystemGroup> {
        self.lock().groups.iter().find(|g| g.name == name).cloned()
    }

    pub fn members_of(&self, name: &str) -> Vec<String> {
        self.group(name).map(|g| g.members).unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("null system group state poisoned")
    }
}

impl Default for NullSystemGroups {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemGroupBackend for NullSystemGroups {
    async fn create_group(&self, name: &str) -> GroveResult<()> {
        let mut state = self.lock();
        if state.groups.iter().any(|g| g.name == name) {
            return Err(command_failed(
                "groupadd",
                EXIT_NAME_IN_USE,
                format!("groupadd: group '{name}' already exists"),
            ));
        }
        let gid = state.next_gid;
        state.next_gid += 1;
        state.groups.push(SystemGroup {
            name: name.to_string(),
            gid,
            members: Vec::new(),
        });
        Ok(())
    }

    async fn add_member(&self, group: &str, account: &str) -> GroveResult<()> {
        let mut state = self.lock();
        let entry = state
            .groups
            .iter_mut()
            .find(|g| g.name == group)
            .ok_or_else(|| {
                command_failed(
                    "usermod",
                    EXIT_GROUP_MISSING,
                    format!("usermod: group '{group}' does not exist"),
                )
            })?;
        if !entry.members.iter().any(|m| m == account) {
            entry.members.push(account.to_string());
        }
        Ok(())
    }

    async fn delete_group(&self, name: &str) -> GroveResult<()> {
        let mut state = self.lock();
        let position = state
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| {
                command_failed(
                    "groupdel",
                    EXIT_GROUP_MISSING,
                    format!("groupdel: group '{name}' does not exist"),
                )
            })?;
        state.groups.remove(position);
        Ok(())
    }

    async fn list_groups(&self) -> GroveResult<Vec<SystemGroup>> {
        Ok(self.lock().groups.clone())
    }
}

fn command_failed(program: &str, code: i32, stderr: String) -> GroveError {
    GroveError::CommandFailed {
        program: program.to_string(),
        code: Some(code),
        stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_groups_get_fresh_gids() {
        let db = NullSystemGroups::with_groups(vec![SystemGroup {
            name: "users".into(),
            gid: 1500,
            members: vec![],
        }]);

        db.create_group("ops").await.unwrap();
        assert_eq!(db.group("ops").unwrap().gid, 1501);
    }

    #[tokio::test]
    async fn duplicate_create_fails_like_groupadd() {
        let db = NullSystemGroups::new();
        db.create_group("ops").await.unwrap();

        let err = db.create_group("ops").await.unwrap_err();
        assert!(matches!(
            err,
            GroveError::CommandFailed { ref program, code: Some(9), .. } if program == "groupadd"
        ));
    }

    #[tokio::test]
    async fn adding_a_member_twice_keeps_one_entry() {
        let db = NullSystemGroups::new();
        db.create_group("ops").await.unwrap();
        db.add_member("ops", "alice").await.unwrap();
        db.add_member("ops", "alice").await.unwrap();

        assert_eq!(db.members_of("ops"), vec!["alice".to_string()]);
    }
}
