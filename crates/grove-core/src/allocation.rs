//! Numeric group id allocation.
//!
//! New directory groups take their default gid from the OS group
//! database, not from the directory: the next id is one past the highest
//! gid the OS reports. Directory groups count only when the host's name
//! service exposes them; otherwise a directory group with a higher id is
//! not considered.

use crate::error::{GroveError, GroveResult};
use crate::models::group::SystemGroup;
use crate::repository::SystemGroupBackend;

/// One more than the highest gid in `groups`.
pub fn next_gid_after(groups: &[SystemGroup]) -> GroveResult<u32> {
    let highest = groups
        .iter()
        .map(|g| g.gid)
        .max()
        .ok_or_else(|| GroveError::Validation {
            message: "no system groups to allocate a gid from".into(),
        })?;

    highest.checked_add(1).ok_or_else(|| GroveError::Validation {
        message: format!("gid space exhausted after {highest}"),
    })
}

/// Scan the OS group database and return the next free gid.
pub async fn next_gid<B: SystemGroupBackend>(backend: &B) -> GroveResult<u32> {
    let groups = backend.list_groups().await?;
    next_gid_after(&groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, gid: u32) -> SystemGroup {
        SystemGroup {
            name: name.into(),
            gid,
            members: vec![],
        }
    }

    #[test]
    fn next_gid_is_one_past_the_maximum() {
        let groups = vec![group("a", 1), group("b", 5), group("c", 2)];
        assert_eq!(next_gid_after(&groups).unwrap(), 6);
    }

    #[test]
    fn empty_database_is_an_error() {
        let err = next_gid_after(&[]).unwrap_err();
        assert!(matches!(err, GroveError::Validation { .. }));
    }

    #[test]
    fn overflow_is_an_error() {
        let err = next_gid_after(&[group("nogroup", u32::MAX)]).unwrap_err();
        assert!(matches!(err, GroveError::Validation { .. }));
    }
}
