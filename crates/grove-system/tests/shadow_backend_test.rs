//! Tests for the shadow-utils backend. Group commands are replaced by
//! scripts that record their arguments, and the group file override
//! points at a temporary file.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use grove_core::error::GroveError;
use grove_core::repository::SystemGroupBackend;
use grove_system::{ShadowBackend, SystemConfig};
use tempfile::TempDir;

const GROUP_FILE: &str = "root:x:0:\nwheel:x:10:alice,bob\nbroken:x\nusers:x:100:\n";

/// Write an executable script that appends `<name> <args>` to `log` and
/// exits with `status`.
fn recorder(dir: &Path, name: &str, log: &Path, status: i32) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            "#!/bin/sh\necho \"{name} $*\" >> '{}'\necho 'failed' >&2\nexit {status}\n",
            log.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Write an executable stand-in for `getent` that records its arguments
/// and prints a name-service group listing with one malformed line.
fn name_service(dir: &Path, log: &Path) -> PathBuf {
    let path = dir.join("getent");
    fs::write(
        &path,
        format!(
            "#!/bin/sh\necho \"getent $*\" >> '{}'\n\
             printf '%s\\n' 'root:x:0:' 'legacy:x:' 'directory:x:5000:alice,bob'\n",
            log.display()
        ),
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn scripted_backend(dir: &TempDir, status: i32) -> (ShadowBackend, PathBuf) {
    let log = dir.path().join("commands.log");

    let config = SystemConfig {
        group_file: None,
        getent: name_service(dir.path(), &log).display().to_string(),
        groupadd: recorder(dir.path(), "groupadd", &log, status)
            .display()
            .to_string(),
        usermod: recorder(dir.path(), "usermod", &log, status)
            .display()
            .to_string(),
        groupdel: recorder(dir.path(), "groupdel", &log, status)
            .display()
            .to_string(),
    };
    (ShadowBackend::new(config), log)
}

// Only this test spawns processes, so no other test can hold a write
// handle to a script while it is being executed.
#[tokio::test]
async fn commands_receive_arguments_and_report_failures() {
    let dir = TempDir::new().unwrap();
    let (backend, log) = scripted_backend(&dir, 0);

    backend.create_group("developers").await.unwrap();
    backend.add_member("developers", "alice").await.unwrap();
    backend.delete_group("developers").await.unwrap();

    let groups = backend.list_groups().await.unwrap();
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["root", "directory"]);
    assert_eq!(groups[1].gid, 5000);
    assert_eq!(groups[1].members, vec!["alice", "bob"]);

    let recorded = fs::read_to_string(&log).unwrap();
    assert_eq!(
        recorded.lines().collect::<Vec<_>>(),
        vec![
            "groupadd developers",
            "usermod -a -G developers alice",
            "groupdel developers",
            "getent group",
        ]
    );

    let failing_dir = TempDir::new().unwrap();
    let (failing, _) = scripted_backend(&failing_dir, 6);
    let err = failing.delete_group("ghost").await.unwrap_err();
    match err {
        GroveError::CommandFailed { code, stderr, .. } => {
            assert_eq!(code, Some(6));
            assert_eq!(stderr, "failed");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn groups_are_read_from_the_group_file() {
    let dir = TempDir::new().unwrap();
    let group_file = dir.path().join("group");
    fs::write(&group_file, GROUP_FILE).unwrap();
    let backend = ShadowBackend::new(SystemConfig {
        group_file: Some(group_file),
        ..Default::default()
    });

    let groups = backend.list_groups().await.unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[1].name, "wheel");
    assert_eq!(groups[1].members, vec!["alice", "bob"]);
    assert_eq!(groups[2].name, "users");
}

#[tokio::test]
async fn missing_group_file_is_a_system_error() {
    let backend = ShadowBackend::new(SystemConfig {
        group_file: Some(PathBuf::from("/nonexistent/grove/group")),
        ..Default::default()
    });

    let err = backend.list_groups().await.unwrap_err();
    assert!(matches!(err, GroveError::System(_)));
}
