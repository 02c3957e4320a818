//! OS group backend configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Where the group database is read from and which commands mutate it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Read groups from this file (in `/etc/group` format) instead of
    /// enumerating the name service with `getent`.
    pub group_file: Option<PathBuf>,
    pub getent: String,
    pub groupadd: String,
    pub usermod: String,
    pub groupdel: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            group_file: None,
            getent: "getent".into(),
            groupadd: "groupadd".into(),
            usermod: "usermod".into(),
            groupdel: "groupdel".into(),
        }
    }
}
