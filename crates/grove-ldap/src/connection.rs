//! LDAP connection management.

use grove_core::models::group::DEFAULT_ROOT_DN;
use ldap3::{Ldap, LdapConnAsync};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::LdapError;

/// Configuration for connecting to the directory service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LdapConfig {
    /// Server URL (e.g., `ldap://127.0.0.1:389`).
    pub url: String,
    /// DN to bind as.
    pub bind_dn: String,
    /// Password for `bind_dn`.
    pub bind_password: String,
    /// Directory root; groups live under `ou=groups,<root_dn>`.
    pub root_dn: String,
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            url: "ldap://127.0.0.1:389".into(),
            bind_dn: format!("cn=admin,{DEFAULT_ROOT_DN}"),
            bind_password: String::new(),
            root_dn: DEFAULT_ROOT_DN.into(),
        }
    }
}

/// Manages an authenticated connection to the directory service.
///
/// Clones share the underlying connection.
#[derive(Clone)]
pub struct LdapManager {
    ldap: Ldap,
}

impl LdapManager {
    /// Connect to the directory using the provided configuration.
    ///
    /// Spawns the connection driver on the current tokio runtime and
    /// performs a simple bind as `bind_dn`.
    pub async fn connect(config: &LdapConfig) -> Result<Self, LdapError> {
        info!(
            url = %config.url,
            bind_dn = %config.bind_dn,
            "Connecting to directory"
        );

        let (conn, mut ldap) = LdapConnAsync::new(&config.url).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "Directory connection closed with error");
            }
        });

        ldap.simple_bind(&config.bind_dn, &config.bind_password)
            .await?
            .success()
            .map_err(|e| LdapError::at(&config.bind_dn, e))?;

        info!("Successfully bound to directory");

        Ok(Self { ldap })
    }

    /// A handle to the underlying connection.
    pub(crate) fn handle(&self) -> Ldap {
        self.ldap.clone()
    }

    /// Unbind and close the connection.
    pub async fn close(self) -> Result<(), LdapError> {
        let mut ldap = self.ldap;
        ldap.unbind().await?;
        Ok(())
    }
}
