//! shadow-utils implementation of [`SystemGroupBackend`].

use grove_core::error::GroveResult;
use grove_core::models::group::SystemGroup;
use grove_core::repository::SystemGroupBackend;
use tokio::process::Command;
use tracing::debug;

use crate::config::SystemConfig;
use crate::error::SystemError;
use crate::group_file::parse_group_file;

/// Mutates the host's group database through shadow-utils and reads it
/// back through the name service (`getent group`), so groups served by
/// NSS modules such as LDAP are listed alongside local ones. Setting
/// [`SystemConfig::group_file`] reads a flat file instead.
///
/// Commands are spawned with an argument vector, never through a shell,
/// and each call waits for the command to exit. A non-zero exit status
/// is returned as [`SystemError::CommandFailed`].
#[derive(Debug, Clone, Default)]
pub struct ShadowBackend {
    config: SystemConfig,
}

impl ShadowBackend {
    pub fn new(config: SystemConfig) -> Self {
        Self { config }
    }

    /// Run `program` to completion and return its standard output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, SystemError> {
        debug!(program, ?args, "Running group command");
        let output = Command::new(program).args(args).output().await?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(SystemError::CommandFailed {
            program: program.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl SystemGroupBackend for ShadowBackend {
    async fn create_group(&self, name: &str) -> GroveResult<()> {
        self.run(&self.config.groupadd, &[name]).await?;
        Ok(())
    }

    async fn add_member(&self, group: &str, account: &str) -> GroveResult<()> {
        self.run(&self.config.usermod, &["-a", "-G", group, account])
            .await?;
        Ok(())
    }

    async fn delete_group(&self, name: &str) -> GroveResult<()> {
        self.run(&self.config.groupdel, &[name]).await?;
        Ok(())
    }

    async fn list_groups(&self) -> GroveResult<Vec<SystemGroup>> {
        let contents = match &self.config.group_file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(SystemError::from)?,
            None => self.run(&self.config.getent, &["group"]).await?,
        };
        Ok(parse_group_file(&contents))
    }
}
