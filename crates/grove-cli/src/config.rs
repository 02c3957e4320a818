//! grove configuration with TOML file support.

use std::path::Path;

use grove_core::error::{GroveError, GroveResult};
use grove_ldap::LdapConfig;
use grove_system::SystemConfig;
use serde::Deserialize;

/// Top-level configuration.
///
/// Every section and field has a default, so an empty file (or no file
/// at all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    pub ldap: LdapConfig,
    pub system: SystemConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Human,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl GroveConfig {
    pub fn from_toml_str(contents: &str) -> GroveResult<Self> {
        toml::from_str(contents).map_err(|e| GroveError::Config(e.to_string()))
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> GroveResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GroveError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }
}
