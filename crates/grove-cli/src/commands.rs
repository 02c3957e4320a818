//! Subcommand definitions and handlers.

use anyhow::{Context, bail};
use clap::{ArgGroup, Subcommand};
use grove_core::events::LogEvents;
use grove_core::models::group::{CreateDirectoryGroup, DirectoryGroup, GroupSummary, SystemGroup};
use grove_ldap::schema::ensure_groups_container;
use grove_ldap::{DirectoryGroupRepository, LdapManager};
use grove_system::{ShadowBackend, SystemGroupRepository};
use serde::Serialize;
use tracing::info;

use crate::config::GroveConfig;
use crate::sync::sync_group;

#[derive(Subcommand)]
pub enum Command {
    /// Manage directory (LDAP) groups.
    Ldap {
        #[command(subcommand)]
        action: LdapAction,
    },
    /// Manage local operating-system groups.
    System {
        #[command(subcommand)]
        action: SystemAction,
    },
    /// Create or extend the OS group named after a directory group with
    /// the directory group's members. Never removes OS members.
    Sync {
        /// Directory group name.
        name: String,
    },
}

#[derive(Subcommand)]
pub enum LdapAction {
    /// Create the groups container below the root DN if missing.
    Init,
    /// List every directory group.
    List,
    /// Show one directory group.
    #[command(group(ArgGroup::new("key").required(true).args(["name", "gid"])))]
    Get {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        gid: Option<u32>,
    },
    /// Add a directory group. Without --gid the next OS gid is used.
    Add {
        name: String,
        #[arg(long)]
        gid: Option<u32>,
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Replace the member list of an existing directory group.
    SetMembers {
        name: String,
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Delete a directory group.
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum SystemAction {
    /// List every OS group.
    List,
    /// Show one OS group.
    Get { name: String },
    /// Create an OS group and add members to it.
    Add {
        name: String,
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Add members to an existing OS group.
    AddMembers {
        name: String,
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Delete an OS group.
    Delete { name: String },
    /// Print the gid the next directory group would receive.
    NextGid,
}

type LdapGroups = DirectoryGroupRepository<LdapManager, ShadowBackend, LogEvents>;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn summaries<'a, I>(groups: I) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a DirectoryGroup>,
{
    groups.into_iter().map(DirectoryGroup::summary).collect()
}

pub async fn run(command: Command, config: &GroveConfig) -> anyhow::Result<()> {
    let system = ShadowBackend::new(config.system.clone());

    match command {
        Command::Ldap { action } => {
            let manager = LdapManager::connect(&config.ldap)
                .await
                .with_context(|| format!("connecting to {}", config.ldap.url))?;
            let repo = DirectoryGroupRepository::new(
                manager.clone(),
                system,
                LogEvents,
                &config.ldap.root_dn,
            );
            let result = run_ldap(action, &repo, &manager).await;
            manager.close().await?;
            result
        }
        Command::System { action } => {
            run_system(action, &SystemGroupRepository::new(system)).await
        }
        Command::Sync { name } => {
            let manager = LdapManager::connect(&config.ldap)
                .await
                .with_context(|| format!("connecting to {}", config.ldap.url))?;
            let directory = DirectoryGroupRepository::new(
                manager.clone(),
                system.clone(),
                LogEvents,
                &config.ldap.root_dn,
            );
            let result = sync(&name, &directory, &SystemGroupRepository::new(system)).await;
            manager.close().await?;
            result
        }
    }
}

async fn run_ldap(
    action: LdapAction,
    repo: &LdapGroups,
    manager: &LdapManager,
) -> anyhow::Result<()> {
    match action {
        LdapAction::Init => {
            let created = ensure_groups_container(manager, repo.root_dn()).await?;
            print_json(&serde_json::json!({ "created": created }))
        }
        LdapAction::List => {
            let groups = repo.list().await?;
            print_json(&summaries(&groups))
        }
        LdapAction::Get { name, gid } => {
            let group = match (gid, name) {
                (Some(gid), _) => repo.find_by_gid(gid).await?,
                (None, Some(name)) => repo.find_by_name(&name).await?,
                (None, None) => None,
            };
            match group {
                Some(group) => print_json(&group.summary()),
                None => bail!("no such directory group"),
            }
        }
        LdapAction::Add { name, gid, members } => {
            let group = repo
                .build(CreateDirectoryGroup {
                    name,
                    gid,
                    members,
                    root_dn: None,
                })
                .await?;
            repo.add(&group).await?;
            print_json(&group.summary())
        }
        LdapAction::SetMembers { name, members } => {
            let Some(mut group) = repo.find_by_name(&name).await? else {
                bail!("directory group {name} does not exist");
            };
            group.members = members;
            repo.update(&group).await?;
            print_json(&group.summary())
        }
        LdapAction::Delete { name } => {
            // A missing group still goes through delete so the directory's
            // own not-found error is what the caller sees.
            let group = repo
                .find_by_name(&name)
                .await?
                .unwrap_or_else(|| DirectoryGroup::new(&name, 0, Vec::new(), repo.root_dn()));
            repo.delete(&group).await?;
            info!(group = %name, "Directory group removed");
            Ok(())
        }
    }
}

async fn run_system(
    action: SystemAction,
    repo: &SystemGroupRepository<ShadowBackend>,
) -> anyhow::Result<()> {
    match action {
        SystemAction::List => {
            let groups = repo.list().await?;
            print_json(&groups.iter().map(SystemGroup::summary).collect::<Vec<_>>())
        }
        SystemAction::Get { name } => match repo.find_by_name(&name).await? {
            Some(group) => print_json(&group.summary()),
            None => bail!("no such system group: {name}"),
        },
        SystemAction::Add { name, members } => {
            let mut group = SystemGroup::new(name, members);
            repo.add(&mut group).await?;
            print_json(&group.summary())
        }
        SystemAction::AddMembers { name, members } => {
            let group = SystemGroup::new(name, members);
            repo.update(&group).await?;
            Ok(())
        }
        SystemAction::Delete { name } => {
            repo.delete(&SystemGroup::new(name, Vec::new())).await?;
            Ok(())
        }
        SystemAction::NextGid => {
            let gid = repo.next_gid().await?;
            print_json(&serde_json::json!({ "gid": gid }))
        }
    }
}

async fn sync(
    name: &str,
    directory: &LdapGroups,
    system: &SystemGroupRepository<ShadowBackend>,
) -> anyhow::Result<()> {
    let synced = sync_group(name, directory, system).await?;
    print_json(&synced.summary())
}
