//! Group lifecycle notifications.
//!
//! Directory group mutations announce themselves on the `groups` topic
//! with a `pre_*` event before the mutation and a `post_*` event after
//! it succeeds. Delivery is fire-and-forget: a sink cannot veto or fail
//! the operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use crate::models::group::DirectoryGroup;

pub const GROUPS_TOPIC: &str = "groups";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEventKind {
    PreAdd,
    PostAdd,
    PreUpdate,
    PostUpdate,
    PreRemove,
    PostRemove,
}

impl GroupEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreAdd => "pre_add",
            Self::PostAdd => "post_add",
            Self::PreUpdate => "pre_update",
            Self::PostUpdate => "post_update",
            Self::PreRemove => "pre_remove",
            Self::PostRemove => "post_remove",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupEvent {
    pub topic: &'static str,
    pub kind: GroupEventKind,
    /// Snapshot of the group at the time of emission.
    pub group: DirectoryGroup,
    pub emitted_at: DateTime<Utc>,
}

impl GroupEvent {
    pub fn new(kind: GroupEventKind, group: &DirectoryGroup) -> Self {
        Self {
            topic: GROUPS_TOPIC,
            kind,
            group: group.clone(),
            emitted_at: Utc::now(),
        }
    }
}

/// Receives group lifecycle events.
pub trait GroupEventSink: Send + Sync {
    fn emit(&self, event: GroupEvent);
}

/// Fans events out to any number of in-process subscribers.
///
/// Events emitted while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastEvents {
    tx: broadcast::Sender<GroupEvent>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GroupEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new(64)
    }
}

impl GroupEventSink for BroadcastEvents {
    fn emit(&self, event: GroupEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes every event as a structured audit line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEvents;

impl GroupEventSink for LogEvents {
    fn emit(&self, event: GroupEvent) {
        info!(
            topic = event.topic,
            event = event.kind.as_str(),
            group = %event.group.name,
            gid = event.group.gid,
            members = event.group.members.len(),
            "Group lifecycle event"
        );
    }
}
