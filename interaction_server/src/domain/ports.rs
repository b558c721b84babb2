use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::effects::{EffectOutcome, EffectRequest};
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory, InventoryChange};
use crate::domain::errors::SessionError;

// Port for reading the world. Feature loops depend on this trait, not on the bridge client.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    // Every connected actor, in session order. Missing pose fields are not an error.
    async fn list_actors(&self) -> Result<Vec<ActorSnapshot>, SessionError>;

    async fn inventory(&self, actor: ActorId) -> Result<Option<Inventory>, SessionError>;

    // Drains inventory notifications observed since the previous call.
    async fn inventory_changes(&self) -> Result<Vec<InventoryChange>, SessionError>;
}

// Port for acting on the world. Calls may fail; nothing is retried.
#[async_trait]
pub trait EffectDispatcher: Send + Sync {
    async fn send(&self, effect: &EffectRequest) -> Result<EffectOutcome, SessionError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

// Who may use gated features is decided outside this service.
pub trait AccessPolicy: Send + Sync {
    fn allows(&self, actor_name: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn allows(&self, _actor_name: &str) -> bool {
        true
    }
}

// Fixed set of actor names, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }
}

impl AccessPolicy for AllowList {
    fn allows(&self, actor_name: &str) -> bool {
        self.names.contains(&actor_name.to_lowercase())
    }
}
