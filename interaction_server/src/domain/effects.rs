// Side effects requested from the live session.

use crate::domain::entities::{ActorId, ItemId};
use crate::domain::geometry::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub enum MessageTarget {
    Actor(ActorId),
    Broadcast,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TeleportDestination {
    // Session-defined respawn point.
    Spawn,
    Position(Vec3),
    Actor(ActorId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectRequest {
    Message {
        target: MessageTarget,
        text: String,
        duration_secs: u32,
    },
    ModifyStat {
        actor: ActorId,
        stat: String,
        delta: f32,
        duration_secs: u32,
    },
    SetStat {
        actor: ActorId,
        stat: String,
        value: f32,
    },
    DestroyItem {
        item: ItemId,
    },
    ReplaceItem {
        item: ItemId,
    },
    Kill {
        actor: ActorId,
    },
    Teleport {
        actor: ActorId,
        destination: TeleportDestination,
    },
    SetGodMode {
        actor: ActorId,
        enabled: bool,
    },
    Damage {
        actor: ActorId,
        amount: f32,
    },
    QueryBalance {
        actor: ActorId,
    },
    QueryStats {
        actor: ActorId,
    },
    AdjustBalance {
        actor: ActorId,
        delta: i64,
    },
    ResetProgression {
        actor: ActorId,
    },
    GrantXp {
        actor: ActorId,
        amount: u32,
    },
    ForgeAll {
        actor: ActorId,
    },
}

impl EffectRequest {
    pub fn message(actor: ActorId, text: impl Into<String>, duration_secs: u32) -> Self {
        Self::Message {
            target: MessageTarget::Actor(actor),
            text: text.into(),
            duration_secs,
        }
    }

    pub fn modify_stat(actor: ActorId, stat: &str, delta: f32, duration_secs: u32) -> Self {
        Self::ModifyStat {
            actor,
            stat: stat.to_string(),
            delta,
            duration_secs,
        }
    }

    pub fn eject(actor: ActorId) -> Self {
        Self::Teleport {
            actor,
            destination: TeleportDestination::Spawn,
        }
    }

    // Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::ModifyStat { .. } => "modify_stat",
            Self::SetStat { .. } => "set_stat",
            Self::DestroyItem { .. } => "destroy_item",
            Self::ReplaceItem { .. } => "replace_item",
            Self::Kill { .. } => "kill",
            Self::Teleport { .. } => "teleport",
            Self::SetGodMode { .. } => "set_god_mode",
            Self::Damage { .. } => "damage",
            Self::QueryBalance { .. } => "query_balance",
            Self::QueryStats { .. } => "query_stats",
            Self::AdjustBalance { .. } => "adjust_balance",
            Self::ResetProgression { .. } => "reset_progression",
            Self::GrantXp { .. } => "grant_xp",
            Self::ForgeAll { .. } => "forge_all",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatValue {
    pub name: String,
    pub value: f32,
}

impl StatValue {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectOutcome {
    Applied,
    Balance(i64),
    Stats(Vec<StatValue>),
}
