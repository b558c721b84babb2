// Wire DTOs for the session bridge and the operator status surface.
// Domain types stay serde-free apart from `Vec3`; conversions live here.

use crate::domain::effects::{EffectRequest, MessageTarget, StatValue, TeleportDestination};
use crate::domain::entities::{
    ActorId, ActorSnapshot, ChangeKind, HeldItem, Inventory, InventoryChange, ItemId,
};
use crate::domain::geometry::Vec3;
use crate::use_cases::{SessionStatus, WorldSummary};
use serde::{Deserialize, Serialize};

/// One actor as reported by `GET /actors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorDto {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub head: Option<Vec3>,
    #[serde(default)]
    pub left_hand: Option<Vec3>,
    #[serde(default)]
    pub right_hand: Option<Vec3>,
    #[serde(default)]
    pub left_hand_up: Option<Vec3>,
    #[serde(default)]
    pub right_hand_up: Option<Vec3>,
    #[serde(default)]
    pub left_hand_forward: Option<Vec3>,
    #[serde(default)]
    pub right_hand_forward: Option<Vec3>,
    #[serde(default)]
    pub inventory: Option<InventoryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldItemDto {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryDto {
    #[serde(default)]
    pub left: Option<HeldItemDto>,
    #[serde(default)]
    pub right: Option<HeldItemDto>,
}

/// Entry of `GET /inventory-changes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryChangeDto {
    pub actor_id: u64,
    #[serde(default)]
    pub actor_name: String,
    // "pickup", "drop"; anything else is carried as `Other`.
    pub kind: String,
    #[serde(default)]
    pub item: Option<HeldItemDto>,
    #[serde(default)]
    pub inventory: Option<InventoryDto>,
}

/// Body of `POST /effects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EffectBody {
    // `actor_id: None` broadcasts to every actor.
    Message {
        actor_id: Option<u64>,
        text: String,
        duration_secs: u32,
    },
    ModifyStat {
        actor_id: u64,
        stat: String,
        delta: f32,
        duration_secs: u32,
    },
    SetStat {
        actor_id: u64,
        stat: String,
        value: f32,
    },
    DestroyItem {
        item_id: u64,
    },
    ReplaceItem {
        item_id: u64,
    },
    Kill {
        actor_id: u64,
    },
    Teleport {
        actor_id: u64,
        destination: DestinationDto,
    },
    SetGodMode {
        actor_id: u64,
        enabled: bool,
    },
    Damage {
        actor_id: u64,
        amount: f32,
    },
    QueryBalance {
        actor_id: u64,
    },
    QueryStats {
        actor_id: u64,
    },
    AdjustBalance {
        actor_id: u64,
        delta: i64,
    },
    ResetProgression {
        actor_id: u64,
    },
    GrantXp {
        actor_id: u64,
        amount: u32,
    },
    ForgeAll {
        actor_id: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DestinationDto {
    Spawn,
    Position { at: Vec3 },
    Actor { actor_id: u64 },
}

/// Reply of `POST /effects`. Only queries fill it: `balance` or `stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectReplyDto {
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub stats: Option<Vec<StatDto>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatDto {
    pub name: String,
    pub value: f32,
}

impl From<StatDto> for StatValue {
    fn from(dto: StatDto) -> Self {
        StatValue::new(dto.name, dto.value)
    }
}

/// Error body returned by the bridge on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct BridgeErrorDto {
    pub message: String,
}

/// Response of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: String,
    pub live_projectiles: usize,
    pub combat_agreements: usize,
    pub tavern_closed: bool,
    pub denylist_size: usize,
}

impl StatusResponse {
    pub fn new(status: SessionStatus, summary: WorldSummary) -> Self {
        Self {
            session: status.as_str().to_string(),
            live_projectiles: summary.live_projectiles,
            combat_agreements: summary.combat_agreements,
            tavern_closed: summary.tavern_closed,
            denylist_size: summary.denylist_size,
        }
    }
}

impl From<HeldItemDto> for HeldItem {
    fn from(dto: HeldItemDto) -> Self {
        HeldItem::new(dto.name, ItemId(dto.id))
    }
}

impl From<InventoryDto> for Inventory {
    fn from(dto: InventoryDto) -> Self {
        Inventory {
            left: dto.left.map(HeldItem::from),
            right: dto.right.map(HeldItem::from),
        }
    }
}

impl From<ActorDto> for ActorSnapshot {
    fn from(dto: ActorDto) -> Self {
        ActorSnapshot {
            id: ActorId(dto.id),
            name: dto.name,
            position: dto.position,
            head: dto.head,
            left_hand: dto.left_hand,
            right_hand: dto.right_hand,
            left_hand_up: dto.left_hand_up,
            right_hand_up: dto.right_hand_up,
            left_hand_forward: dto.left_hand_forward,
            right_hand_forward: dto.right_hand_forward,
            inventory: dto.inventory.map(Inventory::from),
        }
    }
}

impl From<InventoryChangeDto> for InventoryChange {
    fn from(dto: InventoryChangeDto) -> Self {
        let kind = match dto.kind.to_ascii_lowercase().as_str() {
            "pickup" => ChangeKind::Pickup,
            "drop" => ChangeKind::Drop,
            _ => ChangeKind::Other,
        };
        InventoryChange {
            actor: ActorId(dto.actor_id),
            actor_name: dto.actor_name,
            kind,
            item: dto.item.map(HeldItem::from),
            inventory: dto.inventory.map(Inventory::from),
        }
    }
}

impl From<&TeleportDestination> for DestinationDto {
    fn from(destination: &TeleportDestination) -> Self {
        match destination {
            TeleportDestination::Spawn => DestinationDto::Spawn,
            TeleportDestination::Position(at) => DestinationDto::Position { at: *at },
            TeleportDestination::Actor(actor) => DestinationDto::Actor { actor_id: actor.0 },
        }
    }
}

impl From<&EffectRequest> for EffectBody {
    fn from(effect: &EffectRequest) -> Self {
        match effect {
            EffectRequest::Message {
                target,
                text,
                duration_secs,
            } => EffectBody::Message {
                actor_id: match target {
                    MessageTarget::Actor(actor) => Some(actor.0),
                    MessageTarget::Broadcast => None,
                },
                text: text.clone(),
                duration_secs: *duration_secs,
            },
            EffectRequest::ModifyStat {
                actor,
                stat,
                delta,
                duration_secs,
            } => EffectBody::ModifyStat {
                actor_id: actor.0,
                stat: stat.clone(),
                delta: *delta,
                duration_secs: *duration_secs,
            },
            EffectRequest::SetStat { actor, stat, value } => EffectBody::SetStat {
                actor_id: actor.0,
                stat: stat.clone(),
                value: *value,
            },
            EffectRequest::DestroyItem { item } => EffectBody::DestroyItem { item_id: item.0 },
            EffectRequest::ReplaceItem { item } => EffectBody::ReplaceItem { item_id: item.0 },
            EffectRequest::Kill { actor } => EffectBody::Kill { actor_id: actor.0 },
            EffectRequest::Teleport { actor, destination } => EffectBody::Teleport {
                actor_id: actor.0,
                destination: DestinationDto::from(destination),
            },
            EffectRequest::SetGodMode { actor, enabled } => EffectBody::SetGodMode {
                actor_id: actor.0,
                enabled: *enabled,
            },
            EffectRequest::Damage { actor, amount } => EffectBody::Damage {
                actor_id: actor.0,
                amount: *amount,
            },
            EffectRequest::QueryBalance { actor } => EffectBody::QueryBalance { actor_id: actor.0 },
            EffectRequest::QueryStats { actor } => EffectBody::QueryStats { actor_id: actor.0 },
            EffectRequest::AdjustBalance { actor, delta } => EffectBody::AdjustBalance {
                actor_id: actor.0,
                delta: *delta,
            },
            EffectRequest::ResetProgression { actor } => {
                EffectBody::ResetProgression { actor_id: actor.0 }
            }
            EffectRequest::GrantXp { actor, amount } => EffectBody::GrantXp {
                actor_id: actor.0,
                amount: *amount,
            },
            EffectRequest::ForgeAll { actor } => EffectBody::ForgeAll { actor_id: actor.0 },
        }
    }
}
