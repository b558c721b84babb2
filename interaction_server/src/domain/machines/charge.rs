use std::collections::HashMap;

use crate::domain::entities::{ActorId, Inventory, ItemId};

/// Special projectile charges. Each is armed by holding the ammo item together with
/// its catalyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeKind {
    Speed,
    Kill,
    Dark,
    Teleport,
}

impl ChargeKind {
    // Consumption checks kinds in this order; the first match wins.
    pub const ALL: [ChargeKind; 4] = [
        ChargeKind::Speed,
        ChargeKind::Kill,
        ChargeKind::Dark,
        ChargeKind::Teleport,
    ];

    pub fn catalyst(&self) -> &'static str {
        match self {
            Self::Speed => "mythril ingot",
            Self::Kill => "orchi ingot",
            Self::Dark => "iron ingot",
            Self::Teleport => "stone",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Kill => "kill",
            Self::Dark => "dark",
            Self::Teleport => "teleport",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeState {
    #[default]
    Idle,
    Charged {
        item: ItemId,
    },
}

/// A charge that was just armed, with the catalyst items that must be destroyed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedCharge {
    pub kind: ChargeKind,
    pub vehicle: ItemId,
    pub spent_catalysts: Vec<ItemId>,
}

/// One charge slot per (actor, kind). At most one pending charge of a kind per actor.
#[derive(Debug, Clone, Default)]
pub struct ChargeBook {
    slots: HashMap<(ActorId, ChargeKind), ChargeState>,
}

impl ChargeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, actor: ActorId, kind: ChargeKind) -> ChargeState {
        self.slots.get(&(actor, kind)).copied().unwrap_or_default()
    }

    /// `Idle -> Charged` for every idle kind whose catalyst is held opposite the ammo.
    /// Several kinds may arm on the same inventory; they are independent slots.
    pub fn arm(&mut self, actor: ActorId, inventory: &Inventory, ammo: &str) -> Vec<ArmedCharge> {
        let mut armed = Vec::new();

        for kind in ChargeKind::ALL {
            if self.state(actor, kind) != ChargeState::Idle {
                continue;
            }
            if !inventory.holds_pair(ammo, kind.catalyst()) {
                continue;
            }

            // Left hand wins when both hands match the ammo fragment.
            let vehicle = if inventory.left_matches(ammo) {
                inventory.left.as_ref()
            } else {
                inventory.right.as_ref()
            };
            let Some(vehicle) = vehicle.map(|i| i.id) else {
                continue;
            };

            let spent_catalysts = inventory
                .matching(kind.catalyst())
                .into_iter()
                .map(|i| i.id)
                .filter(|id| *id != vehicle)
                .collect();

            self.slots
                .insert((actor, kind), ChargeState::Charged { item: vehicle });
            armed.push(ArmedCharge {
                kind,
                vehicle,
                spent_catalysts,
            });
        }

        armed
    }

    /// `Charged -> Idle` for the first kind carried by `released`.
    pub fn consume(&mut self, actor: ActorId, released: ItemId) -> Option<ChargeKind> {
        let kind = ChargeKind::ALL
            .into_iter()
            .find(|kind| self.state(actor, *kind) == ChargeState::Charged { item: released })?;
        self.slots.remove(&(actor, kind));
        Some(kind)
    }

    /// Drops every slot whose owner fails `keep`.
    pub fn retain_actors(&mut self, mut keep: impl FnMut(ActorId) -> bool) {
        self.slots.retain(|(owner, _), _| keep(*owner));
    }
}
