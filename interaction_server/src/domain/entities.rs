// Domain-level snapshot types polled from the live session.

use crate::domain::geometry::Vec3;
use std::fmt;

/// Stable session identifier for a connected actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle identifying one physical item instance; used to destroy it and to
/// correlate charges with the item that carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeldItem {
    pub name: String,
    pub id: ItemId,
}

impl HeldItem {
    pub fn new(name: impl Into<String>, id: ItemId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    // Item names in the session carry prefixes/suffixes, so matching is by fragment.
    pub fn matches(&self, fragment: &str) -> bool {
        self.name.to_lowercase().contains(&fragment.to_lowercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub left: Option<HeldItem>,
    pub right: Option<HeldItem>,
}

impl Inventory {
    pub fn left_matches(&self, fragment: &str) -> bool {
        self.left.as_ref().is_some_and(|i| i.matches(fragment))
    }

    pub fn right_matches(&self, fragment: &str) -> bool {
        self.right.as_ref().is_some_and(|i| i.matches(fragment))
    }

    pub fn holds(&self, fragment: &str) -> bool {
        self.left_matches(fragment) || self.right_matches(fragment)
    }

    /// True when one hand holds `a` and the other holds `b`.
    pub fn holds_pair(&self, a: &str, b: &str) -> bool {
        (self.left_matches(a) && self.right_matches(b))
            || (self.right_matches(a) && self.left_matches(b))
    }

    /// Items in either hand matching the fragment, left hand first.
    pub fn matching(&self, fragment: &str) -> Vec<&HeldItem> {
        self.hands().filter(|i| i.matches(fragment)).collect()
    }

    pub fn hands(&self) -> impl Iterator<Item = &HeldItem> {
        self.left.iter().chain(self.right.iter())
    }
}

/// One actor's pose as reported by a single poll. Every field may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub position: Option<Vec3>,
    pub head: Option<Vec3>,
    pub left_hand: Option<Vec3>,
    pub right_hand: Option<Vec3>,
    pub left_hand_up: Option<Vec3>,
    pub right_hand_up: Option<Vec3>,
    pub left_hand_forward: Option<Vec3>,
    pub right_hand_forward: Option<Vec3>,
    // Some sessions report held items inline; otherwise it is fetched on demand.
    pub inventory: Option<Inventory>,
}

impl ActorSnapshot {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position: None,
            head: None,
            left_hand: None,
            right_hand: None,
            left_hand_up: None,
            right_hand_up: None,
            left_hand_forward: None,
            right_hand_forward: None,
            inventory: None,
        }
    }

    /// Best available body position (reported position, else head).
    pub fn body_position(&self) -> Option<Vec3> {
        self.position.or(self.head)
    }

    pub fn has_both_hands(&self) -> bool {
        self.left_hand.is_some() && self.right_hand.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Pickup,
    Drop,
    Other,
}

/// Inventory notification observed by the session since the previous drain.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryChange {
    pub actor: ActorId,
    pub actor_name: String,
    pub kind: ChangeKind,
    pub item: Option<HeldItem>,
    // Hands after the change, when the session includes them.
    pub inventory: Option<Inventory>,
}
