// Domain layer: pose model, interaction rules, and the state machines behind them.

pub mod effects;
pub mod entities;
pub mod errors;
pub mod geometry;
pub mod machines;
pub mod ports;
pub mod systems;
pub mod tuning;

pub use effects::{EffectOutcome, EffectRequest, MessageTarget, StatValue, TeleportDestination};
pub use entities::{ActorId, ActorSnapshot, ChangeKind, HeldItem, Inventory, InventoryChange, ItemId};
pub use errors::SessionError;
pub use geometry::Vec3;
pub use tuning::Tuning;
