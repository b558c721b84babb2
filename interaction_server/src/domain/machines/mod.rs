// Explicit state machines shared across feature loops.

pub mod charge;
pub mod combat;
pub mod confirmation;
pub mod cooldown;
pub mod item_button;

pub use charge::{ArmedCharge, ChargeBook, ChargeKind, ChargeState};
pub use combat::{CombatLedger, PairKey};
pub use confirmation::{ConfirmationFlow, RequestOutcome};
pub use cooldown::{CooldownKey, CooldownRegistry};
pub use item_button::{ButtonEvent, ButtonReach, ItemButton, step_button};
