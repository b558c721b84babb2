// Gameplay tuning. Keep this separate from runtime configuration (bridge URL, ports).
// Deserialize lets an optional TOML file override any subset of the defaults.

pub mod combat;
pub mod consumables;
pub mod gesture;
pub mod projectile;
pub mod zones;

use serde::Deserialize;

pub use combat::CombatTuning;
pub use consumables::{DrinkingTuning, StarlightTuning};
pub use gesture::{GestureTuning, RosterTuning, SocialTuning};
pub use projectile::ProjectileTuning;
pub use zones::{ForgeTuning, StoneTeleportTuning, TavernTuning};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub projectile: ProjectileTuning,
    pub combat: CombatTuning,
    pub gesture: GestureTuning,
    pub roster: RosterTuning,
    pub social: SocialTuning,
    pub tavern: TavernTuning,
    pub stone_teleport: StoneTeleportTuning,
    pub forge: ForgeTuning,
    pub drinking: DrinkingTuning,
    pub starlight: StarlightTuning,
}

impl Tuning {
    /// Widest window kept in the shared per-actor cooldown registry.
    pub fn longest_cooldown_ms(&self) -> u64 {
        [
            self.gesture.cooldown_ms,
            self.drinking.drink_cooldown_ms,
            self.stone_teleport.cooldown_ms,
            self.tavern.list_cooldown_ms,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }
}
