//! Gameplay tuning for items consumed by bringing them to the face.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DrinkingTuning {
    pub potion_item: String,
    pub taper_item: String,
    /// Hand-to-head distance that counts as drinking.
    pub mouth_distance: f32,
    pub drink_cooldown_ms: u64,
    /// Drink count that kills and resets.
    pub lethal_drinks: u32,
    pub lethal_speed_penalty: f32,
    pub lethal_penalty_secs: u32,

    pub addiction_interval_ms: u64,
    /// Warning is sent this long before withdrawal starts.
    pub addiction_warning_ms: u64,
    pub withdrawal_tick_ms: u64,
    pub withdrawal_damage: f32,
}

impl Default for DrinkingTuning {
    fn default() -> Self {
        Self {
            potion_item: "potion medium".to_string(),
            taper_item: "handle short taper".to_string(),
            mouth_distance: 0.5,
            drink_cooldown_ms: 3_000,
            lethal_drinks: 10,
            lethal_speed_penalty: -8.0,
            lethal_penalty_secs: 1_200,
            addiction_interval_ms: 3 * 60 * 1000,
            addiction_warning_ms: 30_000,
            withdrawal_tick_ms: 5_000,
            withdrawal_damage: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StarlightTuning {
    pub item: String,
    /// How far above the head a hand must be raised.
    pub raise_margin: f32,
    pub target_distance: f32,
    pub pulse_interval_ms: u64,
    /// Once started, pulsing cannot be stopped for this long.
    pub lock_ms: u64,
    pub xp_grant: u32,
    pub luminosity: f32,
    pub luminosity_secs: u32,
}

impl Default for StarlightTuning {
    fn default() -> Self {
        Self {
            item: "handle large cool".to_string(),
            raise_margin: 0.2,
            target_distance: 0.5,
            pulse_interval_ms: 1_000,
            lock_ms: 5_000,
            xp_grant: 9_999,
            luminosity: 50.0,
            luminosity_secs: 10,
        }
    }
}
