//! Gameplay tuning for projectiles.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Launch speed in units per second.
    pub speed: f32,

    /// Downward acceleration applied to the vertical axis only.
    pub gravity: f32,

    /// Distance from any target hit point that counts as a hit. Deliberately
    /// generous because positions are only sampled every poll.
    pub hit_radius: f32,

    /// Lifetime in milliseconds before an unresolved projectile expires.
    pub life_time_ms: u64,

    /// Item name fragment whose release fires a projectile.
    pub ammo_item: String,

    /// Item that must be held in the left hand to shoot.
    pub launcher_item: String,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 20.0,
            gravity: 9.8,
            hit_radius: 5.0,
            life_time_ms: 20_000,
            ammo_item: "arrow".to_string(),
            launcher_item: "bow".to_string(),
        }
    }
}
