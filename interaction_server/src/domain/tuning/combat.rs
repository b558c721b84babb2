//! Gameplay tuning for consensual melee combat.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Hand-to-head distance for the mutual-touch consent gesture.
    pub consent_distance: f32,

    /// How long an agreement lasts once opened.
    pub agreement_ms: u64,

    /// Extra reach added to a limb's hitbox radius.
    pub punch_reach: f32,

    /// Minimum time between hits from one attacker on one target.
    pub hit_cooldown_ms: u64,

    pub hit_damage: f32,

    /// Knockback distance along the attacking hand's forward vector.
    pub knockback: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            consent_distance: 0.3,
            agreement_ms: 10 * 60 * 1000,
            punch_reach: 0.1,
            hit_cooldown_ms: 150,
            hit_damage: 0.001,
            knockback: 0.5,
        }
    }
}
