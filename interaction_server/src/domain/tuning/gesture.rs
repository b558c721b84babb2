//! Gameplay tuning for self-targeted hand gestures.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GestureTuning {
    /// Hand-to-head distance for face gestures.
    pub face_distance: f32,

    /// Hand-to-hand distance for two-hand gestures.
    pub hands_distance: f32,

    pub cooldown_ms: u64,

    pub damage_boost: f32,
    pub speed_boost: f32,
    pub boost_secs: u32,
    pub hunger_value: f32,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            face_distance: 0.3,
            hands_distance: 0.15,
            cooldown_ms: 5_000,
            damage_boost: 99.0,
            speed_boost: 6.0,
            boost_secs: 500,
            hunger_value: 30.0,
        }
    }
}

/// Personal button dropped where a "friend" item is released.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RosterTuning {
    pub item: String,
    pub lifetime_ms: u64,
    pub press_distance: f32,
    /// Both hands must move this far away before the button re-arms.
    pub release_distance: f32,
}

impl Default for RosterTuning {
    fn default() -> Self {
        Self {
            item: "friend".to_string(),
            lifetime_ms: 300_000,
            press_distance: 0.3,
            release_distance: 0.5,
        }
    }
}

/// Button dropped beyond the left hand when a "social" item is released; a press
/// reports the actor's own stats.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialTuning {
    pub item: String,
    pub lifetime_ms: u64,
    /// Distance past the left hand, along the head-to-hand line.
    pub offset: f32,
    pub press_distance: f32,
    pub release_distance: f32,
}

impl Default for SocialTuning {
    fn default() -> Self {
        Self {
            item: "social".to_string(),
            lifetime_ms: 300_000,
            offset: 0.5,
            press_distance: 0.6,
            release_distance: 0.9,
        }
    }
}
