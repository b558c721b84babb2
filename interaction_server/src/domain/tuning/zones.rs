//! Fixed world anchors and zone bounds.

use serde::Deserialize;

use crate::domain::geometry::Vec3;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TavernTuning {
    pub corners: Vec<Vec3>,
    pub floor: f32,
    pub ceiling: f32,

    pub close_button: Vec3,
    pub ban_button: Vec3,
    pub list_button: Vec3,
    pub press_distance: f32,

    /// Hands closer than this confirm a pending close/open.
    pub hands_together: f32,
    /// Hand-to-head distance that selects a ban target.
    pub face_touch: f32,

    pub toggle_window_ms: u64,
    pub toggle_cooldown_ms: u64,
    pub ban_window_ms: u64,
    pub ban_cooldown_ms: u64,
    pub list_cooldown_ms: u64,
    /// Minimum time between closing and reopening.
    pub reopen_lockout_ms: u64,
}

impl Default for TavernTuning {
    fn default() -> Self {
        Self {
            corners: vec![
                Vec3::new(-820.584, 134.652, 3.898),
                Vec3::new(-790.43, 134.652, 4.882),
                Vec3::new(-793.383, 134.733, -14.699),
                Vec3::new(-819.877, 134.652, -14.598),
            ],
            floor: 134.0,
            ceiling: 140.0,
            close_button: Vec3::new(-807.279, 136.640, -9.040),
            ban_button: Vec3::new(-807.264, 136.654, -7.299),
            list_button: Vec3::new(-807.243, 136.662, -5.753),
            press_distance: 0.3,
            hands_together: 0.2,
            face_touch: 0.3,
            toggle_window_ms: 5_000,
            toggle_cooldown_ms: 1_000,
            ban_window_ms: 10_000,
            ban_cooldown_ms: 1_000,
            list_cooldown_ms: 2_000,
            reopen_lockout_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoneTeleportTuning {
    pub anchor: Vec3,
    pub item: String,
    pub activation_distance: f32,
    pub cooldown_ms: u64,
    pub speed_boost: f32,
    pub boost_secs: u32,
}

impl Default for StoneTeleportTuning {
    fn default() -> Self {
        Self {
            anchor: Vec3::new(-615.053, 186.534, 356.524),
            item: "stone".to_string(),
            activation_distance: 0.5,
            cooldown_ms: 2_000,
            speed_boost: 3.0,
            boost_secs: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForgeTuning {
    pub anchor: Vec3,
    pub activation_distance: f32,
    pub hands_together: f32,
    pub cost: i64,
    pub window_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for ForgeTuning {
    fn default() -> Self {
        Self {
            anchor: Vec3::new(-729.072, 134.315, 14.287),
            activation_distance: 0.3,
            hands_together: 0.2,
            cost: 50,
            window_ms: 10_000,
            cooldown_ms: 1_000,
        }
    }
}
