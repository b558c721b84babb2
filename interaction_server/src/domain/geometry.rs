// Pure spatial helpers shared by every feature loop.
// Absent pose data is modelled as `None` and never treated as the origin.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use crate::domain::entities::ActorSnapshot;

/// World-space vector in session units (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Euclidean distance; `f32::INFINITY` when either side is missing so callers
/// can compare against a threshold without special-casing absent poses.
pub fn distance3d(a: Option<Vec3>, b: Option<Vec3>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => a.distance(b),
        _ => f32::INFINITY,
    }
}

/// Unit vector in the same direction, or `None` for a zero-length input.
pub fn normalize(v: Vec3) -> Option<Vec3> {
    let len = v.length();
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    Some(v * (1.0 / len))
}

/// Axis-aligned test against the X/Z extent of an arbitrary polygon plus a fixed
/// vertical band. Corners need not be ordered.
pub fn is_inside_box(point: Option<Vec3>, corners: &[Vec3], floor: f32, ceiling: f32) -> bool {
    let Some(p) = point else {
        return false;
    };
    if corners.is_empty() {
        return false;
    }

    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_z, mut max_z) = (f32::INFINITY, f32::NEG_INFINITY);
    for c in corners {
        min_x = min_x.min(c.x);
        max_x = max_x.max(c.x);
        min_z = min_z.min(c.z);
        max_z = max_z.max(c.z);
    }

    p.x >= min_x && p.x <= max_x && p.y >= floor && p.y <= ceiling && p.z >= min_z && p.z <= max_z
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Head,
    LeftHand,
    RightHand,
    Body,
}

impl BodyPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::LeftHand => "left_hand",
            Self::RightHand => "right_hand",
            Self::Body => "body",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub part: BodyPart,
    pub center: Vec3,
    pub radius: f32,
}

pub const HEAD_RADIUS: f32 = 0.15;
pub const HAND_RADIUS: f32 = 0.1;
pub const BODY_RADIUS: f32 = 0.25;
// Torso center is estimated this far below the reported head.
pub const BODY_DROP: f32 = 0.5;

/// Estimated torso center derived from the head pose.
pub fn body_center(head: Option<Vec3>) -> Option<Vec3> {
    head.map(|h| Vec3::new(h.x, h.y - BODY_DROP, h.z))
}

/// Collision spheres for one actor, derived fresh from a snapshot.
pub fn actor_hitboxes(actor: &ActorSnapshot) -> Vec<Hitbox> {
    let mut boxes = Vec::with_capacity(4);

    if let Some(head) = actor.head {
        boxes.push(Hitbox {
            part: BodyPart::Head,
            center: head,
            radius: HEAD_RADIUS,
        });
    }
    if let Some(left) = actor.left_hand {
        boxes.push(Hitbox {
            part: BodyPart::LeftHand,
            center: left,
            radius: HAND_RADIUS,
        });
    }
    if let Some(right) = actor.right_hand {
        boxes.push(Hitbox {
            part: BodyPart::RightHand,
            center: right,
            radius: HAND_RADIUS,
        });
    }
    if let Some(body) = body_center(actor.head) {
        boxes.push(Hitbox {
            part: BodyPart::Body,
            center: body,
            radius: BODY_RADIUS,
        });
    }

    boxes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOrientation {
    Down,
    Up,
    Sideways,
}

/// Classifies a hand by the vertical component of its "up" vector.
/// A palm facing the floor reports an up vector pointing to the sky, hence `Down`.
pub fn hand_orientation(up: Vec3) -> HandOrientation {
    if up.y > 0.5 {
        HandOrientation::Down
    } else if up.y < -0.5 {
        HandOrientation::Up
    } else {
        HandOrientation::Sideways
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ActorId;

    fn actor_with_head(head: Option<Vec3>) -> ActorSnapshot {
        ActorSnapshot {
            head,
            left_hand: Some(Vec3::new(1.0, 1.0, 0.0)),
            ..ActorSnapshot::new(ActorId(1), "Pilot")
        }
    }

    #[test]
    fn when_either_point_is_missing_then_distance_is_infinite() {
        assert!(distance3d(None, Some(Vec3::ZERO)).is_infinite());
        assert!(distance3d(Some(Vec3::ZERO), None).is_infinite());
        assert_eq!(
            distance3d(Some(Vec3::ZERO), Some(Vec3::new(3.0, 4.0, 0.0))),
            5.0
        );
    }

    #[test]
    fn when_vector_is_zero_then_normalize_returns_none() {
        assert_eq!(normalize(Vec3::ZERO), None);
        let unit = normalize(Vec3::new(0.0, 0.0, 4.0)).expect("non-zero vector");
        assert_eq!(unit, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn when_corners_are_unordered_then_box_test_uses_their_extent() {
        let corners = [
            Vec3::new(10.0, 0.0, -5.0),
            Vec3::new(-10.0, 0.0, 5.0),
            Vec3::new(-8.0, 0.0, -4.0),
            Vec3::new(9.0, 0.0, 4.0),
        ];

        assert!(is_inside_box(Some(Vec3::new(0.0, 1.0, 0.0)), &corners, 0.0, 2.0));
        assert!(!is_inside_box(Some(Vec3::new(0.0, 3.0, 0.0)), &corners, 0.0, 2.0));
        assert!(!is_inside_box(Some(Vec3::new(11.0, 1.0, 0.0)), &corners, 0.0, 2.0));
        assert!(!is_inside_box(None, &corners, 0.0, 2.0));
    }

    #[test]
    fn when_head_is_missing_then_head_and_body_hitboxes_are_omitted() {
        let boxes = actor_hitboxes(&actor_with_head(None));

        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].part, BodyPart::LeftHand);
    }

    #[test]
    fn when_head_is_present_then_body_sits_half_a_unit_below() {
        let boxes = actor_hitboxes(&actor_with_head(Some(Vec3::new(0.0, 2.0, 0.0))));
        let body = boxes
            .iter()
            .find(|b| b.part == BodyPart::Body)
            .expect("body hitbox");

        assert_eq!(body.center, Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(body.radius, BODY_RADIUS);
    }

    #[test]
    fn when_up_vector_is_classified_then_thresholds_match() {
        assert_eq!(hand_orientation(Vec3::new(0.0, 0.9, 0.0)), HandOrientation::Down);
        assert_eq!(hand_orientation(Vec3::new(0.0, -0.9, 0.0)), HandOrientation::Up);
        assert_eq!(hand_orientation(Vec3::new(0.9, 0.0, 0.0)), HandOrientation::Sideways);
        assert_eq!(hand_orientation(Vec3::new(0.0, 0.5, 0.0)), HandOrientation::Sideways);
    }
}
