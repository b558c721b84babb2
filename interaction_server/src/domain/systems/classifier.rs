// Turns raw pose snapshots into discrete interactions.
// Every predicate answers "no interaction" when a pose field it needs is absent.

use crate::domain::entities::ActorSnapshot;
use crate::domain::geometry::{HandOrientation, Hitbox, Vec3, distance3d, hand_orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandGesture {
    Replace,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceGesture {
    Toggle,
    Damage,
    Speed,
    Hunger,
    GodMode,
}

impl FaceGesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Damage => "damage",
            Self::Speed => "speed",
            Self::Hunger => "hunger",
            Self::GodMode => "god_mode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

fn orientation(up: Option<Vec3>) -> Option<HandOrientation> {
    up.map(hand_orientation)
}

/// Hands held together with one palm up and the other down.
pub fn classify_hand_gesture(actor: &ActorSnapshot, threshold: f32) -> Option<HandGesture> {
    if distance3d(actor.left_hand, actor.right_hand) > threshold {
        return None;
    }

    let left = orientation(actor.left_hand_up)?;
    let right = orientation(actor.right_hand_up)?;

    match (left, right) {
        (HandOrientation::Up, HandOrientation::Down) => Some(HandGesture::Replace),
        (HandOrientation::Down, HandOrientation::Up) => Some(HandGesture::Delete),
        _ => None,
    }
}

/// Hand-to-own-head gestures. Earlier arms take priority over later ones.
pub fn classify_face_gesture(actor: &ActorSnapshot, threshold: f32) -> Option<FaceGesture> {
    let left_near = distance3d(actor.left_hand, actor.head) <= threshold;
    let right_near = distance3d(actor.right_hand, actor.head) <= threshold;
    let left = orientation(actor.left_hand_up);
    let right = orientation(actor.right_hand_up);

    if left_near && right_near {
        return Some(FaceGesture::Toggle);
    }
    if right_near && right == Some(HandOrientation::Down) {
        return Some(FaceGesture::Damage);
    }
    if left_near && left == Some(HandOrientation::Down) {
        return Some(FaceGesture::Speed);
    }
    if right_near && right == Some(HandOrientation::Up) {
        return Some(FaceGesture::Hunger);
    }
    if left_near && left == Some(HandOrientation::Up) {
        return Some(FaceGesture::GodMode);
    }
    None
}

/// First hand (left checked first) strictly within `radius` of `anchor`.
pub fn hand_near(actor: &ActorSnapshot, anchor: Vec3, radius: f32) -> Option<Hand> {
    if distance3d(actor.left_hand, Some(anchor)) < radius {
        Some(Hand::Left)
    } else if distance3d(actor.right_hand, Some(anchor)) < radius {
        Some(Hand::Right)
    } else {
        None
    }
}

pub fn button_pressed(actor: &ActorSnapshot, anchor: Vec3, radius: f32) -> bool {
    hand_near(actor, anchor, radius).is_some()
}

pub fn hands_together(actor: &ActorSnapshot, threshold: f32) -> bool {
    distance3d(actor.left_hand, actor.right_hand) < threshold
}

/// Either of `toucher`'s hands strictly within `threshold` of `target`'s head.
pub fn touching_face(toucher: &ActorSnapshot, target: &ActorSnapshot, threshold: f32) -> bool {
    distance3d(toucher.left_hand, target.head) < threshold
        || distance3d(toucher.right_hand, target.head) < threshold
}

/// Both actors touch each other's head in the same snapshot.
pub fn mutual_touch(a: &ActorSnapshot, b: &ActorSnapshot, threshold: f32) -> bool {
    a.id != b.id && touching_face(a, b, threshold) && touching_face(b, a, threshold)
}

/// Index pairs `(i, j)` with `i < j` whose actors are in mutual touch.
pub fn mutual_touch_pairs(actors: &[ActorSnapshot], threshold: f32) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..actors.len() {
        for j in (i + 1)..actors.len() {
            if mutual_touch(&actors[i], &actors[j], threshold) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// First hitbox the hand reaches, allowing `reach` beyond the hitbox radius.
pub fn limb_contact<'a>(hand: Option<Vec3>, hitboxes: &'a [Hitbox], reach: f32) -> Option<&'a Hitbox> {
    let hand = hand?;
    hitboxes
        .iter()
        .find(|h| hand.distance(h.center) <= h.radius + reach)
}

/// A hand at least `margin` above the head; returns which one (right checked first).
pub fn hand_raised_above_head(actor: &ActorSnapshot, margin: f32) -> Option<Hand> {
    let head = actor.head?;
    let raised = |hand: Option<Vec3>| hand.is_some_and(|h| h.y > head.y + margin);

    if raised(actor.right_hand) {
        Some(Hand::Right)
    } else if raised(actor.left_hand) {
        Some(Hand::Left)
    } else {
        None
    }
}
