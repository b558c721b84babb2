use crate::domain::geometry::{Vec3, distance3d};

/// Personal button left behind where a carried item was let go.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemButton {
    Holding,
    Placed {
        anchor: Vec3,
        expires_at: u64,
        // Re-armed once both hands move away; a press disarms it.
        armed: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonReach {
    /// A hand strictly closer than this presses.
    pub press: f32,
    /// Both hands strictly farther than this re-arm.
    pub release: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Placed,
    Expired,
    Pressed,
}

/// Advances one actor's button by a poll. `slot` is the actor's entry, `None` when
/// nothing is tracked; `drop_at` is where a fresh button would go.
pub fn step_button(
    slot: &mut Option<ItemButton>,
    holding: bool,
    (left, right): (Vec3, Vec3),
    drop_at: Vec3,
    lifetime_ms: u64,
    reach: ButtonReach,
    now: u64,
) -> Option<ButtonEvent> {
    if holding {
        *slot = Some(ItemButton::Holding);
        return None;
    }

    let mut event = None;
    if *slot == Some(ItemButton::Holding) {
        *slot = Some(ItemButton::Placed {
            anchor: drop_at,
            expires_at: now + lifetime_ms,
            armed: false,
        });
        event = Some(ButtonEvent::Placed);
    }

    let Some(ItemButton::Placed {
        anchor,
        expires_at,
        armed,
    }) = slot.as_mut()
    else {
        return event;
    };
    if now > *expires_at {
        *slot = None;
        return Some(ButtonEvent::Expired);
    }

    let left_dist = distance3d(Some(left), Some(*anchor));
    let right_dist = distance3d(Some(right), Some(*anchor));
    if left_dist > reach.release && right_dist > reach.release {
        *armed = true;
    }
    if *armed && (left_dist < reach.press || right_dist < reach.press) {
        *armed = false;
        return Some(ButtonEvent::Pressed);
    }

    event
}
