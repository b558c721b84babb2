use std::collections::HashSet;

use async_trait::async_trait;
use tracing::info;

use crate::domain::effects::EffectRequest;
use crate::domain::entities::{ActorId, ActorSnapshot};
use crate::domain::errors::SessionError;
use crate::domain::geometry::{Vec3, is_inside_box};
use crate::domain::machines::{ConfirmationFlow, CooldownKey, RequestOutcome};
use crate::domain::ports::AccessPolicy;
use crate::domain::systems::classifier::{button_pressed, hands_together, touching_face};
use crate::domain::tuning::TavernTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "tavern";

/// Open/closed flag, the in-memory denylist and the two-phase button flows.
#[derive(Debug)]
pub struct TavernState {
    pub closed: bool,
    pub closed_at: Option<u64>,
    // Display names; lost on restart.
    pub denylist: HashSet<String>,
    toggle: ConfirmationFlow<()>,
    ban: ConfirmationFlow<()>,
}

impl TavernState {
    pub fn new(tuning: &TavernTuning) -> Self {
        Self {
            closed: false,
            closed_at: None,
            denylist: HashSet::new(),
            toggle: ConfirmationFlow::new(tuning.toggle_window_ms, tuning.toggle_cooldown_ms),
            ban: ConfirmationFlow::new(tuning.ban_window_ms, tuning.ban_cooldown_ms),
        }
    }

    pub fn retain_owners(&mut self, mut keep: impl FnMut(ActorId) -> bool) {
        self.toggle.retain_actors(&mut keep);
        self.ban.retain_actors(&mut keep);
    }
}

struct Zone<'a> {
    tuning: &'a TavernTuning,
}

impl Zone<'_> {
    fn contains(&self, point: Option<Vec3>) -> bool {
        is_inside_box(point, &self.tuning.corners, self.tuning.floor, self.tuning.ceiling)
    }

    fn body_inside(&self, actor: &ActorSnapshot) -> bool {
        self.contains(actor.body_position())
    }

    fn any_part_inside(&self, actor: &ActorSnapshot) -> bool {
        [actor.body_position(), actor.head, actor.left_hand, actor.right_hand]
            .into_iter()
            .any(|p| self.contains(p))
    }
}

pub fn plan_tavern(
    world: &mut WorldState,
    tuning: &TavernTuning,
    access: &dyn AccessPolicy,
    actors: &[ActorSnapshot],
    now: u64,
) -> Vec<EffectRequest> {
    let zone = Zone { tuning };
    let mut effects = Vec::new();
    let mut ejected: HashSet<ActorId> = HashSet::new();

    for actor in actors {
        if !access.allows(&actor.name) || actor.body_position().is_none() || !actor.has_both_hands() {
            continue;
        }

        if button_pressed(actor, tuning.close_button, tuning.press_distance) {
            press_toggle(world, &zone, actor, actors, now, &mut effects, &mut ejected);
        }

        if button_pressed(actor, tuning.ban_button, tuning.press_distance)
            && world.tavern.ban.request(actor.id, (), now) == RequestOutcome::Opened
        {
            effects.push(EffectRequest::message(
                actor.id,
                "BAN MODE: Touch someone's face to ban/unban them!",
                5,
            ));
            info!(actor_id = actor.id.0, "tavern ban mode opened");
        }

        if world.tavern.ban.pending_kind(actor.id, now).is_some() {
            let target = actors
                .iter()
                .find(|t| t.id != actor.id && touching_face(actor, t, tuning.face_touch));
            if let Some(target) = target
                && world.tavern.ban.confirm(actor.id, true, now).is_some()
            {
                toggle_ban(world, &zone, actor, target, &mut effects, &mut ejected);
            }
        }

        if button_pressed(actor, tuning.list_button, tuning.press_distance)
            && world
                .cooldowns
                .try_fire(CooldownKey::TavernList(actor.id), now, tuning.list_cooldown_ms)
        {
            let occupants: Vec<&str> = actors
                .iter()
                .filter(|a| zone.body_inside(a))
                .map(|a| a.name.as_str())
                .collect();
            let text = if occupants.is_empty() {
                "Tavern is empty".to_string()
            } else {
                format!("In tavern: {}", occupants.join(", "))
            };
            effects.push(EffectRequest::message(actor.id, text, 6));
        }
    }

    world.tavern.toggle.sweep_expired(now);
    for (actor, ()) in world.tavern.ban.sweep_expired(now) {
        effects.push(EffectRequest::message(actor, "Ban mode expired", 2));
    }

    for actor in actors {
        if ejected.contains(&actor.id) || !zone.any_part_inside(actor) {
            continue;
        }

        // Denylist wins over authorization.
        if world.tavern.denylist.contains(&actor.name) {
            effects.push(EffectRequest::eject(actor.id));
            effects.push(EffectRequest::message(actor.id, "You're banned from the tavern!", 3));
            info!(actor_id = actor.id.0, "denylisted actor ejected");
        } else if world.tavern.closed && !access.allows(&actor.name) {
            effects.push(EffectRequest::eject(actor.id));
            effects.push(EffectRequest::message(actor.id, "Tavern is closed!", 3));
            info!(actor_id = actor.id.0, "actor ejected from closed tavern");
        }
    }

    effects
}

fn press_toggle(
    world: &mut WorldState,
    zone: &Zone<'_>,
    actor: &ActorSnapshot,
    actors: &[ActorSnapshot],
    now: u64,
    effects: &mut Vec<EffectRequest>,
    ejected: &mut HashSet<ActorId>,
) {
    let tuning = zone.tuning;
    let tavern = &mut world.tavern;

    if tavern.toggle.pending_kind(actor.id, now).is_none() {
        if tavern.toggle.request(actor.id, (), now) == RequestOutcome::Opened {
            let action = if tavern.closed { "OPEN" } else { "CLOSE" };
            effects.push(EffectRequest::message(
                actor.id,
                format!("Put hands together to confirm {action}"),
                3,
            ));
        }
        return;
    }

    let together = hands_together(actor, tuning.hands_together);
    if tavern.toggle.confirm(actor.id, together, now).is_none() {
        return;
    }

    if !tavern.closed {
        tavern.closed = true;
        tavern.closed_at = Some(now);

        let mut count = 0;
        for other in actors {
            if other.id == actor.id || !zone.body_inside(other) {
                continue;
            }
            effects.push(EffectRequest::eject(other.id));
            effects.push(EffectRequest::message(other.id, "Tavern is now closed!", 5));
            ejected.insert(other.id);
            count += 1;
        }
        effects.push(EffectRequest::message(
            actor.id,
            format!("Tavern closed! Ejected {count} actors."),
            5,
        ));
        info!(actor_id = actor.id.0, ejected = count, "tavern closed");
        return;
    }

    let since = now.saturating_sub(tavern.closed_at.unwrap_or(0));
    if since < tuning.reopen_lockout_ms {
        let remaining = (tuning.reopen_lockout_ms - since).div_ceil(1000);
        effects.push(EffectRequest::message(
            actor.id,
            format!("Must wait {remaining}s to reopen!"),
            3,
        ));
        return;
    }

    tavern.closed = false;
    effects.push(EffectRequest::message(actor.id, "Tavern opened!", 5));
    info!(actor_id = actor.id.0, "tavern opened");
}

fn toggle_ban(
    world: &mut WorldState,
    zone: &Zone<'_>,
    actor: &ActorSnapshot,
    target: &ActorSnapshot,
    effects: &mut Vec<EffectRequest>,
    ejected: &mut HashSet<ActorId>,
) {
    let denylist = &mut world.tavern.denylist;

    if denylist.remove(&target.name) {
        effects.push(EffectRequest::message(actor.id, format!("Unbanned {}!", target.name), 5));
        effects.push(EffectRequest::message(
            target.id,
            "You've been unbanned from the tavern!",
            5,
        ));
        info!(actor_id = actor.id.0, target_id = target.id.0, "actor unbanned");
        return;
    }

    denylist.insert(target.name.clone());
    effects.push(EffectRequest::message(
        actor.id,
        format!("Banned {} from tavern!", target.name),
        5,
    ));
    effects.push(EffectRequest::message(
        target.id,
        "You've been banned from the tavern!",
        5,
    ));
    if zone.body_inside(target) {
        effects.push(EffectRequest::eject(target.id));
        ejected.insert(target.id);
    }
    info!(actor_id = actor.id.0, target_id = target.id.0, "actor banned");
}

pub struct TavernFeature;

#[async_trait]
impl Feature for TavernFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            plan_tavern(&mut world, &ctx.tuning.tavern, ctx.access.as_ref(), &actors, now)
        };
        ctx.dispatch_all(NAME, effects).await;
        Ok(())
    }
}
