use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::effects::{EffectOutcome, EffectRequest, StatValue};
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::errors::SessionError;
use crate::domain::geometry::{Vec3, normalize};
use crate::domain::machines::{ButtonEvent, ButtonReach, step_button};
use crate::domain::tuning::SocialTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::features::roster_button::eligible;
use crate::use_cases::scheduler::Feature;

const NAME: &str = "social_button";

#[derive(Debug, Default, PartialEq)]
pub struct SocialPlan {
    pub effects: Vec<EffectRequest>,
    // Pressed buttons; stats are fetched after the world lock is released.
    pub presses: Vec<(ActorId, String)>,
}

// Just past the left hand, continuing the line from the head.
fn drop_point(head: Vec3, left: Vec3, offset: f32) -> Vec3 {
    match normalize(left - head) {
        Some(dir) => left + dir * offset,
        None => left,
    }
}

fn stat(stats: &[StatValue], name: &str) -> f32 {
    stats
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .map_or(0.0, |s| s.value)
}

/// Stats card for a pressed button; `None` when the session reported no stats.
pub fn stats_message(actor: ActorId, name: &str, stats: &[StatValue]) -> Option<EffectRequest> {
    if stats.is_empty() {
        return None;
    }
    Some(EffectRequest::message(
        actor,
        format!(
            "{name}\nHP: {}\nHunger: {}\nSpeed: {}",
            stat(stats, "health"),
            stat(stats, "hunger"),
            stat(stats, "speed")
        ),
        3,
    ))
}

pub fn plan_social_buttons(
    world: &mut WorldState,
    tuning: &SocialTuning,
    actors: &[ActorSnapshot],
    inventories: &HashMap<ActorId, Inventory>,
    now: u64,
) -> SocialPlan {
    let mut plan = SocialPlan::default();
    let reach = ButtonReach {
        press: tuning.press_distance,
        release: tuning.release_distance,
    };

    for actor in actors.iter().filter(|a| eligible(a)) {
        let (Some(head), Some(left), Some(right)) = (actor.head, actor.left_hand, actor.right_hand)
        else {
            continue;
        };
        let Some(inventory) = inventories.get(&actor.id) else {
            continue;
        };

        let mut slot = world.social.get(&actor.id).copied();
        let event = step_button(
            &mut slot,
            inventory.holds(&tuning.item),
            (left, right),
            drop_point(head, left, tuning.offset),
            tuning.lifetime_ms,
            reach,
            now,
        );
        match slot {
            Some(button) => world.social.insert(actor.id, button),
            None => world.social.remove(&actor.id),
        };

        match event {
            Some(ButtonEvent::Placed) => {
                plan.effects
                    .push(EffectRequest::message(actor.id, "Social button created!", 2));
                info!(actor_id = actor.id.0, "social button placed");
            }
            Some(ButtonEvent::Expired) => debug!(actor_id = actor.id.0, "social button expired"),
            Some(ButtonEvent::Pressed) => plan.presses.push((actor.id, actor.name.clone())),
            None => {}
        }
    }

    plan
}

pub struct SocialButtonFeature;

#[async_trait]
impl Feature for SocialButtonFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let wanted: Vec<&ActorSnapshot> = actors.iter().filter(|a| eligible(a)).collect();
        let inventories = ctx.inventories(wanted).await;
        let now = ctx.now();

        let plan = {
            let mut world = ctx.world.lock().await;
            plan_social_buttons(&mut world, &ctx.tuning.social, &actors, &inventories, now)
        };
        ctx.dispatch_all(NAME, plan.effects).await;

        for (actor, name) in plan.presses {
            let Some(EffectOutcome::Stats(stats)) =
                ctx.dispatch(NAME, &EffectRequest::QueryStats { actor }).await
            else {
                debug!(actor_id = actor.0, "social button pressed without stats");
                continue;
            };
            if let Some(message) = stats_message(actor, &name, &stats) {
                ctx.dispatch(NAME, &message).await;
            }
        }
        Ok(())
    }
}
