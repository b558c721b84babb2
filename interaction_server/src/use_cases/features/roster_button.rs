use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::effects::EffectRequest;
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::errors::SessionError;
use crate::domain::machines::{ButtonEvent, ButtonReach, step_button};
use crate::domain::tuning::RosterTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "roster_button";

pub(crate) fn eligible(actor: &ActorSnapshot) -> bool {
    actor.head.is_some() && actor.has_both_hands()
}

fn roster_text(actors: &[ActorSnapshot]) -> String {
    let names: Vec<&str> = actors
        .iter()
        .map(|a| a.name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    format!("Online: {}", names.join(", "))
}

pub fn plan_roster_buttons(
    world: &mut WorldState,
    tuning: &RosterTuning,
    actors: &[ActorSnapshot],
    inventories: &HashMap<ActorId, Inventory>,
    now: u64,
) -> Vec<EffectRequest> {
    let mut effects = Vec::new();
    let reach = ButtonReach {
        press: tuning.press_distance,
        release: tuning.release_distance,
    };

    for actor in actors.iter().filter(|a| eligible(a)) {
        let (Some(left), Some(right)) = (actor.left_hand, actor.right_hand) else {
            continue;
        };
        let Some(inventory) = inventories.get(&actor.id) else {
            continue;
        };

        let mut slot = world.roster.get(&actor.id).copied();
        let event = step_button(
            &mut slot,
            inventory.holds(&tuning.item),
            (left, right),
            left,
            tuning.lifetime_ms,
            reach,
            now,
        );
        match slot {
            Some(button) => world.roster.insert(actor.id, button),
            None => world.roster.remove(&actor.id),
        };

        match event {
            Some(ButtonEvent::Placed) => {
                effects.push(EffectRequest::message(actor.id, "Roster button created!", 2));
                info!(actor_id = actor.id.0, "roster button placed");
            }
            Some(ButtonEvent::Expired) => debug!(actor_id = actor.id.0, "roster button expired"),
            Some(ButtonEvent::Pressed) => {
                effects.push(EffectRequest::message(actor.id, roster_text(actors), 2));
            }
            None => {}
        }
    }

    effects
}

pub struct RosterButtonFeature;

#[async_trait]
impl Feature for RosterButtonFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let wanted: Vec<&ActorSnapshot> = actors.iter().filter(|a| eligible(a)).collect();
        let inventories = ctx.inventories(wanted).await;
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            plan_roster_buttons(&mut world, &ctx.tuning.roster, &actors, &inventories, now)
        };
        ctx.dispatch_all(NAME, effects).await;
        Ok(())
    }
}
