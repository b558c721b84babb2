use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use crate::domain::effects::EffectRequest;
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::errors::SessionError;
use crate::domain::machines::CooldownKey;
use crate::domain::systems::classifier::button_pressed;
use crate::domain::tuning::StoneTeleportTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "stone_teleport";

fn at_anchor(actor: &ActorSnapshot, tuning: &StoneTeleportTuning) -> bool {
    actor.has_both_hands() && button_pressed(actor, tuning.anchor, tuning.activation_distance)
}

pub fn plan_stone_teleport(
    world: &mut WorldState,
    tuning: &StoneTeleportTuning,
    actors: &[ActorSnapshot],
    inventories: &HashMap<ActorId, Inventory>,
    now: u64,
) -> Vec<EffectRequest> {
    let mut effects = Vec::new();

    for actor in actors.iter().filter(|a| at_anchor(a, tuning)) {
        let Some(inventory) = inventories.get(&actor.id) else {
            continue;
        };
        let stones = inventory.matching(&tuning.item);
        if stones.is_empty() {
            continue;
        }
        if !world
            .cooldowns
            .try_fire(CooldownKey::StoneTeleport(actor.id), now, tuning.cooldown_ms)
        {
            continue;
        }

        effects.extend(stones.iter().map(|s| EffectRequest::DestroyItem { item: s.id }));
        effects.push(EffectRequest::eject(actor.id));
        effects.push(EffectRequest::modify_stat(
            actor.id,
            "speed",
            tuning.speed_boost,
            tuning.boost_secs,
        ));
        effects.push(EffectRequest::message(actor.id, "Stone teleport activated!", 3));
        info!(actor_id = actor.id.0, "stone teleport activated");
    }

    effects
}

pub struct StoneTeleportFeature;

#[async_trait]
impl Feature for StoneTeleportFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let tuning = &ctx.tuning.stone_teleport;
        let actors = ctx.source.list_actors().await?;
        let wanted: Vec<&ActorSnapshot> = actors.iter().filter(|a| at_anchor(a, tuning)).collect();
        if wanted.is_empty() {
            return Ok(());
        }
        let inventories = ctx.inventories(wanted).await;
        if inventories.is_empty() {
            return Ok(());
        }
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            plan_stone_teleport(&mut world, tuning, &actors, &inventories, now)
        };
        ctx.dispatch_all(NAME, effects).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{HeldItem, ItemId};
    use crate::domain::geometry::Vec3;
    use crate::domain::tuning::Tuning;
    use crate::use_cases::test_support::actor_at;

    const ACTOR: ActorId = ActorId(1);

    fn touching_anchor(tuning: &StoneTeleportTuning) -> ActorSnapshot {
        let mut a = actor_at(1, "Walker", tuning.anchor + Vec3::new(0.0, 0.5, -0.5));
        a.right_hand = Some(tuning.anchor + Vec3::new(0.1, 0.0, 0.0));
        a
    }

    fn holding_stone() -> HashMap<ActorId, Inventory> {
        HashMap::from([(
            ACTOR,
            Inventory {
                left: None,
                right: Some(HeldItem::new("Stone", ItemId(9))),
            },
        )])
    }

    #[test]
    fn when_stone_touches_anchor_then_actor_is_sent_to_spawn_with_boost() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = [touching_anchor(&tuning.stone_teleport)];

        let effects = plan_stone_teleport(&mut world, &tuning.stone_teleport, &actors, &holding_stone(), 0);

        assert_eq!(
            effects,
            vec![
                EffectRequest::DestroyItem { item: ItemId(9) },
                EffectRequest::eject(ACTOR),
                EffectRequest::modify_stat(ACTOR, "speed", 3.0, 1_000),
                EffectRequest::message(ACTOR, "Stone teleport activated!", 3),
            ]
        );
    }

    #[test]
    fn when_activated_twice_within_cooldown_then_second_is_ignored() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = [touching_anchor(&tuning.stone_teleport)];

        plan_stone_teleport(&mut world, &tuning.stone_teleport, &actors, &holding_stone(), 0);
        let again = plan_stone_teleport(&mut world, &tuning.stone_teleport, &actors, &holding_stone(), 1_999);

        assert!(again.is_empty());
    }

    #[test]
    fn when_no_stone_is_held_then_nothing_happens() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = [touching_anchor(&tuning.stone_teleport)];

        let effects = plan_stone_teleport(&mut world, &tuning.stone_teleport, &actors, &HashMap::new(), 0);

        assert!(effects.is_empty());
    }
}
