use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::effects::EffectRequest;
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::errors::SessionError;
use crate::domain::geometry::distance3d;
use crate::domain::ports::AccessPolicy;
use crate::domain::systems::classifier::hand_raised_above_head;
use crate::domain::tuning::StarlightTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "starlight";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StarlightState {
    #[default]
    Idle,
    /// Locked on for `lock_ms` after `started_at`, even if the item is put away.
    Pulsing { started_at: u64, last_pulse: u64 },
}

fn first_target<'a>(
    caster: &ActorSnapshot,
    actors: &'a [ActorSnapshot],
    reach: f32,
) -> Option<&'a ActorSnapshot> {
    actors.iter().find(|t| {
        t.head.is_some()
            && (distance3d(caster.left_hand, t.head) <= reach
                || distance3d(caster.right_hand, t.head) <= reach)
    })
}

pub fn plan_starlight(
    world: &mut WorldState,
    tuning: &StarlightTuning,
    access: &dyn AccessPolicy,
    actors: &[ActorSnapshot],
    inventories: &HashMap<ActorId, Inventory>,
    now: u64,
) -> Vec<EffectRequest> {
    let mut effects = Vec::new();

    for caster in actors.iter().filter(|a| access.allows(&a.name)) {
        let holding = inventories
            .get(&caster.id)
            .is_some_and(|inv| inv.holds(&tuning.item));
        let state = world.starlight.get(&caster.id).copied().unwrap_or_default();

        match state {
            StarlightState::Pulsing { started_at, .. }
                if now.saturating_sub(started_at) < tuning.lock_ms => {}
            StarlightState::Pulsing { .. } if !holding => {
                world.starlight.remove(&caster.id);
                debug!(actor_id = caster.id.0, "starlight released");
                continue;
            }
            StarlightState::Idle if !holding => continue,
            _ => {}
        }

        if caster.head.is_none() || !caster.has_both_hands() {
            continue;
        }
        if hand_raised_above_head(caster, tuning.raise_margin).is_none() {
            continue;
        }
        if let StarlightState::Pulsing { last_pulse, .. } = state
            && now.saturating_sub(last_pulse) < tuning.pulse_interval_ms
        {
            continue;
        }

        let Some(target) = first_target(caster, actors, tuning.target_distance) else {
            continue;
        };

        effects.push(EffectRequest::ResetProgression { actor: target.id });
        effects.push(EffectRequest::GrantXp {
            actor: target.id,
            amount: tuning.xp_grant,
        });
        effects.push(EffectRequest::modify_stat(
            caster.id,
            "Luminosity",
            tuning.luminosity,
            tuning.luminosity_secs,
        ));
        if target.id == caster.id {
            effects.push(EffectRequest::message(caster.id, "Starlight pulsing!", 2));
        } else {
            effects.push(EffectRequest::message(
                caster.id,
                format!("Starlight pulsing on {}!", target.name),
                2,
            ));
            effects.push(EffectRequest::message(target.id, "Starlight blessing you!", 2));
        }

        let next = match state {
            StarlightState::Idle => {
                info!(actor_id = caster.id.0, target_id = target.id.0, "starlight started");
                StarlightState::Pulsing {
                    started_at: now,
                    last_pulse: now,
                }
            }
            StarlightState::Pulsing { started_at, .. } => StarlightState::Pulsing {
                started_at,
                last_pulse: now,
            },
        };
        world.starlight.insert(caster.id, next);
    }

    effects
}

pub struct StarlightFeature;

#[async_trait]
impl Feature for StarlightFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let casters: Vec<&ActorSnapshot> = actors.iter().filter(|a| ctx.is_authorized(a)).collect();
        let inventories = ctx.inventories(casters).await;
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            plan_starlight(
                &mut world,
                &ctx.tuning.starlight,
                ctx.access.as_ref(),
                &actors,
                &inventories,
                now,
            )
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
    use crate::domain::ports::{AllowAll, AllowList};
    use crate::domain::tuning::Tuning;
    use crate::use_cases::test_support::{actor_at, messages_to};

    const CASTER: ActorId = ActorId(1);
    const TARGET: ActorId = ActorId(2);

    fn raised_over_self() -> ActorSnapshot {
        let mut a = actor_at(1, "Stella", Vec3::new(0.0, 1.7, 0.0));
        a.right_hand = Some(Vec3::new(0.0, 2.0, 0.0));
        a
    }

    fn raised_over_other() -> Vec<ActorSnapshot> {
        let mut caster = actor_at(1, "Stella", Vec3::new(0.0, 1.7, 0.0));
        caster.right_hand = Some(Vec3::new(0.0, 2.0, 1.0));
        let target = actor_at(2, "Orion", Vec3::new(0.0, 2.2, 1.0));
        vec![caster, target]
    }

    fn holding_wand() -> HashMap<ActorId, Inventory> {
        HashMap::from([(
            CASTER,
            Inventory {
                left: None,
                right: Some(HeldItem::new("Handle Large Cool", ItemId(3))),
            },
        )])
    }

    #[test]
    fn when_hand_is_raised_over_own_head_then_caster_is_blessed() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);

        let effects = plan_starlight(
            &mut world,
            &tuning.starlight,
            &AllowAll,
            &[raised_over_self()],
            &holding_wand(),
            1_000,
        );

        assert_eq!(
            &effects[..3],
            &[
                EffectRequest::ResetProgression { actor: CASTER },
                EffectRequest::GrantXp {
                    actor: CASTER,
                    amount: 9_999
                },
                EffectRequest::modify_stat(CASTER, "Luminosity", 50.0, 10),
            ]
        );
        assert_eq!(messages_to(&effects, CASTER), vec!["Starlight pulsing!"]);
        assert_eq!(
            world.starlight[&CASTER],
            StarlightState::Pulsing {
                started_at: 1_000,
                last_pulse: 1_000
            }
        );
    }

    #[test]
    fn when_another_head_is_under_the_hand_then_both_are_told() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = raised_over_other();

        let effects = plan_starlight(&mut world, &tuning.starlight, &AllowAll, &actors, &holding_wand(), 0);

        assert_eq!(messages_to(&effects, CASTER), vec!["Starlight pulsing on Orion!"]);
        assert_eq!(messages_to(&effects, TARGET), vec!["Starlight blessing you!"]);
        assert_eq!(effects[0], EffectRequest::ResetProgression { actor: TARGET });
    }

    #[test]
    fn when_item_is_put_away_during_lock_then_pulsing_continues() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = [raised_over_self()];

        plan_starlight(&mut world, &tuning.starlight, &AllowAll, &actors, &holding_wand(), 0);
        let too_soon = plan_starlight(&mut world, &tuning.starlight, &AllowAll, &actors, &HashMap::new(), 500);
        let locked = plan_starlight(&mut world, &tuning.starlight, &AllowAll, &actors, &HashMap::new(), 1_000);
        let released = plan_starlight(&mut world, &tuning.starlight, &AllowAll, &actors, &HashMap::new(), 5_000);

        assert!(too_soon.is_empty());
        assert_eq!(locked.len(), 4);
        assert!(released.is_empty());
        assert!(!world.starlight.contains_key(&CASTER));
    }

    #[test]
    fn when_caster_is_not_authorized_then_nothing_happens() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let access = AllowList::new(["someone else"]);

        let effects = plan_starlight(
            &mut world,
            &tuning.starlight,
            &access,
            &[raised_over_self()],
            &holding_wand(),
            0,
        );

        assert!(effects.is_empty());
    }
}
