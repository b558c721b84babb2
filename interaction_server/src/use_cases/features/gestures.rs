use async_trait::async_trait;
use tracing::info;

use crate::domain::effects::EffectRequest;
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::errors::SessionError;
use crate::domain::machines::CooldownKey;
use crate::domain::ports::AccessPolicy;
use crate::domain::systems::classifier::{classify_face_gesture, classify_hand_gesture};
use crate::domain::systems::{FaceGesture, HandGesture};
use crate::domain::tuning::GestureTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "gestures";

#[derive(Debug, Default, PartialEq)]
pub struct GesturePlan {
    pub effects: Vec<EffectRequest>,
    // Hand gestures already past their cooldown; they still need the actor's inventory.
    pub hand_actions: Vec<(ActorId, HandGesture)>,
}

fn has_full_pose(actor: &ActorSnapshot) -> bool {
    actor.head.is_some()
        && actor.has_both_hands()
        && actor.left_hand_up.is_some()
        && actor.right_hand_up.is_some()
}

pub fn plan_gestures(
    world: &mut WorldState,
    tuning: &GestureTuning,
    access: &dyn AccessPolicy,
    actors: &[ActorSnapshot],
    now: u64,
) -> GesturePlan {
    let mut plan = GesturePlan::default();

    for actor in actors {
        if !access.allows(&actor.name) || !has_full_pose(actor) {
            continue;
        }
        let key = CooldownKey::Gesture(actor.id);

        if let Some(face) = classify_face_gesture(actor, tuning.face_distance)
            && world.cooldowns.try_fire(key, now, tuning.cooldown_ms)
        {
            if face == FaceGesture::Toggle {
                let enabled = if world.gestures_enabled.remove(&actor.id) {
                    false
                } else {
                    world.gestures_enabled.insert(actor.id);
                    true
                };
                let status = if enabled { "enabled" } else { "disabled" };
                plan.effects
                    .push(EffectRequest::message(actor.id, format!("Gestures {status}"), 3));
                info!(actor_id = actor.id.0, enabled, "gestures toggled");
                continue;
            }

            if world.gestures_enabled.contains(&actor.id) {
                plan.effects.extend(face_effects(actor.id, face, tuning));
            }
            continue;
        }

        if !world.gestures_enabled.contains(&actor.id) {
            continue;
        }

        if let Some(gesture) = classify_hand_gesture(actor, tuning.hands_distance)
            && world.cooldowns.try_fire(key, now, tuning.cooldown_ms)
        {
            plan.hand_actions.push((actor.id, gesture));
        }
    }

    plan
}

fn face_effects(actor: ActorId, gesture: FaceGesture, tuning: &GestureTuning) -> Vec<EffectRequest> {
    match gesture {
        FaceGesture::Toggle => Vec::new(),
        FaceGesture::Damage => vec![
            EffectRequest::modify_stat(actor, "damage", tuning.damage_boost, tuning.boost_secs),
            EffectRequest::message(actor, "Damage applied!", 3),
        ],
        FaceGesture::Speed => vec![
            EffectRequest::modify_stat(actor, "speed", tuning.speed_boost, tuning.boost_secs),
            EffectRequest::message(actor, "Speed boost activated!", 3),
        ],
        FaceGesture::Hunger => vec![
            EffectRequest::SetStat {
                actor,
                stat: "hunger".to_string(),
                value: tuning.hunger_value,
            },
            EffectRequest::message(actor, "Hunger applied!", 3),
        ],
        FaceGesture::GodMode => vec![
            EffectRequest::SetGodMode {
                actor,
                enabled: true,
            },
            EffectRequest::message(actor, "God mode activated!", 3),
        ],
    }
}

/// Replace or destroy whatever the actor holds in either hand.
pub fn hand_gesture_effects(actor: ActorId, gesture: HandGesture, inventory: &Inventory) -> Vec<EffectRequest> {
    let mut effects: Vec<EffectRequest> = inventory
        .hands()
        .map(|item| match gesture {
            HandGesture::Replace => EffectRequest::ReplaceItem { item: item.id },
            HandGesture::Delete => EffectRequest::DestroyItem { item: item.id },
        })
        .collect();

    if gesture == HandGesture::Delete {
        effects.push(EffectRequest::message(actor, "Items deleted!", 3));
    }
    effects
}

pub struct GestureFeature;

#[async_trait]
impl Feature for GestureFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let now = ctx.now();

        let plan = {
            let mut world = ctx.world.lock().await;
            plan_gestures(&mut world, &ctx.tuning.gesture, ctx.access.as_ref(), &actors, now)
        };
        ctx.dispatch_all(NAME, plan.effects).await;

        for (actor_id, gesture) in plan.hand_actions {
            let Some(actor) = actors.iter().find(|a| a.id == actor_id) else {
                continue;
            };
            let Some(inventory) = ctx.inventory_for(actor).await else {
                continue;
            };
            ctx.dispatch_all(NAME, hand_gesture_effects(actor_id, gesture, &inventory))
                .await;
        }

        Ok(())
    }
}
