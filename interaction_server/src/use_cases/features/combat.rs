use async_trait::async_trait;
use tracing::info;

use crate::domain::effects::{EffectRequest, TeleportDestination};
use crate::domain::entities::ActorSnapshot;
use crate::domain::errors::SessionError;
use crate::domain::geometry::{actor_hitboxes, normalize};
use crate::domain::ports::AccessPolicy;
use crate::domain::systems::classifier::{limb_contact, mutual_touch};
use crate::domain::tuning::CombatTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "combat";

fn can_engage(actor: &ActorSnapshot, access: &dyn AccessPolicy) -> bool {
    actor.head.is_some() && actor.has_both_hands() && access.allows(&actor.name)
}

pub fn plan_combat(
    world: &mut WorldState,
    tuning: &CombatTuning,
    access: &dyn AccessPolicy,
    actors: &[ActorSnapshot],
    now: u64,
) -> Vec<EffectRequest> {
    let mut effects = Vec::new();
    let minutes = tuning.agreement_ms / 60_000;

    // Consent: unordered pairs touching each other's face in this snapshot.
    let fighters: Vec<&ActorSnapshot> = actors.iter().filter(|a| can_engage(a, access)).collect();
    for (i, a) in fighters.iter().enumerate() {
        for b in &fighters[i + 1..] {
            if !mutual_touch(a, b, tuning.consent_distance) {
                continue;
            }
            if world.combat.open(a.id, b.id, now) {
                effects.push(EffectRequest::message(
                    a.id,
                    format!("Combat started with {} for {minutes} minutes!", b.name),
                    5,
                ));
                effects.push(EffectRequest::message(
                    b.id,
                    format!("Combat started with {} for {minutes} minutes!", a.name),
                    5,
                ));
                info!(actor_id = a.id.0, other_id = b.id.0, "combat agreement opened");
            }
        }
    }

    for attacker in actors {
        if !attacker.has_both_hands() || !access.allows(&attacker.name) {
            continue;
        }

        for target in actors {
            if target.id == attacker.id || !world.combat.can_fight(attacker.id, target.id, now) {
                continue;
            }
            let hitboxes = actor_hitboxes(target);

            for (hand, forward) in [
                (attacker.left_hand, attacker.left_hand_forward),
                (attacker.right_hand, attacker.right_hand_forward),
            ] {
                let Some(limb) = limb_contact(hand, &hitboxes, tuning.punch_reach) else {
                    continue;
                };
                if !world
                    .combat
                    .hit_ready(attacker.id, target.id, now, tuning.hit_cooldown_ms)
                {
                    continue;
                }

                let push = forward.and_then(normalize);
                if let (Some(dir), Some(body)) = (push, target.body_position()) {
                    effects.push(EffectRequest::Teleport {
                        actor: target.id,
                        destination: TeleportDestination::Position(body + dir * tuning.knockback),
                    });
                }
                effects.push(EffectRequest::Damage {
                    actor: target.id,
                    amount: tuning.hit_damage,
                });
                effects.push(EffectRequest::message(target.id, "*hit*", 1));
                world.combat.mark_hit(attacker.id, target.id, now);
                info!(
                    attacker_id = attacker.id.0,
                    target_id = target.id.0,
                    limb = limb.part.as_str(),
                    "combat hit"
                );
            }
        }
    }

    for pair in world.combat.sweep_expired(now) {
        let (a, b) = pair.actors();
        info!(actor_id = a.0, other_id = b.0, "combat agreement expired");
    }
    world.combat.prune_hits(now, tuning.hit_cooldown_ms);

    effects
}

pub struct CombatFeature;

#[async_trait]
impl Feature for CombatFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            plan_combat(&mut world, &ctx.tuning.combat, ctx.access.as_ref(), &actors, now)
        };
        ctx.dispatch_all(NAME, effects).await;
        Ok(())
    }
}
