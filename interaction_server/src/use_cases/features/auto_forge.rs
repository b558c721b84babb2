use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::effects::{EffectOutcome, EffectRequest};
use crate::domain::entities::{ActorId, ActorSnapshot};
use crate::domain::errors::SessionError;
use crate::domain::machines::RequestOutcome;
use crate::domain::systems::classifier::{button_pressed, hands_together};
use crate::domain::tuning::ForgeTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "auto_forge";

#[derive(Debug, Default, PartialEq)]
pub struct ForgePlan {
    pub effects: Vec<EffectRequest>,
    // Confirmed purchases; the balance check happens after the world lock is released.
    pub purchases: Vec<ActorId>,
}

pub fn plan_auto_forge(
    world: &mut WorldState,
    tuning: &ForgeTuning,
    actors: &[ActorSnapshot],
    now: u64,
) -> ForgePlan {
    let mut plan = ForgePlan::default();

    for actor in actors.iter().filter(|a| a.has_both_hands()) {
        if button_pressed(actor, tuning.anchor, tuning.activation_distance)
            && world.forge.request(actor.id, (), now) == RequestOutcome::Opened
        {
            plan.effects.push(EffectRequest::message(
                actor.id,
                format!(
                    "Put your hands together to confirm auto-forge (Cost: {} coins)",
                    tuning.cost
                ),
                5,
            ));
            info!(actor_id = actor.id.0, "auto-forge requested");
            continue;
        }

        let together = hands_together(actor, tuning.hands_together);
        if world.forge.confirm(actor.id, together, now).is_some() {
            plan.purchases.push(actor.id);
        }
    }

    for (actor, ()) in world.forge.sweep_expired(now) {
        plan.effects.push(EffectRequest::message(
            actor,
            "Auto-forge confirmation expired",
            2,
        ));
    }

    plan
}

/// Charge-and-forge once the balance is known.
pub fn purchase_effects(actor: ActorId, balance: i64, cost: i64) -> Vec<EffectRequest> {
    if balance < cost {
        return vec![EffectRequest::message(
            actor,
            format!("Insufficient funds! Need {cost} coins, have {balance}"),
            5,
        )];
    }

    vec![
        EffectRequest::AdjustBalance {
            actor,
            delta: -cost,
        },
        EffectRequest::ForgeAll { actor },
        EffectRequest::message(actor, format!("Auto-forge activated! -{cost} coins"), 5),
    ]
}

pub struct AutoForgeFeature;

#[async_trait]
impl Feature for AutoForgeFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let actors = ctx.source.list_actors().await?;
        let now = ctx.now();

        let plan = {
            let mut world = ctx.world.lock().await;
            plan_auto_forge(&mut world, &ctx.tuning.forge, &actors, now)
        };
        ctx.dispatch_all(NAME, plan.effects).await;

        let cost = ctx.tuning.forge.cost;
        for actor in plan.purchases {
            let balance = match ctx.dispatch(NAME, &EffectRequest::QueryBalance { actor }).await {
                Some(EffectOutcome::Balance(balance)) => balance,
                // No balance in the reply reads as an empty account.
                Some(_) => 0,
                None => {
                    warn!(actor_id = actor.0, "auto-forge skipped: balance unavailable");
                    continue;
                }
            };
            info!(actor_id = actor.0, balance, cost, "auto-forge confirmed");
            ctx.dispatch_all(NAME, purchase_effects(actor, balance, cost)).await;
        }

        Ok(())
    }
}
