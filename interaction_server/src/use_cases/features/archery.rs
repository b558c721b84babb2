use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::effects::{EffectRequest, TeleportDestination};
use crate::domain::entities::{ActorId, ActorSnapshot, ChangeKind, Inventory, InventoryChange};
use crate::domain::errors::SessionError;
use crate::domain::ports::AccessPolicy;
use crate::domain::systems::{ProjectileEvent, ProjectileKind};
use crate::domain::tuning::ProjectileTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "archery";

fn name_of(actors: &[ActorSnapshot], id: ActorId) -> String {
    actors
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| format!("actor {id}"))
}

fn is_shot(change: &InventoryChange, ammo: &str) -> bool {
    change.kind == ChangeKind::Drop && change.item.as_ref().is_some_and(|i| i.matches(ammo))
}

/// Arms charges from inventory changes. Needs no actor snapshot.
/// `changes` pairs each notification with the actor's hands after it, when known.
pub fn plan_charges(
    world: &mut WorldState,
    tuning: &ProjectileTuning,
    changes: &[(InventoryChange, Option<Inventory>)],
) -> Vec<EffectRequest> {
    let mut effects = Vec::new();

    for (change, inventory) in changes {
        let Some(inventory) = inventory else {
            continue;
        };

        for armed in world.charges.arm(change.actor, inventory, &tuning.ammo_item) {
            effects.extend(
                armed
                    .spent_catalysts
                    .iter()
                    .map(|item| EffectRequest::DestroyItem { item: *item }),
            );
            effects.push(EffectRequest::message(
                change.actor,
                format!("{} arrow charged!", capitalized(armed.kind.as_str())),
                3,
            ));
            info!(actor_id = change.actor.0, kind = armed.kind.as_str(), "charge armed");
        }
    }

    effects
}

/// Arms charges and launches shots from inventory changes, then advances flight.
pub fn plan_archery(
    world: &mut WorldState,
    tuning: &ProjectileTuning,
    access: &dyn AccessPolicy,
    changes: &[(InventoryChange, Option<Inventory>)],
    actors: &[ActorSnapshot],
    now: u64,
) -> Vec<EffectRequest> {
    let mut effects = plan_charges(world, tuning, changes);

    for (change, inventory) in changes {
        let Some(inventory) = inventory else {
            continue;
        };
        if !is_shot(change, &tuning.ammo_item) {
            continue;
        }
        if !access.allows(&change.actor_name) {
            debug!(actor_id = change.actor.0, "shot ignored: actor not authorized");
            continue;
        }
        if !inventory.left_matches(&tuning.launcher_item) {
            effects.push(EffectRequest::message(
                change.actor,
                format!(
                    "You must hold a {} in your left hand to shoot special arrows!",
                    tuning.launcher_item
                ),
                2,
            ));
            continue;
        }

        let Some(shooter) = actors.iter().find(|a| a.id == change.actor) else {
            debug!(actor_id = change.actor.0, "shot ignored: shooter not in snapshot");
            continue;
        };
        let (Some(start), Some(forward)) = (shooter.right_hand.or(shooter.head), shooter.right_hand_forward)
        else {
            debug!(actor_id = shooter.id.0, "shot ignored: missing aim pose");
            continue;
        };

        let charge = change
            .item
            .as_ref()
            .and_then(|item| world.charges.consume(shooter.id, item.id));
        let kind = ProjectileKind::from(charge);

        if let Some(id) = world.projectiles.launch(shooter.id, start, forward, kind, now) {
            info!(
                shooter_id = shooter.id.0,
                projectile_id = id,
                kind = kind.as_str(),
                live = world.projectiles.live_count(),
                "projectile launched"
            );
        }
    }

    if world.projectiles.is_empty() {
        return effects;
    }

    for event in world.projectiles.tick(now, actors) {
        match event {
            ProjectileEvent::Hit {
                projectile, target, ..
            } => {
                let shooter_name = name_of(actors, projectile.shooter);
                let target_name = name_of(actors, target);
                effects.extend(hit_effects(
                    projectile.kind,
                    (projectile.shooter, &shooter_name),
                    (target, &target_name),
                ));
            }
            ProjectileEvent::Expired {
                projectile,
                closest,
            } => {
                info!(
                    shooter_id = projectile.shooter.0,
                    projectile_id = projectile.id,
                    kind = projectile.kind.as_str(),
                    closest_id = closest.map(|(a, _)| a.0),
                    closest_distance = closest.map(|(_, d)| d),
                    "projectile expired"
                );
            }
        }
    }

    effects
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn hit_effects(
    kind: ProjectileKind,
    shooter: (ActorId, &str),
    target: (ActorId, &str),
) -> Vec<EffectRequest> {
    let (shooter_id, _) = shooter;
    let (target_id, target_name) = target;

    let (shooter_text, target_text, effect) = match kind {
        ProjectileKind::Normal => (
            format!("Arrow hit {target_name}!"),
            "Hit by arrow - slight speed boost!",
            EffectRequest::modify_stat(target_id, "speed", 2.0, 5),
        ),
        ProjectileKind::Speed => (
            format!("Your speed arrow struck {target_name}!"),
            "Speed boost activated!",
            EffectRequest::modify_stat(target_id, "speed", 5.0, 30),
        ),
        ProjectileKind::Kill => (
            format!("Kill arrow hit {target_name}!"),
            "You were killed by a kill arrow!",
            EffectRequest::Kill { actor: target_id },
        ),
        ProjectileKind::Dark => (
            format!("Dark arrow cursed {target_name}!"),
            "You've been cursed with nightmares!",
            EffectRequest::modify_stat(target_id, "nightmare", 4.0, 30),
        ),
        ProjectileKind::Teleport => (
            format!("Teleport arrow pulled {target_name} to you!"),
            "You were pulled by a teleport arrow!",
            EffectRequest::Teleport {
                actor: target_id,
                destination: TeleportDestination::Actor(shooter_id),
            },
        ),
    };

    vec![
        EffectRequest::message(shooter_id, shooter_text, 2),
        EffectRequest::message(target_id, target_text, 2),
        effect,
    ]
}

pub struct ArcheryFeature;

#[async_trait]
impl Feature for ArcheryFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let drained = ctx.source.inventory_changes().await?;
        let in_flight = !ctx.world.lock().await.projectiles.is_empty();
        let ammo = &ctx.tuning.projectile.ammo_item;

        if drained.is_empty() && !in_flight {
            return Ok(());
        }

        let mut changes = Vec::with_capacity(drained.len());
        for change in drained {
            let inventory = match &change.inventory {
                Some(inventory) => Some(inventory.clone()),
                None => ctx.source.inventory(change.actor).await.ok().flatten(),
            };
            changes.push((change, inventory));
        }

        let needs_snapshot = in_flight || changes.iter().any(|(c, _)| is_shot(c, ammo));
        let actors = if needs_snapshot {
            match ctx.source.list_actors().await {
                Ok(actors) => actors,
                Err(e) => {
                    // The drained batch cannot be fetched again, so its pickups still arm.
                    let effects = {
                        let mut world = ctx.world.lock().await;
                        plan_charges(&mut world, &ctx.tuning.projectile, &changes)
                    };
                    ctx.dispatch_all(NAME, effects).await;
                    return Err(e);
                }
            }
        } else {
            Vec::new()
        };
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            plan_archery(
                &mut world,
                &ctx.tuning.projectile,
                ctx.access.as_ref(),
                &changes,
                &actors,
                now,
            )
        };
        ctx.dispatch_all(NAME, effects).await;
        Ok(())
    }
}
