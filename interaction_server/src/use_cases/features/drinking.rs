use std::collections::HashMap;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use crate::domain::effects::{EffectRequest, TeleportDestination};
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::errors::SessionError;
use crate::domain::geometry::{Vec3, distance3d};
use crate::domain::machines::CooldownKey;
use crate::domain::tuning::DrinkingTuning;
use crate::use_cases::context::{SessionContext, WorldState};
use crate::use_cases::scheduler::Feature;

const NAME: &str = "drinking";

const DIZZY_MESSAGES: [&str; 10] = [
    "Everything is spinning...",
    "You feel dizzy...",
    "The world is blurring...",
    "You can barely stand...",
    "Your vision is fading...",
    "You feel sick...",
    "Everything hurts...",
    "You're losing control...",
    "The room is spinning...",
    "You can't think straight...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addiction {
    Clean,
    Addicted {
        satisfied_at: u64,
        last_withdrawal: u64,
        warned: bool,
    },
}

impl Addiction {
    fn satisfied(now: u64) -> Self {
        Self::Addicted {
            satisfied_at: now,
            last_withdrawal: now,
            warned: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drinker {
    pub drinks: u32,
    pub last_jitter: u64,
    pub addiction: Addiction,
}

impl Default for Drinker {
    fn default() -> Self {
        Self {
            drinks: 0,
            last_jitter: 0,
            addiction: Addiction::Clean,
        }
    }
}

fn near_mouth(actor: &ActorSnapshot, tuning: &DrinkingTuning) -> bool {
    actor.head.is_some()
        && (distance3d(actor.left_hand, actor.head) <= tuning.mouth_distance
            || distance3d(actor.right_hand, actor.head) <= tuning.mouth_distance)
}

fn dizzy_message<R: Rng>(rng: &mut R) -> &'static str {
    DIZZY_MESSAGES[rng.gen_range(0..DIZZY_MESSAGES.len())]
}

/// Stat penalties and messages for the `drinks`-th potion.
fn potion_effects<R: Rng>(actor: ActorId, drinks: u32, rng: &mut R) -> Vec<EffectRequest> {
    let mut effects = vec![EffectRequest::modify_stat(actor, "frost", drinks as f32, 2)];
    if drinks >= 2 {
        effects.push(EffectRequest::modify_stat(actor, "speed", -((drinks / 2) as f32), 60));
    }
    if drinks >= 3 {
        effects.push(EffectRequest::modify_stat(actor, "damage", -((drinks / 3) as f32), 60));
    }
    effects.push(EffectRequest::message(actor, dizzy_message(rng), 4));
    effects.push(EffectRequest::message(
        actor,
        format!("Drinks: {drinks}/10 | Frost: {drinks}"),
        5,
    ));
    effects
}

pub fn plan_drinking<R: Rng>(
    world: &mut WorldState,
    tuning: &DrinkingTuning,
    actors: &[ActorSnapshot],
    inventories: &HashMap<ActorId, Inventory>,
    now: u64,
    rng: &mut R,
) -> Vec<EffectRequest> {
    let mut effects = Vec::new();

    for actor in actors {
        if actor.head.is_none() || !actor.has_both_hands() {
            continue;
        }
        let id = actor.id;
        let drinker = world.drinkers.entry(id).or_default();
        let at_mouth = near_mouth(actor, tuning);
        let inventory = inventories.get(&id).filter(|_| at_mouth);

        if let Some(inv) = inventory
            && inv.holds(&tuning.potion_item)
            && world
                .cooldowns
                .try_fire(CooldownKey::Drink(id), now, tuning.drink_cooldown_ms)
        {
            drinker.drinks += 1;
            effects.extend(
                inv.matching(&tuning.potion_item)
                    .iter()
                    .map(|p| EffectRequest::DestroyItem { item: p.id }),
            );
            info!(actor_id = id.0, drinks = drinker.drinks, "potion drunk");

            if drinker.drinks >= tuning.lethal_drinks {
                drinker.drinks = 0;
                effects.push(EffectRequest::Kill { actor: id });
                effects.push(EffectRequest::modify_stat(
                    id,
                    "speed",
                    tuning.lethal_speed_penalty,
                    tuning.lethal_penalty_secs,
                ));
                effects.push(EffectRequest::message(
                    id,
                    format!(
                        "You drank too much and died! {} speed for {} minutes.",
                        tuning.lethal_speed_penalty,
                        tuning.lethal_penalty_secs / 60
                    ),
                    10,
                ));
                continue;
            }
            effects.extend(potion_effects(id, drinker.drinks, rng));
        }

        let n = drinker.drinks;
        if n >= 2 {
            let interval = 10_000u64.saturating_sub(800 * u64::from(n)).max(1_000);
            if now.saturating_sub(drinker.last_jitter) > interval
                && let Some(body) = actor.body_position()
            {
                drinker.last_jitter = now;
                let spread = n as f32 * 0.25;
                let offset = Vec3::new(
                    rng.gen_range(-spread..=spread),
                    0.0,
                    rng.gen_range(-spread..=spread),
                );
                effects.push(EffectRequest::Teleport {
                    actor: id,
                    destination: TeleportDestination::Position(body + offset),
                });
                effects.push(EffectRequest::message(id, dizzy_message(rng), 2));
            }
        }

        if let Some(inv) = inventory
            && inv.holds(&tuning.taper_item)
            && world
                .cooldowns
                .try_fire(CooldownKey::Drink(id), now, tuning.drink_cooldown_ms)
        {
            let (text, secs) = match drinker.addiction {
                Addiction::Clean => {
                    info!(actor_id = id.0, "actor became addicted");
                    ("You are now addicted! Use the taper every few minutes or suffer.", 8)
                }
                Addiction::Addicted { .. } => ("Addiction satisfied for now...", 4),
            };
            drinker.addiction = Addiction::satisfied(now);
            effects.push(EffectRequest::message(id, text, secs));
        }

        if let Addiction::Addicted {
            satisfied_at,
            last_withdrawal,
            warned,
        } = &mut drinker.addiction
        {
            let since = now.saturating_sub(*satisfied_at);
            let interval = tuning.addiction_interval_ms;
            if !*warned && since > interval.saturating_sub(tuning.addiction_warning_ms) {
                *warned = true;
                effects.push(EffectRequest::message(
                    id,
                    "You need the taper soon or you'll suffer!",
                    6,
                ));
            }
            if since > interval && now.saturating_sub(*last_withdrawal) > tuning.withdrawal_tick_ms {
                *last_withdrawal = now;
                effects.push(EffectRequest::Damage {
                    actor: id,
                    amount: tuning.withdrawal_damage,
                });
                effects.push(EffectRequest::message(id, "Withdrawal is hurting you!", 3));
            }
        }
    }

    effects
}

pub struct DrinkingFeature;

#[async_trait]
impl Feature for DrinkingFeature {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&self, ctx: &SessionContext) -> Result<(), SessionError> {
        let tuning = &ctx.tuning.drinking;
        let actors = ctx.source.list_actors().await?;
        let wanted: Vec<&ActorSnapshot> = actors.iter().filter(|a| near_mouth(a, tuning)).collect();
        let inventories = ctx.inventories(wanted).await;
        let now = ctx.now();

        let effects = {
            let mut world = ctx.world.lock().await;
            let mut rng = rand::thread_rng();
            plan_drinking(&mut world, tuning, &actors, &inventories, now, &mut rng)
        };
        ctx.dispatch_all(NAME, effects).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{HeldItem, ItemId};
    use crate::domain::tuning::Tuning;
    use crate::use_cases::test_support::{actor_at, messages_to};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const ACTOR: ActorId = ActorId(1);

    fn drinking_actor() -> ActorSnapshot {
        let mut a = actor_at(1, "Barfly", Vec3::new(0.0, 1.7, 0.0));
        a.right_hand = Some(Vec3::new(0.1, 1.6, 0.1));
        a
    }

    fn holding(item: &str) -> HashMap<ActorId, Inventory> {
        HashMap::from([(
            ACTOR,
            Inventory {
                left: None,
                right: Some(HeldItem::new(item, ItemId(5))),
            },
        )])
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn when_first_potion_is_drunk_then_frost_and_counter_are_reported() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);

        let effects = plan_drinking(
            &mut world,
            &tuning.drinking,
            &[drinking_actor()],
            &holding("Potion Medium"),
            0,
            &mut rng(),
        );

        assert_eq!(effects[0], EffectRequest::DestroyItem { item: ItemId(5) });
        assert_eq!(effects[1], EffectRequest::modify_stat(ACTOR, "frost", 1.0, 2));
        let messages = messages_to(&effects, ACTOR);
        assert!(DIZZY_MESSAGES.contains(&messages[0].as_str()));
        assert_eq!(messages[1], "Drinks: 1/10 | Frost: 1");
        assert_eq!(world.drinkers[&ACTOR].drinks, 1);
    }

    #[test]
    fn when_drinking_again_within_cooldown_then_counter_does_not_move() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = [drinking_actor()];
        let inv = holding("potion medium");

        plan_drinking(&mut world, &tuning.drinking, &actors, &inv, 0, &mut rng());
        plan_drinking(&mut world, &tuning.drinking, &actors, &inv, 2_999, &mut rng());

        assert_eq!(world.drinkers[&ACTOR].drinks, 1);
    }

    #[test]
    fn when_tenth_potion_is_drunk_then_actor_dies_and_counter_resets() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        world.drinkers.insert(
            ACTOR,
            Drinker {
                drinks: 9,
                last_jitter: 0,
                addiction: Addiction::Clean,
            },
        );

        let effects = plan_drinking(
            &mut world,
            &tuning.drinking,
            &[drinking_actor()],
            &holding("potion medium"),
            50_000,
            &mut rng(),
        );

        assert!(effects.contains(&EffectRequest::Kill { actor: ACTOR }));
        assert!(effects.contains(&EffectRequest::modify_stat(ACTOR, "speed", -8.0, 1_200)));
        assert!(!effects.iter().any(|e| matches!(e, EffectRequest::Teleport { .. })));
        assert_eq!(world.drinkers[&ACTOR].drinks, 0);
    }

    #[test]
    fn when_drunk_enough_then_actor_is_jittered_nearby() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        world.drinkers.insert(
            ACTOR,
            Drinker {
                drinks: 4,
                last_jitter: 0,
                addiction: Addiction::Clean,
            },
        );
        let actor = actor_at(1, "Barfly", Vec3::new(0.0, 1.7, 0.0));
        let body = actor.body_position().expect("actor has a body");

        let effects = plan_drinking(
            &mut world,
            &tuning.drinking,
            &[actor],
            &HashMap::new(),
            20_000,
            &mut rng(),
        );

        let Some(EffectRequest::Teleport {
            destination: TeleportDestination::Position(to),
            ..
        }) = effects.first()
        else {
            panic!("expected a jitter teleport, got {effects:?}");
        };
        assert!((to.x - body.x).abs() <= 1.0);
        assert!((to.z - body.z).abs() <= 1.0);
        assert_eq!(to.y, body.y);
        assert_eq!(world.drinkers[&ACTOR].last_jitter, 20_000);
    }

    #[test]
    fn when_taper_is_used_then_addiction_starts_and_later_use_satisfies_it() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        let actors = [drinking_actor()];
        let inv = holding("Handle Short Taper");

        let first = plan_drinking(&mut world, &tuning.drinking, &actors, &inv, 1_000, &mut rng());
        let second = plan_drinking(&mut world, &tuning.drinking, &actors, &inv, 5_000, &mut rng());

        assert_eq!(
            messages_to(&first, ACTOR),
            vec!["You are now addicted! Use the taper every few minutes or suffer."]
        );
        assert_eq!(messages_to(&second, ACTOR), vec!["Addiction satisfied for now..."]);
        assert_eq!(world.drinkers[&ACTOR].addiction, Addiction::satisfied(5_000));
    }

    #[test]
    fn when_addiction_goes_unsatisfied_then_warning_comes_once_before_withdrawal() {
        let tuning = Tuning::default();
        let mut world = WorldState::new(&tuning);
        world.drinkers.insert(
            ACTOR,
            Drinker {
                drinks: 0,
                last_jitter: 0,
                addiction: Addiction::satisfied(0),
            },
        );
        let actors = [actor_at(1, "Barfly", Vec3::new(0.0, 1.7, 0.0))];
        let none = HashMap::new();

        let warn = plan_drinking(&mut world, &tuning.drinking, &actors, &none, 151_000, &mut rng());
        let quiet = plan_drinking(&mut world, &tuning.drinking, &actors, &none, 152_000, &mut rng());
        let hurt = plan_drinking(&mut world, &tuning.drinking, &actors, &none, 181_000, &mut rng());
        let cooling = plan_drinking(&mut world, &tuning.drinking, &actors, &none, 183_000, &mut rng());

        assert_eq!(
            messages_to(&warn, ACTOR),
            vec!["You need the taper soon or you'll suffer!"]
        );
        assert!(quiet.is_empty());
        assert_eq!(
            hurt[0],
            EffectRequest::Damage {
                actor: ACTOR,
                amount: 0.1
            }
        );
        assert!(cooling.is_empty());
    }
}
