use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::domain::effects::{EffectOutcome, EffectRequest};
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory};
use crate::domain::machines::{
    ChargeBook, CombatLedger, ConfirmationFlow, CooldownKey, CooldownRegistry, ItemButton,
};
use crate::domain::ports::{AccessPolicy, Clock, EffectDispatcher, SnapshotSource};
use crate::domain::systems::{ProjectileConfig, ProjectileSimulator};
use crate::domain::tuning::Tuning;
use crate::use_cases::features::drinking::Drinker;
use crate::use_cases::features::starlight::StarlightState;
use crate::use_cases::features::tavern::TavernState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Every piece of mutable interaction state, owned by one session.
#[derive(Debug)]
pub struct WorldState {
    pub cooldowns: CooldownRegistry<CooldownKey>,
    pub gestures_enabled: HashSet<ActorId>,
    pub projectiles: ProjectileSimulator,
    pub charges: ChargeBook,
    pub combat: CombatLedger,
    pub tavern: TavernState,
    // Pending auto-forge purchases.
    pub forge: ConfirmationFlow<()>,
    pub drinkers: HashMap<ActorId, Drinker>,
    pub starlight: HashMap<ActorId, StarlightState>,
    pub roster: HashMap<ActorId, ItemButton>,
    pub social: HashMap<ActorId, ItemButton>,
}

impl WorldState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            cooldowns: CooldownRegistry::new(),
            gestures_enabled: HashSet::new(),
            projectiles: ProjectileSimulator::new(ProjectileConfig::from(&tuning.projectile)),
            charges: ChargeBook::new(),
            combat: CombatLedger::new(tuning.combat.agreement_ms),
            tavern: TavernState::new(&tuning.tavern),
            forge: ConfirmationFlow::new(tuning.forge.window_ms, tuning.forge.cooldown_ms),
            drinkers: HashMap::new(),
            starlight: HashMap::new(),
            roster: HashMap::new(),
            social: HashMap::new(),
        }
    }

    /// Drops per-actor state of actors missing from the latest snapshot, plus
    /// cooldowns older than `cooldown_horizon_ms`. Projectiles and combat
    /// agreements expire on their own.
    pub fn forget_departed(&mut self, present: &HashSet<ActorId>, now: u64, cooldown_horizon_ms: u64) {
        let here = |id: ActorId| present.contains(&id);

        self.cooldowns.prune(now, cooldown_horizon_ms);
        self.gestures_enabled.retain(|id| here(*id));
        self.charges.retain_actors(here);
        self.tavern.retain_owners(here);
        self.forge.retain_actors(here);
        // Untouched drinkers carry nothing worth keeping.
        self.drinkers
            .retain(|id, drinker| here(*id) && *drinker != Drinker::default());
        self.starlight.retain(|id, _| here(*id));
        self.roster.retain(|id, _| here(*id));
        self.social.retain(|id, _| here(*id));
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            live_projectiles: self.projectiles.live_count(),
            combat_agreements: self.combat.active_count(),
            tavern_closed: self.tavern.closed,
            denylist_size: self.tavern.denylist.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSummary {
    pub live_projectiles: usize,
    pub combat_agreements: usize,
    pub tavern_closed: bool,
    pub denylist_size: usize,
}

/// Ports plus world state for one live session. Feature loops share it through an `Arc`.
pub struct SessionContext {
    pub source: Arc<dyn SnapshotSource>,
    pub dispatcher: Arc<dyn EffectDispatcher>,
    pub clock: Arc<dyn Clock>,
    pub access: Arc<dyn AccessPolicy>,
    pub tuning: Tuning,
    // Lock only for synchronous planning. Never hold it across an await.
    pub world: Mutex<WorldState>,
    status: watch::Sender<SessionStatus>,
}

impl SessionContext {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        dispatcher: Arc<dyn EffectDispatcher>,
        clock: Arc<dyn Clock>,
        access: Arc<dyn AccessPolicy>,
        tuning: Tuning,
    ) -> Self {
        let world = Mutex::new(WorldState::new(&tuning));
        let (status, _) = watch::channel(SessionStatus::Connecting);
        Self {
            source,
            dispatcher,
            clock,
            access,
            tuning,
            world,
            status,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_millis()
    }

    pub fn is_authorized(&self, actor: &ActorSnapshot) -> bool {
        self.access.allows(&actor.name)
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Publishes a new status; returns true when it actually changed.
    pub fn set_status(&self, next: SessionStatus) -> bool {
        self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    pub async fn summary(&self) -> WorldSummary {
        self.world.lock().await.summary()
    }

    /// Reaps world state for everyone not in `actors`.
    pub async fn forget_departed(&self, actors: &[ActorSnapshot]) {
        let present: HashSet<ActorId> = actors.iter().map(|a| a.id).collect();
        let now = self.now();
        let horizon = self.tuning.longest_cooldown_ms();
        self.world
            .lock()
            .await
            .forget_departed(&present, now, horizon);
    }

    /// Inline inventory when the snapshot carries one, otherwise a query.
    /// A failed query reads as "unknown" so the actor is simply skipped.
    pub async fn inventory_for(&self, actor: &ActorSnapshot) -> Option<Inventory> {
        if let Some(inventory) = &actor.inventory {
            return Some(inventory.clone());
        }

        match self.source.inventory(actor.id).await {
            Ok(inventory) => inventory,
            Err(e) => {
                debug!(actor_id = actor.id.0, error = %e, "inventory query failed");
                None
            }
        }
    }

    /// Inventories for a subset of the snapshot, keyed by actor.
    pub async fn inventories<'a, I>(&self, actors: I) -> HashMap<ActorId, Inventory>
    where
        I: IntoIterator<Item = &'a ActorSnapshot>,
    {
        let mut out = HashMap::new();
        for actor in actors {
            if let Some(inventory) = self.inventory_for(actor).await {
                out.insert(actor.id, inventory);
            }
        }
        out
    }

    /// Sends one effect. Failures are logged and reported as `None`; nothing is retried.
    pub async fn dispatch(&self, feature: &'static str, effect: &EffectRequest) -> Option<EffectOutcome> {
        match self.dispatcher.send(effect).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(feature, effect = effect.kind(), error = %e, "effect dispatch failed");
                None
            }
        }
    }

    /// Sends effects in order. Returns how many were applied.
    pub async fn dispatch_all(&self, feature: &'static str, effects: Vec<EffectRequest>) -> usize {
        let mut applied = 0;
        for effect in &effects {
            if self.dispatch(feature, effect).await.is_some() {
                applied += 1;
            }
        }
        applied
    }
}
