use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::effects::{EffectOutcome, EffectRequest, StatValue};
use crate::domain::entities::{ActorId, ActorSnapshot, Inventory, InventoryChange};
use crate::domain::errors::SessionError;
use crate::domain::geometry::Vec3;
use crate::domain::ports::{AccessPolicy, AllowAll, Clock, EffectDispatcher, SnapshotSource};
use crate::domain::tuning::Tuning;
use crate::use_cases::context::SessionContext;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

// Clock that tests can move forward between ticks.
#[derive(Clone, Default)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn at(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub(crate) fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub list: bool,
    pub inventory: bool,
    pub changes: bool,
    pub send: bool,
}

#[derive(Default)]
struct SourceState {
    actors: Vec<ActorSnapshot>,
    inventories: HashMap<ActorId, Inventory>,
    changes: Vec<InventoryChange>,
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedSource {
    state: Arc<Mutex<SourceState>>,
    failures: FailureFlags,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn set_actors(&self, actors: Vec<ActorSnapshot>) {
        let mut guard = self.state.lock().expect("source mutex poisoned");
        guard.actors = actors;
    }

    pub(crate) fn set_inventory(&self, actor: ActorId, inventory: Inventory) {
        let mut guard = self.state.lock().expect("source mutex poisoned");
        guard.inventories.insert(actor, inventory);
    }

    pub(crate) fn push_change(&self, change: InventoryChange) {
        let mut guard = self.state.lock().expect("source mutex poisoned");
        guard.changes.push(change);
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn list_actors(&self) -> Result<Vec<ActorSnapshot>, SessionError> {
        if self.failures.list {
            return Err(SessionError::Transport("list failed".to_string()));
        }

        let guard = self.state.lock().expect("source mutex poisoned");
        Ok(guard.actors.clone())
    }

    async fn inventory(&self, actor: ActorId) -> Result<Option<Inventory>, SessionError> {
        if self.failures.inventory {
            return Err(SessionError::Transport("inventory failed".to_string()));
        }

        let guard = self.state.lock().expect("source mutex poisoned");
        Ok(guard.inventories.get(&actor).cloned())
    }

    async fn inventory_changes(&self) -> Result<Vec<InventoryChange>, SessionError> {
        if self.failures.changes {
            return Err(SessionError::Transport("changes failed".to_string()));
        }

        let mut guard = self.state.lock().expect("source mutex poisoned");
        Ok(std::mem::take(&mut guard.changes))
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingDispatcher {
    sent: Arc<Mutex<Vec<EffectRequest>>>,
    attempts: Arc<AtomicUsize>,
    balance: i64,
    stats: Vec<StatValue>,
    failures: FailureFlags,
}

impl RecordingDispatcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn with_balance(mut self, balance: i64) -> Self {
        self.balance = balance;
        self
    }

    pub(crate) fn with_stats(mut self, stats: Vec<StatValue>) -> Self {
        self.stats = stats;
        self
    }

    pub(crate) fn sent(&self) -> Vec<EffectRequest> {
        let guard = self.sent.lock().expect("dispatcher mutex poisoned");
        guard.clone()
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        let mut guard = self.sent.lock().expect("dispatcher mutex poisoned");
        guard.clear();
    }
}

#[async_trait]
impl EffectDispatcher for RecordingDispatcher {
    async fn send(&self, effect: &EffectRequest) -> Result<EffectOutcome, SessionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures.send {
            return Err(SessionError::Upstream {
                status: 503,
                message: Some("send failed".to_string()),
            });
        }

        let mut guard = self.sent.lock().expect("dispatcher mutex poisoned");
        guard.push(effect.clone());
        match effect {
            EffectRequest::QueryBalance { .. } => Ok(EffectOutcome::Balance(self.balance)),
            EffectRequest::QueryStats { .. } => Ok(EffectOutcome::Stats(self.stats.clone())),
            _ => Ok(EffectOutcome::Applied),
        }
    }
}

pub(crate) fn test_context(
    source: ScriptedSource,
    dispatcher: RecordingDispatcher,
    now: u64,
) -> SessionContext {
    build_context(source, dispatcher, Arc::new(FixedClock(now)), Arc::new(AllowAll))
}

pub(crate) fn build_context(
    source: ScriptedSource,
    dispatcher: RecordingDispatcher,
    clock: Arc<dyn Clock>,
    access: Arc<dyn AccessPolicy>,
) -> SessionContext {
    SessionContext::new(
        Arc::new(source),
        Arc::new(dispatcher),
        clock,
        access,
        Tuning::default(),
    )
}

// Actor standing upright at `head` with hands hanging at the sides, palms sideways.
pub(crate) fn actor_at(id: u64, name: &str, head: Vec3) -> ActorSnapshot {
    ActorSnapshot {
        position: Some(Vec3::new(head.x, head.y - 1.6, head.z)),
        head: Some(head),
        left_hand: Some(head + Vec3::new(-0.4, -0.7, 0.0)),
        right_hand: Some(head + Vec3::new(0.4, -0.7, 0.0)),
        left_hand_up: Some(Vec3::new(1.0, 0.0, 0.0)),
        right_hand_up: Some(Vec3::new(-1.0, 0.0, 0.0)),
        left_hand_forward: Some(Vec3::new(0.0, 0.0, 1.0)),
        right_hand_forward: Some(Vec3::new(0.0, 0.0, 1.0)),
        ..ActorSnapshot::new(ActorId(id), name)
    }
}

// Messages addressed to one actor, in dispatch order.
pub(crate) fn messages_to(effects: &[EffectRequest], actor: ActorId) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            EffectRequest::Message {
                target: crate::domain::effects::MessageTarget::Actor(a),
                text,
                ..
            } if *a == actor => Some(text.clone()),
            _ => None,
        })
        .collect()
}
