use std::collections::HashMap;
use std::hash::Hash;

use crate::domain::entities::ActorId;

/// Keyed "last fired" timestamps. Every rate limit in the service goes through one
/// of these instead of an ad hoc timestamp map.
#[derive(Debug, Clone)]
pub struct CooldownRegistry<K> {
    last_fired: HashMap<K, u64>,
}

impl<K> Default for CooldownRegistry<K> {
    fn default() -> Self {
        Self {
            last_fired: HashMap::new(),
        }
    }
}

impl<K> CooldownRegistry<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the key never fired or at least `window_ms` passed since it did.
    pub fn elapsed(&self, key: &K, now: u64, window_ms: u64) -> bool {
        match self.last_fired.get(key) {
            Some(&at) => now.saturating_sub(at) >= window_ms,
            None => true,
        }
    }

    pub fn mark(&mut self, key: K, now: u64) {
        self.last_fired.insert(key, now);
    }

    /// Checks and marks in one step; returns whether the action may fire.
    pub fn try_fire(&mut self, key: K, now: u64, window_ms: u64) -> bool {
        if !self.elapsed(&key, now, window_ms) {
            return false;
        }
        self.mark(key, now);
        true
    }

    pub fn last_fired(&self, key: &K) -> Option<u64> {
        self.last_fired.get(key).copied()
    }

    /// Drops entries older than `horizon_ms`; they can no longer block anything
    /// whose window is at most the horizon.
    pub fn prune(&mut self, now: u64, horizon_ms: u64) {
        self.last_fired
            .retain(|_, at| now.saturating_sub(*at) < horizon_ms);
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}

/// Feature-scoped keys for the shared per-actor registry. Two-phase buttons keep
/// their cooldowns inside their `ConfirmationFlow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKey {
    Gesture(ActorId),
    Drink(ActorId),
    StoneTeleport(ActorId),
    TavernList(ActorId),
}
