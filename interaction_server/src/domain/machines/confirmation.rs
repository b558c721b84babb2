use std::collections::HashMap;

use crate::domain::entities::ActorId;
use crate::domain::machines::cooldown::CooldownRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Opened,
    AlreadyPending,
    CoolingDown,
}

#[derive(Debug, Clone, Copy)]
struct Pending<K> {
    opened_at: u64,
    kind: K,
}

/// Two-phase gesture: a first proximity condition opens a timed request, a second,
/// distinct condition observed in a later poll confirms it.
#[derive(Debug, Clone)]
pub struct ConfirmationFlow<K> {
    window_ms: u64,
    cooldown_ms: u64,
    pending: HashMap<ActorId, Pending<K>>,
    cooldowns: CooldownRegistry<ActorId>,
}

impl<K> ConfirmationFlow<K>
where
    K: Copy,
{
    pub fn new(window_ms: u64, cooldown_ms: u64) -> Self {
        Self {
            window_ms,
            cooldown_ms,
            pending: HashMap::new(),
            cooldowns: CooldownRegistry::new(),
        }
    }

    fn is_live(&self, pending: &Pending<K>, now: u64) -> bool {
        now.saturating_sub(pending.opened_at) <= self.window_ms
    }

    /// Opens a request unless one is already pending or the action is cooling down.
    pub fn request(&mut self, actor: ActorId, kind: K, now: u64) -> RequestOutcome {
        if self.pending_kind(actor, now).is_some() {
            return RequestOutcome::AlreadyPending;
        }
        if !self.cooldowns.elapsed(&actor, now, self.cooldown_ms) {
            return RequestOutcome::CoolingDown;
        }

        self.pending.insert(
            actor,
            Pending {
                opened_at: now,
                kind,
            },
        );
        self.cooldowns.mark(actor, now);
        RequestOutcome::Opened
    }

    /// Consumes the pending request when `holds` is observed after it was opened.
    pub fn confirm(&mut self, actor: ActorId, holds: bool, now: u64) -> Option<K> {
        let pending = *self.pending.get(&actor)?;
        if !self.is_live(&pending, now) {
            self.pending.remove(&actor);
            return None;
        }
        if !holds || now <= pending.opened_at {
            return None;
        }

        self.pending.remove(&actor);
        self.cooldowns.mark(actor, now);
        Some(pending.kind)
    }

    /// Kind of the live request for this actor, if any. Expired entries read as absent.
    pub fn pending_kind(&self, actor: ActorId, now: u64) -> Option<K> {
        self.pending
            .get(&actor)
            .filter(|p| self.is_live(p, now))
            .map(|p| p.kind)
    }

    /// Drops pending requests of actors that fail `keep`, without reporting them.
    pub fn retain_actors(&mut self, mut keep: impl FnMut(ActorId) -> bool) {
        self.pending.retain(|actor, _| keep(*actor));
    }

    /// Removes and returns requests whose window has passed. Spent cooldowns go too.
    pub fn sweep_expired(&mut self, now: u64) -> Vec<(ActorId, K)> {
        self.cooldowns.prune(now, self.cooldown_ms);
        let window = self.window_ms;
        let mut expired = Vec::new();
        self.pending.retain(|actor, p| {
            let live = now.saturating_sub(p.opened_at) <= window;
            if !live {
                expired.push((*actor, p.kind));
            }
            live
        });
        expired
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
