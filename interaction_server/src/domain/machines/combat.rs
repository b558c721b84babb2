use std::collections::HashMap;

use crate::domain::entities::ActorId;
use crate::domain::machines::cooldown::CooldownRegistry;

/// Order-independent key for a pair of actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(ActorId, ActorId);

impl PairKey {
    pub fn new(a: ActorId, b: ActorId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn actors(&self) -> (ActorId, ActorId) {
        (self.0, self.1)
    }
}

/// Consent agreements (symmetric) plus directional hit cooldowns.
#[derive(Debug, Clone)]
pub struct CombatLedger {
    agreement_ms: u64,
    agreements: HashMap<PairKey, u64>,
    hits: CooldownRegistry<(ActorId, ActorId)>,
}

impl CombatLedger {
    pub fn new(agreement_ms: u64) -> Self {
        Self {
            agreement_ms,
            agreements: HashMap::new(),
            hits: CooldownRegistry::new(),
        }
    }

    /// Starts an agreement unless a live one exists. Returns true when a new one opened.
    pub fn open(&mut self, a: ActorId, b: ActorId, now: u64) -> bool {
        let key = PairKey::new(a, b);
        match self.agreements.get(&key) {
            Some(&expires) if now <= expires => false,
            _ => {
                self.agreements.insert(key, now + self.agreement_ms);
                true
            }
        }
    }

    pub fn expires_at(&self, a: ActorId, b: ActorId) -> Option<u64> {
        self.agreements.get(&PairKey::new(a, b)).copied()
    }

    /// Whether the pair may damage each other. Expired agreements are evicted here.
    pub fn can_fight(&mut self, a: ActorId, b: ActorId, now: u64) -> bool {
        let key = PairKey::new(a, b);
        match self.agreements.get(&key) {
            Some(&expires) if now <= expires => true,
            Some(_) => {
                self.agreements.remove(&key);
                false
            }
            None => false,
        }
    }

    /// Removes and returns every agreement past its expiry.
    pub fn sweep_expired(&mut self, now: u64) -> Vec<PairKey> {
        let mut expired = Vec::new();
        self.agreements.retain(|key, expires| {
            let live = now <= *expires;
            if !live {
                expired.push(*key);
            }
            live
        });
        expired
    }

    pub fn hit_ready(&self, attacker: ActorId, target: ActorId, now: u64, window_ms: u64) -> bool {
        self.hits.elapsed(&(attacker, target), now, window_ms)
    }

    pub fn mark_hit(&mut self, attacker: ActorId, target: ActorId, now: u64) {
        self.hits.mark((attacker, target), now);
    }

    pub fn prune_hits(&mut self, now: u64, horizon_ms: u64) {
        self.hits.prune(now, horizon_ms);
    }

    pub fn active_count(&self) -> usize {
        self.agreements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ActorId = ActorId(1);
    const B: ActorId = ActorId(2);

    #[test]
    fn when_pair_order_differs_then_key_is_the_same() {
        assert_eq!(PairKey::new(A, B), PairKey::new(B, A));
    }

    #[test]
    fn when_agreement_opens_then_it_expires_ten_minutes_later() {
        let mut ledger = CombatLedger::new(600_000);

        assert!(ledger.open(B, A, 1_000));
        assert_eq!(ledger.expires_at(A, B), Some(601_000));
        assert!(!ledger.open(A, B, 2_000));
        assert!(ledger.can_fight(A, B, 601_000));
    }

    #[test]
    fn when_agreement_is_read_past_expiry_then_it_is_evicted() {
        let mut ledger = CombatLedger::new(600_000);
        ledger.open(A, B, 0);

        assert!(!ledger.can_fight(B, A, 600_001));
        assert_eq!(ledger.active_count(), 0);
        assert!(ledger.open(A, B, 600_002));
    }

    #[test]
    fn when_hit_cooldown_is_marked_then_it_is_directional() {
        let mut ledger = CombatLedger::new(600_000);
        ledger.mark_hit(A, B, 1_000);

        assert!(!ledger.hit_ready(A, B, 1_100, 150));
        assert!(ledger.hit_ready(B, A, 1_100, 150));
        assert!(ledger.hit_ready(A, B, 1_150, 150));
    }

    #[test]
    fn when_swept_then_only_expired_pairs_are_returned() {
        let mut ledger = CombatLedger::new(100);
        ledger.open(A, B, 0);
        ledger.open(A, ActorId(3), 500);

        let expired = ledger.sweep_expired(550);

        assert_eq!(expired, vec![PairKey::new(A, B)]);
        assert_eq!(ledger.active_count(), 1);
    }
}
