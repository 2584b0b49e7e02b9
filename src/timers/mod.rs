//! Heartbeat scheduling
//!
//! Provides:
//! - HeartBeat: per-actor scheduler state (heal countdowns, slow alternation)
//! - HeartbeatRegistry: which actors beat, in a stable order
//!
//! Time is a caller-supplied tick counter; nothing here reads a clock.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::actors::Vital;
use crate::ActorId;

/// Scheduler-owned state for one actor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartBeat {
    /// Actor that owns this heartbeat
    pub actor_id: ActorId,
    /// Tick at which the heartbeat last fired
    pub last_fired: Option<u64>,
    /// Set when slow cost an attack round on the previous beat
    pub was_slowed_last_round: bool,
    hit_countdown: i32,
    spell_countdown: i32,
    stamina_countdown: i32,
}

impl HeartBeat {
    pub fn new(actor_id: &str) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            ..Default::default()
        }
    }

    /// A heartbeat fires at most once per tick
    pub fn is_due(&self, now: u64) -> bool {
        !matches!(self.last_fired, Some(last) if last >= now)
    }

    /// Record that the heartbeat fired
    pub fn reset(&mut self, now: u64) {
        self.last_fired = Some(now);
    }

    pub fn countdown(&self, vital: Vital) -> i32 {
        match vital {
            Vital::Hit => self.hit_countdown,
            Vital::Spell => self.spell_countdown,
            Vital::Stamina => self.stamina_countdown,
        }
    }

    pub fn set_countdown(&mut self, vital: Vital, value: i32) {
        match vital {
            Vital::Hit => self.hit_countdown = value,
            Vital::Spell => self.spell_countdown = value,
            Vital::Stamina => self.stamina_countdown = value,
        }
    }

    /// Decide whether slow of the given intensity costs a round this beat
    ///
    /// Only odd intensities slow; a skipped round is never followed by another.
    pub fn slow_skips_round(&mut self, slow: i32) -> bool {
        let skip = slow.rem_euclid(2) == 1 && !self.was_slowed_last_round;
        self.was_slowed_last_round = skip;
        skip
    }
}

/// Active heartbeats, iterated in actor-id order
#[derive(Debug, Clone, Default)]
pub struct HeartbeatRegistry {
    heartbeats: BTreeMap<ActorId, HeartBeat>,
}

impl HeartbeatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an actor's heartbeat; existing state is kept
    pub fn set_heartbeat(&mut self, actor_id: &str) -> bool {
        if self.heartbeats.contains_key(actor_id) {
            return false;
        }
        self.heartbeats
            .insert(actor_id.to_string(), HeartBeat::new(actor_id));
        true
    }

    pub fn remove_heartbeat(&mut self, actor_id: &str) -> bool {
        self.heartbeats.remove(actor_id).is_some()
    }

    pub fn is_active(&self, actor_id: &str) -> bool {
        self.heartbeats.contains_key(actor_id)
    }

    pub fn get(&self, actor_id: &str) -> Option<&HeartBeat> {
        self.heartbeats.get(actor_id)
    }

    pub fn get_mut(&mut self, actor_id: &str) -> Option<&mut HeartBeat> {
        self.heartbeats.get_mut(actor_id)
    }

    /// Ids of heartbeats that have not yet fired at `now`
    pub fn due(&self, now: u64) -> Vec<ActorId> {
        self.heartbeats
            .values()
            .filter(|hb| hb.is_due(now))
            .map(|hb| hb.actor_id.clone())
            .collect()
    }

    pub fn heartbeat_count(&self) -> usize {
        self.heartbeats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_fires_once_per_tick() {
        let mut hb = HeartBeat::new("orc");
        assert!(hb.is_due(0));
        hb.reset(0);
        assert!(!hb.is_due(0));
        assert!(hb.is_due(1));
    }

    #[test]
    fn test_slow_alternates() {
        let mut hb = HeartBeat::new("orc");
        assert!(hb.slow_skips_round(1));
        assert!(!hb.slow_skips_round(1));
        assert!(hb.slow_skips_round(3));
        assert!(!hb.slow_skips_round(0));
        assert!(!hb.was_slowed_last_round);
    }

    #[test]
    fn test_even_slow_intensity_never_skips() {
        let mut hb = HeartBeat::new("orc");
        for _ in 0..4 {
            assert!(!hb.slow_skips_round(2));
        }
        assert!(hb.slow_skips_round(5));
    }

    #[test]
    fn test_countdowns() {
        let mut hb = HeartBeat::new("orc");
        assert_eq!(hb.countdown(Vital::Spell), 0);
        hb.set_countdown(Vital::Spell, 12);
        assert_eq!(hb.countdown(Vital::Spell), 12);
        assert_eq!(hb.countdown(Vital::Hit), 0);
    }

    #[test]
    fn test_registry_order_and_idempotence() {
        let mut registry = HeartbeatRegistry::new();
        assert!(registry.set_heartbeat("zombie"));
        assert!(registry.set_heartbeat("archer"));
        assert!(!registry.set_heartbeat("zombie"));
        assert_eq!(registry.heartbeat_count(), 2);
        assert_eq!(registry.due(0), vec!["archer", "zombie"]);

        if let Some(hb) = registry.get_mut("archer") {
            hb.reset(0);
        }
        assert_eq!(registry.due(0), vec!["zombie"]);

        assert!(registry.remove_heartbeat("zombie"));
        assert!(!registry.remove_heartbeat("zombie"));
        assert!(!registry.is_active("zombie"));
    }
}
