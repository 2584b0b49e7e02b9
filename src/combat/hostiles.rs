//! Who is fighting whom
//!
//! Each actor keeps a registry of its attackers. Entries remember when the
//! engagement began and a sequence number so the most recent foe can be
//! found without relying on map order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ActorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    /// Tick at which the attacker was registered
    pub engaged_at: u64,
    /// Registration order
    pub sequence: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostileRegistry {
    entries: HashMap<ActorId, Engagement>,
    next_sequence: u64,
}

impl HostileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attacker; returns false if it was already registered
    pub fn register(&mut self, attacker: &str, now: u64) -> bool {
        if self.entries.contains_key(attacker) {
            return false;
        }
        self.next_sequence += 1;
        self.entries.insert(
            attacker.to_string(),
            Engagement {
                engaged_at: now,
                sequence: self.next_sequence,
            },
        );
        true
    }

    /// Remove an attacker; returns false if it was not registered
    pub fn unregister(&mut self, attacker: &str) -> bool {
        self.entries.remove(attacker).is_some()
    }

    pub fn contains(&self, attacker: &str) -> bool {
        self.entries.contains_key(attacker)
    }

    pub fn engagement(&self, attacker: &str) -> Option<&Engagement> {
        self.entries.get(attacker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Attacker ids, most recently engaged first
    pub fn most_recent_first(&self) -> Vec<ActorId> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.1.sequence.cmp(&a.1.sequence));
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }
}
