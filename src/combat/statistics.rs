//! Kill records kept by each actor

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Kills of one kind of opponent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRecord {
    pub name: String,
    pub level: i32,
    pub times_killed: u32,
    /// Order of the most recent kill
    pub last_kill: u64,
}

/// Lifetime combat statistics for one actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStatistics {
    kills: HashMap<String, KillRecord>,
    race_kills: BTreeMap<String, u32>,
    best_kill: Option<String>,
    nemesis: Option<String>,
    total_kills: u64,
}

impl CombatStatistics {
    /// Opponent key: repeated spawns of one template share a record
    pub fn key(template: &str, name: &str) -> String {
        format!("{}#{}", template, name)
    }

    /// Record a kill of the opponent identified by `key`
    pub fn record_kill(&mut self, key: &str, name: &str, level: i32, race: Option<&str>) {
        self.total_kills += 1;
        let order = self.total_kills;

        let record = self
            .kills
            .entry(key.to_string())
            .or_insert_with(|| KillRecord {
                name: name.to_string(),
                level,
                times_killed: 0,
                last_kill: order,
            });
        record.times_killed += 1;
        record.level = record.level.max(level);
        record.last_kill = order;
        let times_killed = record.times_killed;
        let level = record.level;

        if let Some(race) = race {
            *self.race_kills.entry(race.to_string()).or_insert(0) += 1;
        }

        let beats_best = match self.best_kill() {
            Some(best) => level > best.level,
            None => true,
        };
        if beats_best {
            self.best_kill = Some(key.to_string());
        }

        // ties go to the most recent kill
        let beats_nemesis = match self.nemesis() {
            Some(nemesis) => times_killed >= nemesis.times_killed,
            None => true,
        };
        if beats_nemesis {
            self.nemesis = Some(key.to_string());
        }
    }

    pub fn kills(&self) -> &HashMap<String, KillRecord> {
        &self.kills
    }

    pub fn record(&self, key: &str) -> Option<&KillRecord> {
        self.kills.get(key)
    }

    /// The highest-level opponent ever killed
    pub fn best_kill(&self) -> Option<&KillRecord> {
        self.best_kill.as_ref().and_then(|key| self.kills.get(key))
    }

    /// The opponent killed most often
    pub fn nemesis(&self) -> Option<&KillRecord> {
        self.nemesis.as_ref().and_then(|key| self.kills.get(key))
    }

    pub fn race_kills(&self, race: &str) -> u32 {
        self.race_kills.get(race).copied().unwrap_or(0)
    }

    pub fn total_kills(&self) -> u64 {
        self.total_kills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_template_accumulates() {
        let mut stats = CombatStatistics::default();
        let key = CombatStatistics::key("monsters/orc", "orc");
        stats.record_kill(&key, "orc", 3, Some("orc"));
        stats.record_kill(&key, "orc", 3, Some("orc"));

        assert_eq!(stats.record(&key).map(|r| r.times_killed), Some(2));
        assert_eq!(stats.race_kills("orc"), 2);
        assert_eq!(stats.total_kills(), 2);
    }

    #[test]
    fn test_best_kill_is_highest_level() {
        let mut stats = CombatStatistics::default();
        stats.record_kill("a#rat", "rat", 1, None);
        stats.record_kill("a#dragon", "dragon", 20, None);
        stats.record_kill("a#orc", "orc", 5, None);

        assert_eq!(stats.best_kill().map(|r| r.name.as_str()), Some("dragon"));
    }

    #[test]
    fn test_nemesis_ties_favor_most_recent() {
        let mut stats = CombatStatistics::default();
        stats.record_kill("a#rat", "rat", 1, None);
        stats.record_kill("a#orc", "orc", 5, None);
        assert_eq!(stats.nemesis().map(|r| r.name.as_str()), Some("orc"));

        stats.record_kill("a#rat", "rat", 1, None);
        assert_eq!(stats.nemesis().map(|r| r.name.as_str()), Some("rat"));

        stats.record_kill("a#orc", "orc", 5, None);
        assert_eq!(stats.nemesis().map(|r| r.name.as_str()), Some("orc"));
    }

    #[test]
    fn test_empty_statistics() {
        let stats = CombatStatistics::default();
        assert!(stats.best_kill().is_none());
        assert!(stats.nemesis().is_none());
        assert_eq!(stats.race_kills("orc"), 0);
    }
}
