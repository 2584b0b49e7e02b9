//! Table-free reference capabilities
//!
//! Small in-memory providers used by the arena driver and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Attributes, BonusProvider, Factions, Occupant, Progression, Skills};
use crate::combat::AttackEntry;
use crate::ActorId;

/// Skill modifiers by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillSet {
    skills: HashMap<String, i32>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skill(mut self, skill: &str, value: i32) -> Self {
        self.skills.insert(skill.to_string(), value);
        self
    }

    pub fn set(&mut self, skill: &str, value: i32) {
        self.skills.insert(skill.to_string(), value);
    }
}

impl Skills for SkillSet {
    fn skill_modifier(&self, skill: &str) -> i32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }
}

/// Raw attribute scores
///
/// The effective value of a score is `score - 5` (never negative) and its
/// bonus is `(score - 10) / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
}

impl Default for AttributeScores {
    /// Average scores: no effective value beyond 5, no bonus
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
        }
    }
}

impl AttributeScores {
    /// Scores of 5 everywhere: zero effective value, negative bonuses
    pub fn feeble() -> Self {
        Self {
            strength: 5,
            dexterity: 5,
            constitution: 5,
            intelligence: 5,
            wisdom: 5,
        }
    }

    fn effective(score: i32) -> i32 {
        (score - 5).max(0)
    }

    fn bonus(score: i32) -> i32 {
        (score - 10) / 2
    }
}

impl Attributes for AttributeScores {
    fn strength(&self) -> i32 {
        Self::effective(self.strength)
    }

    fn dexterity(&self) -> i32 {
        Self::effective(self.dexterity)
    }

    fn constitution(&self) -> i32 {
        Self::effective(self.constitution)
    }

    fn intelligence(&self) -> i32 {
        Self::effective(self.intelligence)
    }

    fn wisdom(&self) -> i32 {
        Self::effective(self.wisdom)
    }

    fn strength_bonus(&self) -> i32 {
        Self::bonus(self.strength)
    }

    fn dexterity_bonus(&self) -> i32 {
        Self::bonus(self.dexterity)
    }

    fn constitution_bonus(&self) -> i32 {
        Self::bonus(self.constitution)
    }

    fn intelligence_bonus(&self) -> i32 {
        Self::bonus(self.intelligence)
    }

    fn wisdom_bonus(&self) -> i32 {
        Self::bonus(self.wisdom)
    }
}

/// A fixed table of bonuses, usable for any influence source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticBonuses {
    #[serde(default)]
    bonuses: HashMap<String, i32>,
    #[serde(default)]
    attacks: Vec<AttackEntry>,
    #[serde(default)]
    trait_roots: Vec<String>,
}

impl StaticBonuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bonus(mut self, bonus: &str, value: i32) -> Self {
        *self.bonuses.entry(bonus.to_string()).or_insert(0) += value;
        self
    }

    pub fn with_extra_attack(mut self, attack: AttackEntry) -> Self {
        self.attacks.push(attack);
        self
    }

    pub fn with_trait_root(mut self, root: &str) -> Self {
        self.trait_roots.push(root.to_string());
        self
    }
}

impl BonusProvider for StaticBonuses {
    fn bonus_to(&self, bonus: &str) -> i32 {
        self.bonuses.get(bonus).copied().unwrap_or(0)
    }

    fn extra_attacks(&self) -> Vec<AttackEntry> {
        self.attacks.clone()
    }

    fn has_trait_root(&self, root: &str) -> bool {
        self.trait_roots.iter().any(|r| r == root)
    }
}

/// Standing at or below which members of a faction are attacked on sight
pub const AGGRESSIVE_DISPOSITION: i32 = -500;

/// Faction memberships and this actor's standing toward other factions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionMembership {
    memberships: Vec<String>,
    dispositions: HashMap<String, i32>,
    kills: HashMap<String, u32>,
}

impl FactionMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_of(mut self, faction: &str) -> Self {
        self.memberships.push(faction.to_string());
        self
    }

    /// Start out hostile toward a faction
    pub fn hostile_to(mut self, faction: &str) -> Self {
        self.dispositions
            .insert(faction.to_string(), AGGRESSIVE_DISPOSITION * 2);
        self
    }

    pub fn disposition(&self, faction: &str) -> i32 {
        self.dispositions.get(faction).copied().unwrap_or(0)
    }

    /// Members of a faction this actor has killed
    pub fn kills_of(&self, faction: &str) -> u32 {
        self.kills.get(faction).copied().unwrap_or(0)
    }
}

impl Factions for FactionMembership {
    fn factions(&self) -> Vec<String> {
        self.memberships.clone()
    }

    fn update_disposition(&mut self, faction: &str, delta: i32, is_kill: bool) {
        *self.dispositions.entry(faction.to_string()).or_insert(0) += delta;
        if is_kill {
            *self.kills.entry(faction.to_string()).or_insert(0) += 1;
        }
    }

    fn aggressive_targets_in(&self, occupants: &[Occupant]) -> Vec<ActorId> {
        occupants
            .iter()
            .filter(|o| {
                o.factions
                    .iter()
                    .any(|f| self.disposition(f) <= AGGRESSIVE_DISPOSITION)
            })
            .map(|o| o.id.clone())
            .collect()
    }
}

/// Level progression where experience value grows with level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterLevel {
    level: i32,
    experience: i64,
}

impl MonsterLevel {
    pub fn new(level: i32) -> Self {
        Self {
            level: level.max(1),
            experience: 0,
        }
    }

    pub fn experience(&self) -> i64 {
        self.experience
    }
}

impl Progression for MonsterLevel {
    fn level(&self) -> i32 {
        self.level
    }

    fn experience_value(&self) -> i32 {
        1000 + 1000 * self.level * (self.level + 1) / 2
    }

    fn add_experience(&mut self, amount: i32) {
        self.experience += amount as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_effective_values_and_bonuses() {
        let scores = AttributeScores {
            constitution: 20,
            strength: 3,
            ..Default::default()
        };
        assert_eq!(scores.constitution(), 15);
        assert_eq!(scores.constitution_bonus(), 5);
        assert_eq!(scores.strength(), 0);
        assert_eq!(scores.strength_bonus(), -3);
        assert_eq!(scores.dexterity_bonus(), 0);
    }

    #[test]
    fn test_static_bonuses_accumulate() {
        let bonuses = StaticBonuses::new()
            .with_bonus("AttackBonus", 3)
            .with_bonus("AttackBonus", 2)
            .with_trait_root("fighter");
        assert_eq!(bonuses.bonus_to("AttackBonus"), 5);
        assert_eq!(bonuses.bonus_to("DamageBonus"), 0);
        assert!(bonuses.has_trait_root("fighter"));
        assert!(!bonuses.has_trait_root("mage"));
    }

    #[test]
    fn test_faction_dispositions() {
        let mut factions = FactionMembership::new().member_of("town guard");
        factions.update_disposition("goblins", -3, true);
        factions.update_disposition("goblins", -2, false);

        assert_eq!(factions.factions(), vec!["town guard".to_string()]);
        assert_eq!(factions.disposition("goblins"), -5);
        assert_eq!(factions.kills_of("goblins"), 1);
    }

    #[test]
    fn test_aggressive_targets() {
        let factions = FactionMembership::new().hostile_to("goblins");
        let occupants = vec![
            Occupant {
                id: "gob".to_string(),
                factions: vec!["goblins".to_string()],
            },
            Occupant {
                id: "merchant".to_string(),
                factions: vec!["traders".to_string()],
            },
        ];
        assert_eq!(factions.aggressive_targets_in(&occupants), vec!["gob".to_string()]);
    }

    #[test]
    fn test_monster_level_experience() {
        let mut level = MonsterLevel::new(3);
        assert_eq!(level.experience_value(), 7000);
        level.add_experience(25);
        assert_eq!(level.experience(), 25);
        assert_eq!(MonsterLevel::new(0).level(), 1);
    }
}
