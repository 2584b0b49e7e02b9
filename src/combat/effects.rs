//! Combat status modifiers
//!
//! Modifiers like haste, slow, or damage reflection come from two places:
//! - Equipment and registered modifier objects (queried via the inventory)
//! - Timed effects attached to an actor, which decay every heartbeat

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status modifiers that change combat formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatModifier {
    /// An extra attack round every heartbeat
    Haste,
    /// Loses every other attack round
    Slow,
    /// To-hit x0.85, damage x0.75
    Enfeebled,
    /// To-hit x1.15, damage x1.25
    Fortified,
    Poison,
    /// Soak x0.9
    Paralysis,
    /// To-hit and defend x0.9
    Disease,
    /// Percentage (capped) of incoming damage sent back
    DamageReflection,
}

impl CombatModifier {
    /// Get all modifiers
    pub fn all() -> &'static [CombatModifier] {
        &[
            CombatModifier::Haste,
            CombatModifier::Slow,
            CombatModifier::Enfeebled,
            CombatModifier::Fortified,
            CombatModifier::Poison,
            CombatModifier::Paralysis,
            CombatModifier::Disease,
            CombatModifier::DamageReflection,
        ]
    }

    /// The property name equipment uses for this modifier
    pub fn key(&self) -> &'static str {
        match self {
            CombatModifier::Haste => "haste",
            CombatModifier::Slow => "slow",
            CombatModifier::Enfeebled => "enfeebled",
            CombatModifier::Fortified => "fortified",
            CombatModifier::Poison => "poison",
            CombatModifier::Paralysis => "paralysis",
            CombatModifier::Disease => "disease",
            CombatModifier::DamageReflection => "damage reflection",
        }
    }
}

impl FromStr for CombatModifier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "haste" | "hasted" => Ok(CombatModifier::Haste),
            "slow" | "slowed" => Ok(CombatModifier::Slow),
            "enfeebled" | "enfeeble" => Ok(CombatModifier::Enfeebled),
            "fortified" | "fortify" => Ok(CombatModifier::Fortified),
            "poison" | "poisoned" => Ok(CombatModifier::Poison),
            "paralysis" | "paralyzed" => Ok(CombatModifier::Paralysis),
            "disease" | "diseased" => Ok(CombatModifier::Disease),
            "damage reflection" | "damage_reflection" | "reflection" => {
                Ok(CombatModifier::DamageReflection)
            }
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for CombatModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A timed modifier attached to an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    pub modifier: CombatModifier,
    /// Remaining duration in heartbeats
    pub remaining_ticks: u32,
    /// Intensity; 1 for plain flags, a percentage for damage reflection
    pub magnitude: i32,
}

impl StatusEffect {
    /// Create a new status effect
    pub fn new(modifier: CombatModifier, duration_ticks: u32, magnitude: i32) -> Self {
        Self {
            modifier,
            remaining_ticks: duration_ticks,
            magnitude,
        }
    }

    /// Decay by one heartbeat
    pub fn tick(&mut self) {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
    }

    /// Check if effect has expired
    pub fn is_expired(&self) -> bool {
        self.remaining_ticks == 0
    }
}

/// Timed effects on a single actor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    effects: Vec<StatusEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect; an existing one of the same kind is refreshed instead
    pub fn add(&mut self, effect: StatusEffect) {
        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|e| e.modifier == effect.modifier)
        {
            existing.remaining_ticks = existing.remaining_ticks.max(effect.remaining_ticks);
            existing.magnitude = existing.magnitude.max(effect.magnitude);
        } else {
            self.effects.push(effect);
        }
    }

    /// Magnitude of an active effect, 0 if absent
    pub fn magnitude(&self, modifier: CombatModifier) -> i32 {
        self.effects
            .iter()
            .find(|e| e.modifier == modifier && !e.is_expired())
            .map(|e| e.magnitude)
            .unwrap_or(0)
    }

    pub fn has(&self, modifier: CombatModifier) -> bool {
        self.magnitude(modifier) != 0
    }

    /// Decay all effects, returning the ones that expired this tick
    pub fn tick_all(&mut self) -> Vec<CombatModifier> {
        for effect in &mut self.effects {
            effect.tick();
        }

        let expired = self
            .effects
            .iter()
            .filter(|e| e.is_expired())
            .map(|e| e.modifier)
            .collect();
        self.effects.retain(|e| !e.is_expired());
        expired
    }
}
