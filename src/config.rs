//! Configuration
//!
//! Settings are layered with figment: built-in defaults, then an optional
//! TOML file, then `MUDCOMBAT_*` environment variables (nested keys use
//! `__`, e.g. `MUDCOMBAT_COMBAT__SEED=7`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::capabilities::{AttributeScores, Item};
use crate::combat::AttackEntry;
use crate::error::CombatError;

/// Upper bound for `reflection_cap`; reflected damage must shrink on every bounce
pub const MAX_REFLECTION_CAP: i32 = 99;

/// Tuning constants for the combat engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Wall-clock cadence of one heartbeat when pacing in real time
    pub heartbeat_interval_ms: u64,
    /// Base maximum for each vital unless an actor sets its own
    pub default_vital_maximum: i32,
    /// Ticks between heals before rate bonuses
    pub heal_interval: i32,
    /// Countdown decrement per heartbeat
    pub heal_step: i32,
    /// Heal interval floor
    pub min_heal_interval: i32,
    pub max_wimpy: i32,
    /// Highest damage reflection percentage, at most [`MAX_REFLECTION_CAP`]
    pub reflection_cap: i32,
    pub unarmed_to_hit: i32,
    pub unarmed_damage: i32,
    /// To-hit base for attacks granted by modifier objects
    pub bonus_attack_to_hit: i32,
    /// Seed for the world's random number generator; random when unset
    pub seed: Option<u64>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 2000,
            default_vital_maximum: 30,
            heal_interval: 20,
            heal_step: 2,
            min_heal_interval: 4,
            max_wimpy: 70,
            reflection_cap: 50,
            unarmed_to_hit: 50,
            unarmed_damage: 10,
            bonus_attack_to_hit: 50,
            seed: None,
        }
    }
}

impl CombatConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Reject tuning values the engine cannot run with
    pub fn validate(&self) -> Result<(), CombatError> {
        if !(0..=MAX_REFLECTION_CAP).contains(&self.reflection_cap) {
            return Err(CombatError::InvalidConfig(format!(
                "reflection_cap must be within 0..={}, got {}",
                MAX_REFLECTION_CAP, self.reflection_cap
            )));
        }
        if !(0..=100).contains(&self.max_wimpy) {
            return Err(CombatError::InvalidConfig(format!(
                "max_wimpy must be within 0..=100, got {}",
                self.max_wimpy
            )));
        }
        if self.heal_step <= 0 {
            return Err(CombatError::InvalidConfig(format!(
                "heal_step must be positive, got {}",
                self.heal_step
            )));
        }
        Ok(())
    }
}

/// A location in an arena scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub id: String,
    pub name: Option<String>,
    pub violence_prohibited: bool,
    /// Message shown when this place saves a durable actor from death
    pub suppress_death: Option<String>,
    /// Environmental bonuses granted to everyone present
    pub bonuses: HashMap<String, i32>,
}

/// An actor in an arena scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub id: String,
    pub name: String,
    pub template: Option<String>,
    pub race: Option<String>,
    pub location: String,
    pub level: i32,
    pub attributes: Option<AttributeScores>,
    pub skills: HashMap<String, i32>,
    pub attacks: Vec<AttackEntry>,
    pub weapon: Option<Item>,
    pub offhand: Option<Item>,
    pub armor: Option<Item>,
    /// Bonuses per influence source name ("race", "guild", ...)
    pub bonuses: HashMap<String, HashMap<String, i32>>,
    pub factions: Vec<String>,
    pub hostile_to: Vec<String>,
    pub flee_to: Vec<String>,
    pub wimpy: i32,
    pub durable: bool,
    pub immortal: bool,
    pub ethereal: bool,
    /// Start the fight: register this actor as an attacker of these ids
    pub attacks_on_start: Vec<String>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            template: None,
            race: None,
            location: String::new(),
            level: 1,
            attributes: None,
            skills: HashMap::new(),
            attacks: Vec::new(),
            weapon: None,
            offhand: None,
            armor: None,
            bonuses: HashMap::new(),
            factions: Vec::new(),
            hostile_to: Vec::new(),
            flee_to: Vec::new(),
            wimpy: 0,
            durable: false,
            immortal: false,
            ethereal: false,
            attacks_on_start: Vec::new(),
        }
    }
}

/// A runnable scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub locations: Vec<LocationConfig>,
    pub actors: Vec<ActorConfig>,
}

/// Everything the driver reads from its configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub combat: CombatConfig,
    pub arena: ArenaConfig,
}

impl Settings {
    /// Load settings from defaults, an optional TOML file, and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, CombatError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let settings: Settings = figment
            .merge(Env::prefixed("MUDCOMBAT_").split("__"))
            .extract()?;
        settings.combat.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string over the defaults
    pub fn from_toml(toml: &str) -> Result<Self, CombatError> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::string(toml))
            .extract()?;
        settings.combat.validate()?;
        Ok(settings)
    }
}
