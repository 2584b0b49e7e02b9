//! Locations, their occupants, and reference environments

use std::collections::HashMap;

use crate::actors::Combatant;
use crate::capabilities::{Environment, Movement};
use crate::combat::Corpse;
use crate::config::LocationConfig;
use crate::{ActorId, LocationId};

/// A place actors can stand in
pub struct Location {
    id: LocationId,
    name: String,
    occupants: Vec<ActorId>,
    corpses: Vec<Corpse>,
    environment: Option<Box<dyn Environment>>,
}

impl std::fmt::Debug for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Location")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("occupants", &self.occupants)
            .field("corpses", &self.corpses.len())
            .field("environment", &self.environment.is_some())
            .finish()
    }
}

impl Location {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            occupants: Vec::new(),
            corpses: Vec::new(),
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Box::new(environment));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> Option<&dyn Environment> {
        self.environment.as_deref()
    }

    /// Actors present, in arrival order
    pub fn occupants(&self) -> &[ActorId] {
        &self.occupants
    }

    pub fn contains(&self, actor_id: &str) -> bool {
        self.occupants.iter().any(|id| id == actor_id)
    }

    pub(crate) fn enter(&mut self, actor_id: &str) {
        if !self.contains(actor_id) {
            self.occupants.push(actor_id.to_string());
        }
    }

    pub(crate) fn leave(&mut self, actor_id: &str) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|id| id != actor_id);
        self.occupants.len() != before
    }

    pub fn corpses(&self) -> &[Corpse] {
        &self.corpses
    }

    pub(crate) fn add_corpse(&mut self, corpse: Corpse) {
        self.corpses.push(corpse);
    }
}

/// A configurable environment
#[derive(Debug, Clone, Default)]
pub struct Zone {
    violence_prohibited: bool,
    death_message: Option<String>,
    bonuses: HashMap<String, i32>,
    /// Bonuses go only to actors that are not fighting
    peaceful_only: bool,
}

impl Zone {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sanctuary where no one may fight
    pub fn sanctuary() -> Self {
        Self {
            violence_prohibited: true,
            ..Default::default()
        }
    }

    pub fn with_bonus(mut self, bonus: &str, value: i32) -> Self {
        self.bonuses.insert(bonus.to_string(), value);
        self
    }

    pub fn suppressing_death(mut self, message: &str) -> Self {
        self.death_message = Some(message.to_string());
        self
    }

    pub fn peaceful_only(mut self) -> Self {
        self.peaceful_only = true;
        self
    }
}

impl From<&LocationConfig> for Zone {
    fn from(config: &LocationConfig) -> Self {
        Self {
            violence_prohibited: config.violence_prohibited,
            death_message: config.suppress_death.clone(),
            bonuses: config.bonuses.clone(),
            peaceful_only: false,
        }
    }
}

impl Environment for Zone {
    fn environmental_bonus_to(&self, bonus: &str, actor: &Combatant) -> i32 {
        if self.peaceful_only && !actor.hostiles().is_empty() {
            return 0;
        }
        self.bonuses.get(bonus).copied().unwrap_or(0)
    }

    fn violence_prohibited(&self) -> bool {
        self.violence_prohibited
    }

    fn suppress_death(&self) -> Option<String> {
        self.death_message.clone()
    }
}

/// Flees through the first listed exit other than the current location
#[derive(Debug, Clone, Default)]
pub struct FleeRoute {
    exits: Vec<LocationId>,
}

impl FleeRoute {
    pub fn new(exits: &[&str]) -> Self {
        Self {
            exits: exits.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl From<Vec<LocationId>> for FleeRoute {
    fn from(exits: Vec<LocationId>) -> Self {
        Self { exits }
    }
}

impl Movement for FleeRoute {
    fn flee(&mut self, from: &str) -> Option<String> {
        self.exits.iter().find(|exit| exit.as_str() != from).cloned()
    }
}
