//! A living actor capable of fighting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CombatContext, Vital, Vitals};
use crate::aggregate::InfluenceSource;
use crate::capabilities::ModifierCategory;
use crate::combat::{
    ActiveEffects, AttackEntry, AttackKind, CombatEvent, CombatModifier, CombatStatistics,
    HostileRegistry, StatusEffect,
};
use crate::error::CombatError;
use crate::{ActorId, LocationId};

/// Persisted view of a combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: ActorId,
    pub name: String,
    pub template: String,
    pub hit_points: i32,
    pub spell_points: i32,
    pub stamina_points: i32,
    pub wimpy: i32,
    pub dead: bool,
    pub statistics: CombatStatistics,
    pub saved_at: DateTime<Utc>,
}

pub struct Combatant {
    id: ActorId,
    name: String,
    /// What this actor was spawned from; shared by every spawn of one kind
    template: String,
    race: Option<String>,
    context: CombatContext,
    vitals: Vitals,
    effects: ActiveEffects,
    hostiles: HostileRegistry,
    statistics: CombatStatistics,
    base_attacks: Vec<AttackEntry>,
    combat_delay: u32,
    spell_action_delay: u32,
    wimpy: i32,
    durable: bool,
    immortal: bool,
    invulnerable: bool,
    ethereal: bool,
    on_kill_list: bool,
    dead: bool,
    location: Option<LocationId>,
}

impl std::fmt::Debug for Combatant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combatant")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("template", &self.template)
            .field("vitals", &self.vitals)
            .field("hostiles", &self.hostiles.len())
            .field("dead", &self.dead)
            .field("location", &self.location)
            .field("context", &self.context)
            .finish()
    }
}

impl Combatant {
    pub fn new(id: &str, name: &str, context: CombatContext) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            template: name.to_string(),
            race: None,
            context,
            vitals: Vitals::new(),
            effects: ActiveEffects::new(),
            hostiles: HostileRegistry::new(),
            statistics: CombatStatistics::default(),
            base_attacks: Vec::new(),
            combat_delay: 0,
            spell_action_delay: 0,
            wimpy: 0,
            durable: false,
            immortal: false,
            invulnerable: false,
            ethereal: false,
            on_kill_list: false,
            dead: false,
            location: None,
        }
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.template = template.to_string();
        self
    }

    pub fn with_race(mut self, race: &str) -> Self {
        self.race = Some(race.to_string());
        self
    }

    pub fn with_base_max(mut self, vital: Vital, value: i32) -> Self {
        self.vitals.set_base_max(vital, value);
        self
    }

    /// Player-like actor: persisted, kept in the world after death
    pub fn durable(mut self) -> Self {
        self.durable = true;
        self
    }

    pub fn immortal(mut self) -> Self {
        self.immortal = true;
        self
    }

    pub fn invulnerable(mut self) -> Self {
        self.invulnerable = true;
        self
    }

    pub fn ethereal(mut self) -> Self {
        self.ethereal = true;
        self
    }

    pub fn with_wimpy(mut self, wimpy: i32) -> Self {
        self.set_wimpy(wimpy);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn race(&self) -> Option<&str> {
        self.race.as_deref()
    }

    pub fn context(&self) -> &CombatContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut CombatContext {
        &mut self.context
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut ActiveEffects {
        &mut self.effects
    }

    pub fn add_effect(&mut self, effect: StatusEffect) {
        self.effects.add(effect);
    }

    pub fn hostiles(&self) -> &HostileRegistry {
        &self.hostiles
    }

    pub fn hostiles_mut(&mut self) -> &mut HostileRegistry {
        &mut self.hostiles
    }

    pub fn statistics(&self) -> &CombatStatistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut CombatStatistics {
        &mut self.statistics
    }

    pub fn base_attacks(&self) -> &[AttackEntry] {
        &self.base_attacks
    }

    /// Add an innate attack; weapon attacks and zero damage are rejected
    pub fn add_attack(&mut self, kind: AttackKind, to_hit: i32, damage: i32) -> Result<(), CombatError> {
        let entry = AttackEntry::new(kind, to_hit, damage);
        if kind.is_weapon_attack() || !entry.is_valid() {
            return Err(CombatError::InvalidAttack(format!("{} ({} damage)", kind, damage)));
        }
        self.base_attacks.push(entry);
        Ok(())
    }

    /// Intensity of a status modifier from equipment and timed effects
    pub fn status(&self, modifier: CombatModifier) -> i32 {
        let equipped = self
            .context
            .inventory()
            .map(|inv| inv.modifier(ModifierCategory::CombatModifiers, modifier.key()))
            .unwrap_or(0);
        equipped + self.effects.magnitude(modifier)
    }

    pub fn has_status(&self, modifier: CombatModifier) -> bool {
        self.status(modifier) != 0
    }

    pub fn combat_delay(&self) -> u32 {
        self.combat_delay
    }

    pub fn add_combat_delay(&mut self, ticks: u32) {
        self.combat_delay += ticks;
    }

    /// Count one delayed attack attempt, returning what remains
    pub fn consume_combat_delay(&mut self) -> u32 {
        self.combat_delay = self.combat_delay.saturating_sub(1);
        self.combat_delay
    }

    pub fn spell_action_delay(&self) -> u32 {
        self.spell_action_delay
    }

    pub fn add_spell_action(&mut self, ticks: u32) {
        self.spell_action_delay += ticks;
    }

    pub fn decrement_spell_action(&mut self) {
        self.spell_action_delay = self.spell_action_delay.saturating_sub(1);
    }

    pub fn wimpy(&self) -> i32 {
        self.wimpy
    }

    /// Set the flee threshold, never below 0
    ///
    /// The upper bound is the world's configured `max_wimpy`, applied by
    /// [`crate::World::set_wimpy`] and at spawn.
    pub fn set_wimpy(&mut self, value: i32) -> i32 {
        self.wimpy = value.max(0);
        self.wimpy
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn is_immortal(&self) -> bool {
        self.immortal
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    /// Ethereal by flag or by an ethereal trait
    pub fn is_ethereal(&self) -> bool {
        self.ethereal
            || self
                .context
                .source(InfluenceSource::Trait)
                .is_some_and(|traits| traits.has_trait_root("ethereal"))
    }

    /// Non-durable actors are always fair game
    pub fn on_kill_list(&self) -> bool {
        !self.durable || self.on_kill_list
    }

    /// Opt in or out of player combat; returns the new state
    pub fn toggle_kill_list(&mut self) -> bool {
        if self.durable {
            self.on_kill_list = !self.on_kill_list;
        }
        self.on_kill_list()
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn set_location(&mut self, location: Option<LocationId>) {
        self.location = location;
    }

    /// Deliver an event to this actor's sink
    pub fn notify(&mut self, event: CombatEvent) {
        self.context.notify(&self.id, &event);
    }

    /// Bring back persisted pools, wimpy, death and kill records
    ///
    /// Pools are clamped against live maxima when next observed.
    pub fn restore(&mut self, snapshot: &CombatantSnapshot) {
        self.vitals.set(Vital::Hit, snapshot.hit_points, i32::MAX);
        self.vitals.set(Vital::Spell, snapshot.spell_points, i32::MAX);
        self.vitals.set(Vital::Stamina, snapshot.stamina_points, i32::MAX);
        self.set_wimpy(snapshot.wimpy);
        self.dead = snapshot.dead;
        self.statistics = snapshot.statistics.clone();
    }

    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            template: self.template.clone(),
            hit_points: self.vitals.raw(Vital::Hit),
            spell_points: self.vitals.raw(Vital::Spell),
            stamina_points: self.vitals.raw(Vital::Stamina),
            wimpy: self.wimpy,
            dead: self.dead,
            statistics: self.statistics.clone(),
            saved_at: Utc::now(),
        }
    }
}
