//! The world: actors, locations and the combat entry points
//!
//! The world owns every combatant. Cross-actor effects always go through
//! world methods that look actors up by id, so an actor destroyed by a
//! hit simply stops being found. Secondary effects of a hit (deaths and
//! reflected damage) are queued and drained before the public call returns.

mod hit;
mod location;
mod round;

pub use location::{FleeRoute, Location, Zone};

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

use crate::actors::{Combatant, Vital};
use crate::combat::{
    assemble, AttackEntry, CombatEvent, CombatResolver, CombatStatistics, CorpseFactory,
    DamageType, StandardCorpseFactory, StatusEffect, Weapon,
};
use crate::config::CombatConfig;
use crate::error::{CombatError, HitRefusal};
use crate::timers::HeartbeatRegistry;
use crate::{ActorId, LocationId};

/// Work left over from a hit, processed in order
#[derive(Debug, Clone, PartialEq)]
enum Deferred {
    Death {
        victim: ActorId,
        killer: Option<ActorId>,
    },
    Reflect {
        source: ActorId,
        victim: ActorId,
        damage: i32,
        damage_type: DamageType,
    },
}

/// Formulas for one actor, borrowing only the maps they need
fn resolver_for<'a>(
    actors: &'a HashMap<ActorId, Combatant>,
    locations: &'a HashMap<LocationId, Location>,
    config: &'a CombatConfig,
    id: &str,
) -> Option<CombatResolver<'a>> {
    let actor = actors.get(id)?;
    let environment = actor
        .location()
        .and_then(|loc| locations.get(loc))
        .and_then(|loc| loc.environment());
    Some(CombatResolver::new(actor, environment, config))
}

pub struct World {
    config: CombatConfig,
    actors: HashMap<ActorId, Combatant>,
    locations: HashMap<LocationId, Location>,
    heartbeats: HeartbeatRegistry,
    corpse_factory: Box<dyn CorpseFactory>,
    rng: StdRng,
    pending: VecDeque<Deferred>,
    now: u64,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("actors", &self.actors.len())
            .field("locations", &self.locations.len())
            .field("heartbeats", &self.heartbeats.heartbeat_count())
            .field("now", &self.now)
            .finish()
    }
}

impl World {
    pub fn new(config: CombatConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            actors: HashMap::new(),
            locations: HashMap::new(),
            heartbeats: HeartbeatRegistry::new(),
            corpse_factory: Box::new(StandardCorpseFactory),
            rng,
            pending: VecDeque::new(),
            now: 0,
        }
    }

    pub fn with_corpse_factory(mut self, factory: impl CorpseFactory + 'static) -> Self {
        self.corpse_factory = Box::new(factory);
        self
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Tick most recently passed to [`World::tick`]
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn add_location(&mut self, location: Location) {
        debug!(location = location.id(), "Added location");
        self.locations.insert(location.id().to_string(), location);
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Place a new combatant in a location with full vitals
    pub fn spawn(&mut self, mut combatant: Combatant, location: &str) -> Result<(), CombatError> {
        let id = combatant.id().to_string();
        if self.actors.contains_key(&id) {
            return Err(CombatError::DuplicateActor(id));
        }
        let loc = self
            .locations
            .get_mut(location)
            .ok_or_else(|| CombatError::UnknownLocation(location.to_string()))?;

        loc.enter(&id);
        combatant
            .vitals_mut()
            .fill_base_max(self.config.default_vital_maximum);
        let wimpy = combatant.wimpy().min(self.config.max_wimpy);
        combatant.set_wimpy(wimpy);
        combatant.set_location(Some(location.to_string()));
        self.actors.insert(id.clone(), combatant);

        for vital in Vital::all() {
            let max = self.max_vital(&id, *vital)?;
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.vitals_mut().set(*vital, max, max);
            }
        }

        info!(actor = %id, location, "Spawned combatant");
        Ok(())
    }

    pub fn actor(&self, id: &str) -> Option<&Combatant> {
        self.actors.get(id)
    }

    pub fn actor_mut(&mut self, id: &str) -> Option<&mut Combatant> {
        self.actors.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actors.contains_key(id)
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<_> = self.actors.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn get(&self, id: &str) -> Result<&Combatant, CombatError> {
        self.actors
            .get(id)
            .ok_or_else(|| CombatError::UnknownActor(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Combatant, CombatError> {
        self.actors
            .get_mut(id)
            .ok_or_else(|| CombatError::UnknownActor(id.to_string()))
    }

    fn resolver(&self, id: &str) -> Result<CombatResolver<'_>, CombatError> {
        resolver_for(&self.actors, &self.locations, &self.config, id)
            .ok_or_else(|| CombatError::UnknownActor(id.to_string()))
    }

    /// Move an actor to another location
    pub fn move_actor(&mut self, id: &str, destination: &str) -> Result<(), CombatError> {
        if !self.locations.contains_key(destination) {
            return Err(CombatError::UnknownLocation(destination.to_string()));
        }
        let from = self.get(id)?.location().map(str::to_string);
        if let Some(loc) = from.as_deref().and_then(|f| self.locations.get_mut(f)) {
            loc.leave(id);
        }
        if let Some(loc) = self.locations.get_mut(destination) {
            loc.enter(id);
        }
        self.get_mut(id)?.set_location(Some(destination.to_string()));
        debug!(actor = id, from = ?from, to = destination, "Moved actor");
        Ok(())
    }

    /// Take an actor out of the world entirely
    pub fn remove_actor(&mut self, id: &str) -> Option<Combatant> {
        let actor = self.actors.remove(id)?;
        if let Some(loc) = actor.location().and_then(|l| self.locations.get_mut(l)) {
            loc.leave(id);
        }
        self.heartbeats.remove_heartbeat(id);
        for other in self.actors.values_mut() {
            other.hostiles_mut().unregister(id);
        }
        Some(actor)
    }

    /// Both actors exist and stand in the same location
    pub fn is_present(&self, a: &str, b: &str) -> bool {
        match (self.actors.get(a), self.actors.get(b)) {
            (Some(a), Some(b)) => a.location().is_some() && a.location() == b.location(),
            _ => false,
        }
    }

    pub(crate) fn notify(&mut self, id: &str, event: CombatEvent) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.notify(event);
        }
    }

    /// Whether `actor_id` may hit or be hit by `foe_id` right now
    fn check_hit_allowed(&self, actor_id: &str, foe_id: Option<&str>) -> Result<(), HitRefusal> {
        let actor = self.actors.get(actor_id).ok_or(HitRefusal::Missing)?;
        let location_id = actor.location().ok_or(HitRefusal::Nowhere)?;
        if actor.is_dead() {
            return Err(HitRefusal::Dead);
        }
        if actor.is_invulnerable() {
            return Err(HitRefusal::Invulnerable);
        }
        let location = self.locations.get(location_id).ok_or(HitRefusal::Nowhere)?;
        if location
            .environment()
            .is_some_and(|env| env.violence_prohibited())
        {
            return Err(HitRefusal::ViolenceProhibited);
        }

        if let Some(foe_id) = foe_id {
            let foe = self.actors.get(foe_id).ok_or(HitRefusal::FoeAbsent)?;
            if foe.location() != Some(location_id) {
                return Err(HitRefusal::FoeAbsent);
            }
            if foe.is_dead() {
                return Err(HitRefusal::FoeDead);
            }
            let player_fight = actor.is_durable() && foe.is_durable();
            if player_fight && !(actor.on_kill_list() && foe.on_kill_list()) {
                return Err(HitRefusal::NotOnKillList);
            }
        }
        Ok(())
    }

    /// Legality check with its side effects: kill-list violations end the fight
    fn hit_is_allowed(&mut self, actor_id: &str, foe_id: Option<&str>) -> Result<(), HitRefusal> {
        let result = self.check_hit_allowed(actor_id, foe_id);
        if let Err(reason) = &result {
            debug!(actor = actor_id, foe = ?foe_id, %reason, "Hit not allowed");
            if let (HitRefusal::NotOnKillList, Some(foe)) = (reason, foe_id) {
                self.notify(
                    actor_id,
                    CombatEvent::KillListRefused {
                        foe: foe.to_string(),
                    },
                );
                self.stop_fight(actor_id, foe);
            }
        }
        result
    }

    /// Add `attacker` to `id`'s hostile registry if a fight is legal
    ///
    /// Returns whether the fight is legal; registering twice keeps one entry.
    pub fn register_attacker(&mut self, id: &str, attacker: &str) -> bool {
        if self.hit_is_allowed(id, Some(attacker)).is_err() {
            return false;
        }
        let now = self.now;
        if let Some(actor) = self.actors.get_mut(id) {
            if actor.hostiles_mut().register(attacker, now) {
                debug!(actor = id, attacker, "Registered attacker");
            }
        }
        true
    }

    /// Remove `attacker` from `id`'s registry; false if it was not there
    pub fn unregister_attacker(&mut self, id: &str, attacker: &str) -> bool {
        self.actors
            .get_mut(id)
            .is_some_and(|actor| actor.hostiles_mut().unregister(attacker))
    }

    /// End the fight between two actors on both sides
    pub fn stop_fight(&mut self, id: &str, other: &str) {
        self.unregister_attacker(id, other);
        self.unregister_attacker(other, id);
    }

    pub fn is_in_combat_with(&self, id: &str, attacker: &str) -> bool {
        self.actors
            .get(id)
            .is_some_and(|actor| actor.hostiles().contains(attacker))
    }

    /// Attack list for the actor's next round
    pub fn attacks(&self, id: &str) -> Result<Vec<AttackEntry>, CombatError> {
        Ok(assemble(self.get(id)?, &self.config))
    }

    pub fn calculate_defend_attack(&self, id: &str) -> Result<i32, CombatError> {
        Ok(self.resolver(id)?.defend_attack())
    }

    pub fn calculate_attack(
        &mut self,
        attacker: &str,
        defender: &str,
        weapon: &Weapon,
        randomize: bool,
    ) -> Result<i32, CombatError> {
        let a = resolver_for(&self.actors, &self.locations, &self.config, attacker)
            .ok_or_else(|| CombatError::UnknownActor(attacker.to_string()))?;
        let d = resolver_for(&self.actors, &self.locations, &self.config, defender)
            .ok_or_else(|| CombatError::UnknownActor(defender.to_string()))?;
        let rng = randomize.then_some(&mut self.rng as &mut dyn rand::RngCore);
        Ok(a.attack(&d, weapon, rng))
    }

    pub fn calculate_damage(
        &mut self,
        id: &str,
        weapon: &Weapon,
        damage_type: DamageType,
        randomize: bool,
    ) -> Result<i32, CombatError> {
        let r = resolver_for(&self.actors, &self.locations, &self.config, id)
            .ok_or_else(|| CombatError::UnknownActor(id.to_string()))?;
        let rng = randomize.then_some(&mut self.rng as &mut dyn rand::RngCore);
        Ok(r.damage(weapon, damage_type, rng))
    }

    pub fn calculate_soak_damage(&self, id: &str, damage_type: DamageType) -> Result<i32, CombatError> {
        Ok(self.resolver(id)?.soak_damage(damage_type))
    }

    pub fn calculate_damage_resistance(
        &self,
        id: &str,
        damage: i32,
        damage_type: DamageType,
    ) -> Result<i32, CombatError> {
        Ok(self.resolver(id)?.damage_resistance(damage, damage_type))
    }

    pub fn max_vital(&self, id: &str, vital: Vital) -> Result<i32, CombatError> {
        Ok(self.resolver(id)?.max_vital(vital))
    }

    pub fn vital(&self, id: &str, vital: Vital) -> Result<i32, CombatError> {
        Ok(self.resolver(id)?.current_vital(vital))
    }

    /// Apply a change to a vital, clamped to `[0, max]`, and announce it
    fn change_vital(&mut self, id: &str, vital: Vital, delta: i32) -> Result<i32, CombatError> {
        let (current, max) = {
            let r = self.resolver(id)?;
            (r.current_vital(vital), r.max_vital(vital))
        };
        let actor = self.get_mut(id)?;
        let value = actor.vitals_mut().set(vital, current + delta, max);
        actor.notify(vital.changed_event(value, max));
        Ok(value)
    }

    pub fn max_hit_points(&self, id: &str) -> Result<i32, CombatError> {
        self.max_vital(id, Vital::Hit)
    }

    pub fn hit_points(&self, id: &str) -> Result<i32, CombatError> {
        self.vital(id, Vital::Hit)
    }

    /// Raise hit points; damage only ever goes through [`World::hit`]
    pub fn increase_hit_points(&mut self, id: &str, amount: i32) -> Result<i32, CombatError> {
        if amount <= 0 {
            return self.hit_points(id);
        }
        self.change_vital(id, Vital::Hit, amount)
    }

    pub fn max_spell_points(&self, id: &str) -> Result<i32, CombatError> {
        self.max_vital(id, Vital::Spell)
    }

    pub fn spell_points(&self, id: &str) -> Result<i32, CombatError> {
        self.vital(id, Vital::Spell)
    }

    /// Gain or spend spell points, adjusted by recover/reduce bonuses
    pub fn adjust_spell_points(&mut self, id: &str, delta: i32) -> Result<i32, CombatError> {
        let adjusted = self.resolver(id)?.adjusted_delta(Vital::Spell, delta);
        self.change_vital(id, Vital::Spell, adjusted)
    }

    pub fn max_stamina_points(&self, id: &str) -> Result<i32, CombatError> {
        self.max_vital(id, Vital::Stamina)
    }

    pub fn stamina_points(&self, id: &str) -> Result<i32, CombatError> {
        self.vital(id, Vital::Stamina)
    }

    /// Gain or spend stamina, adjusted by recover/reduce bonuses
    pub fn adjust_stamina_points(&mut self, id: &str, delta: i32) -> Result<i32, CombatError> {
        let adjusted = self.resolver(id)?.adjusted_delta(Vital::Stamina, delta);
        self.change_vital(id, Vital::Stamina, adjusted)
    }

    /// Set the flee threshold; values are clamped to `[0, max_wimpy]`
    pub fn set_wimpy(&mut self, id: &str, value: i32) -> Result<i32, CombatError> {
        let max = self.config.max_wimpy;
        Ok(self.get_mut(id)?.set_wimpy(value.min(max)))
    }

    pub fn wimpy(&self, id: &str) -> Result<i32, CombatError> {
        Ok(self.get(id)?.wimpy())
    }

    pub fn toggle_kill_list(&mut self, id: &str) -> Result<bool, CombatError> {
        Ok(self.get_mut(id)?.toggle_kill_list())
    }

    pub fn combat_statistics(&self, id: &str) -> Result<&CombatStatistics, CombatError> {
        Ok(self.get(id)?.statistics())
    }

    /// Attach a timed effect and make sure it decays
    pub fn add_effect(&mut self, id: &str, effect: StatusEffect) -> Result<(), CombatError> {
        self.get_mut(id)?.add_effect(effect);
        self.heartbeats.set_heartbeat(id);
        Ok(())
    }

    pub fn add_combat_delay(&mut self, id: &str, ticks: u32) -> Result<(), CombatError> {
        self.get_mut(id)?.add_combat_delay(ticks);
        Ok(())
    }

    pub fn add_spell_action(&mut self, id: &str, ticks: u32) -> Result<(), CombatError> {
        self.get_mut(id)?.add_spell_action(ticks);
        Ok(())
    }

    pub fn has_heartbeat(&self, id: &str) -> bool {
        self.heartbeats.is_active(id)
    }

    /// Start an actor's heartbeat
    pub fn activate(&mut self, id: &str) -> bool {
        self.actors.contains_key(id) && self.heartbeats.set_heartbeat(id)
    }
}
