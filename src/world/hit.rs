//! Damage application and the death pipeline

use tracing::{debug, info, warn};

use super::{Deferred, World};
use crate::actors::Vital;
use crate::combat::{CombatEvent, CombatStatistics, DamageType};
use crate::error::HitRefusal;
use crate::ActorId;

const WIZARDHOOD: &str = "Your wizardhood protects you from death.";

impl World {
    /// Apply `damage` of `damage_type` to `target`, returning the points removed
    ///
    /// Deaths and reflected damage caused by the hit are fully resolved
    /// before this returns.
    pub fn hit(
        &mut self,
        target: &str,
        damage: i32,
        damage_type: DamageType,
        attacker: Option<&str>,
    ) -> i32 {
        let applied = self.resolve_hit(target, damage, damage_type, attacker);
        self.drain_pending();
        applied
    }

    /// Apply one hit, queueing its secondary effects
    pub(super) fn resolve_hit(
        &mut self,
        target: &str,
        damage: i32,
        damage_type: DamageType,
        attacker: Option<&str>,
    ) -> i32 {
        if self.hit_is_allowed(target, attacker).is_err() {
            return 0;
        }
        if self.actors.get(target).is_some_and(|t| t.is_ethereal()) && !damage_type.affects_ethereal() {
            let reason = HitRefusal::Ethereal(damage_type);
            debug!(actor = target, %reason, "Hit not allowed");
            return 0;
        }

        let now = self.now;
        if let (Some(attacker), Some(actor)) = (attacker, self.actors.get_mut(target)) {
            actor.hostiles_mut().register(attacker, now);
        }
        self.heartbeats.set_heartbeat(target);

        let Ok(resolver) = self.resolver(target) else {
            return 0;
        };
        let soak = resolver.soak_damage(damage_type);
        let resistance = resolver.damage_resistance(damage, damage_type);
        let current = resolver.current_vital(Vital::Hit);
        let max = resolver.max_vital(Vital::Hit);
        let reflection = resolver.damage_reflection();

        let applied = (damage - soak - resistance).clamp(0, current);
        let Some(victim) = self.actors.get_mut(target) else {
            return 0;
        };
        let remaining = victim.vitals_mut().set(Vital::Hit, current - applied, max);
        victim.notify(CombatEvent::Hit { damage_type, damage });
        victim.notify(Vital::Hit.changed_event(remaining, max));
        debug!(actor = target, attacker = ?attacker, damage, applied, remaining, "Hit resolved");

        let lethal = remaining == 0 && !victim.is_dead();

        // Reflection is aimed now and queued ahead of the reflector's own death
        if let Some(attacker) = attacker {
            self.award_experience(target, attacker, applied, max);

            if reflection > 0 {
                let reflected = (reflection as f64 / 100.0 * damage as f64) as i32;
                if reflected > 1 {
                    if let Some(victim) = self.select_target(target) {
                        self.pending.push_back(Deferred::Reflect {
                            source: target.to_string(),
                            victim,
                            damage: reflected,
                            damage_type,
                        });
                    }
                }
            }
        }

        if lethal {
            let queued = self
                .pending
                .iter()
                .any(|d| matches!(d, Deferred::Death { victim, .. } if victim == target));
            if !queued {
                self.pending.push_back(Deferred::Death {
                    victim: target.to_string(),
                    killer: attacker.map(str::to_string),
                });
            }
        }

        applied
    }

    fn award_experience(&mut self, target: &str, attacker: &str, applied: i32, max: i32) {
        let Some((target_level, value)) = self
            .actors
            .get(target)
            .and_then(|t| t.context().progression())
            .map(|p| (p.level(), p.experience_value()))
        else {
            return;
        };
        let Some(progression) = self
            .actors
            .get_mut(attacker)
            .and_then(|a| a.context_mut().progression_mut())
        else {
            return;
        };

        let level_modifier = target_level as f64 / (progression.level().max(1) as f64 * 200.0);
        let amount = (value as f64 * (applied as f64 / max.max(1) as f64) * level_modifier) as i32;
        if amount > 0 {
            progression.add_experience(amount);
        }
    }

    /// Process queued deaths and reflections in order
    pub(super) fn drain_pending(&mut self) {
        while let Some(deferred) = self.pending.pop_front() {
            match deferred {
                Deferred::Death { victim, killer } => self.resolve_death(&victim, killer.as_deref()),
                Deferred::Reflect {
                    source,
                    victim,
                    damage,
                    damage_type,
                } => self.resolve_reflection(&source, &victim, damage, damage_type),
            }
        }
    }

    fn resolve_reflection(&mut self, source: &str, victim: &str, damage: i32, damage_type: DamageType) {
        let applied = self.resolve_hit(victim, damage, damage_type, Some(source));
        debug!(source, victim, damage, applied, "Damage reflected");
        self.notify(
            source,
            CombatEvent::Reflected {
                target: victim.to_string(),
                damage,
            },
        );
    }

    /// Decide the fate of an actor whose hit points reached zero
    fn resolve_death(&mut self, victim_id: &str, killer_id: Option<&str>) {
        let Some(victim) = self.actors.get(victim_id) else {
            return;
        };
        if victim.is_dead() {
            return;
        }

        if victim.is_immortal() {
            self.notify(
                victim_id,
                CombatEvent::DeathAverted {
                    message: WIZARDHOOD.to_string(),
                },
            );
            return;
        }
        let suppressed = victim
            .location()
            .and_then(|loc| self.locations.get(loc))
            .and_then(|loc| loc.environment())
            .and_then(|env| env.suppress_death());
        if let (Some(message), true) = (suppressed, victim.is_durable()) {
            debug!(victim = victim_id, "Death suppressed by environment");
            self.notify(victim_id, CombatEvent::DeathAverted { message });
            return;
        }

        let killer_id = killer_id.filter(|k| self.actors.contains_key(*k));
        self.notify(
            victim_id,
            CombatEvent::Death {
                killer: killer_id.map(str::to_string),
            },
        );

        if let Some(killer_id) = killer_id {
            self.update_dispositions(victim_id, killer_id);
        }

        let Some(victim) = self.actors.get_mut(victim_id) else {
            return;
        };
        victim.set_dead(true);
        if victim.is_durable() {
            let snapshot = victim.snapshot();
            if let Some(persistence) = victim.context_mut().persistence_mut() {
                if let Err(e) = persistence.save(&snapshot) {
                    warn!(victim = victim_id, error = %e, "Failed to persist dead actor");
                }
            }
        }
        info!(victim = victim_id, killer = ?killer_id, "Actor died");

        let victim_name = victim.name().to_string();
        let victim_durable = victim.is_durable();
        let record_key = CombatStatistics::key(victim.template(), victim.name());
        let victim_level = victim.context().progression().map(|p| p.level()).unwrap_or(1);
        let victim_race = victim.race().map(str::to_string);

        let mut killed_by = None;
        if let Some(killer) = killer_id.and_then(|k| self.actors.get_mut(k)) {
            killer
                .statistics_mut()
                .record_kill(&record_key, &victim_name, victim_level, victim_race.as_deref());
            if victim_durable && killer.is_durable() {
                killed_by = Some(killer.name().to_string());
            }
        }

        if let Some(victim) = self.actors.get(victim_id) {
            let corpse = self.corpse_factory.create(victim, killed_by.as_deref());
            if let Some(location) = victim.location().and_then(|l| self.locations.get_mut(l)) {
                info!(victim = victim_id, corpse = %corpse.id, location = location.id(), "Corpse created");
                location.add_corpse(corpse);
            }
        }

        self.purge_hostilities(victim_id);

        if !victim_durable {
            let survives = self
                .actors
                .get_mut(victim_id)
                .and_then(|v| v.context_mut().hooks_mut())
                .is_some_and(|hooks| hooks.second_life());
            if !survives {
                self.remove_actor(victim_id);
                debug!(victim = victim_id, "Removed dead actor");
            }
        }
    }

    /// Reputation changes for the killer with each of the victim's factions
    fn update_dispositions(&mut self, victim_id: &str, killer_id: &str) {
        let Some(victim) = self.actors.get(victim_id) else {
            return;
        };
        let factions = victim
            .context()
            .factions()
            .map(|f| f.factions())
            .unwrap_or_default();
        if factions.is_empty() {
            return;
        }
        let victim_level = victim.context().progression().map(|p| p.level());

        let Some(killer) = self.actors.get_mut(killer_id) else {
            return;
        };
        let killer_level = killer.context().progression().map(|p| p.level());
        let delta = match (victim_level, killer_level) {
            (Some(v), Some(k)) => -(v - k).max(1),
            _ => -1,
        };
        if let Some(dispositions) = killer.context_mut().factions_mut() {
            for faction in &factions {
                dispositions.update_disposition(faction, delta, true);
            }
        }
    }

    /// Remove an actor from every hostile registry and stop its heartbeat
    fn purge_hostilities(&mut self, actor_id: &str) {
        let mut others: Vec<ActorId> = Vec::new();
        for (id, actor) in self.actors.iter_mut() {
            if id == actor_id {
                others.extend(actor.hostiles().most_recent_first());
                actor.hostiles_mut().clear();
            } else {
                actor.hostiles_mut().unregister(actor_id);
            }
        }
        self.heartbeats.remove_heartbeat(actor_id);
        debug!(actor = actor_id, released = others.len(), "Purged hostilities");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{CombatContext, Combatant};
    use crate::combat::{CombatModifier, EventLog, StatusEffect};
    use crate::config::CombatConfig;
    use crate::world::{Location, Zone};

    fn world() -> World {
        let mut world = World::new(CombatConfig {
            seed: Some(3),
            ..Default::default()
        });
        world.add_location(Location::new("arena", "Arena"));
        world.add_location(Location::new("temple", "Temple").with_environment(Zone::sanctuary()));
        world
    }

    fn logged(id: &str, log: &EventLog) -> Combatant {
        Combatant::new(id, id, CombatContext::builder().events(log.clone()).build())
    }

    #[test]
    fn test_hit_is_clamped_to_current() {
        let log = EventLog::new();
        let mut world = world();
        world.spawn(logged("bob", &log), "arena").unwrap();

        assert_eq!(world.hit("bob", 12, DamageType::Physical, None), 12);
        assert_eq!(world.hit_points("bob").unwrap(), 18);
        assert_eq!(log.count("bob", "onHit"), 1);
        assert_eq!(log.count("bob", "onHitPointsChanged"), 1);

        assert_eq!(world.hit("bob", -5, DamageType::Physical, None), 0);
        assert_eq!(world.hit_points("bob").unwrap(), 18);
    }

    #[test]
    fn test_lethal_hit_removes_transient_actor() {
        let log = EventLog::new();
        let mut world = world();
        world.spawn(logged("orc", &log), "arena").unwrap();

        assert_eq!(world.hit("orc", 100, DamageType::Physical, None), 30);
        assert!(!world.contains("orc"));
        assert_eq!(world.location("arena").unwrap().corpses().len(), 1);
        assert_eq!(log.count("orc", "onDeath"), 1);
    }

    #[test]
    fn test_durable_actor_stays_dead_in_place() {
        let mut world = world();
        world.spawn(Combatant::new("hero", "Hero", CombatContext::default()).durable(), "arena").unwrap();

        world.hit("hero", 100, DamageType::Physical, None);
        let hero = world.actor("hero").unwrap();
        assert!(hero.is_dead());
        assert!(world.location("arena").unwrap().contains("hero"));

        assert_eq!(world.hit("hero", 5, DamageType::Physical, None), 0);
        assert_eq!(world.location("arena").unwrap().corpses().len(), 1);
    }

    #[test]
    fn test_immortal_survives() {
        let log = EventLog::new();
        let mut world = world();
        world.spawn(logged("wiz", &log).durable().immortal(), "arena").unwrap();

        world.hit("wiz", 100, DamageType::Physical, None);
        assert!(!world.actor("wiz").unwrap().is_dead());
        assert_eq!(log.count("wiz", "onDeathAverted"), 1);
        assert!(world.location("arena").unwrap().corpses().is_empty());
    }

    #[test]
    fn test_sanctuary_refuses_hits() {
        let mut world = world();
        world.spawn(Combatant::new("monk", "monk", CombatContext::default()), "temple").unwrap();
        assert_eq!(world.hit("monk", 10, DamageType::Physical, None), 0);
        assert_eq!(world.hit_points("monk").unwrap(), 30);
    }

    #[test]
    fn test_ethereal_only_hurt_by_some_types() {
        let mut world = world();
        world
            .spawn(Combatant::new("ghost", "ghost", CombatContext::default()).ethereal(), "arena")
            .unwrap();
        assert_eq!(world.hit("ghost", 10, DamageType::Physical, None), 0);
        assert_eq!(world.hit("ghost", 10, DamageType::Fire, None), 10);
    }

    #[test]
    fn test_hit_registers_attacker_and_heartbeat() {
        let mut world = world();
        world.spawn(Combatant::new("bob", "bob", CombatContext::default()), "arena").unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();

        world.hit("bob", 3, DamageType::Physical, Some("orc"));
        assert!(world.is_in_combat_with("bob", "orc"));
        assert!(!world.is_in_combat_with("orc", "bob"));
        assert!(world.has_heartbeat("bob"));
    }

    #[test]
    fn test_reflection_hits_selected_target() {
        let log = EventLog::new();
        let mut world = world();
        world.spawn(logged("knight", &log), "arena").unwrap();
        world.spawn(logged("orc", &log), "arena").unwrap();
        world
            .add_effect("knight", StatusEffect::new(CombatModifier::DamageReflection, 5, 80))
            .unwrap();

        world.hit("knight", 20, DamageType::Physical, Some("orc"));
        assert_eq!(world.hit_points("knight").unwrap(), 10);
        // capped at 50%
        assert_eq!(world.hit_points("orc").unwrap(), 20);
        assert_eq!(log.count("knight", "onReflected"), 1);
    }

    #[test]
    fn test_killing_blow_is_still_reflected() {
        let log = EventLog::new();
        let mut world = world();
        world.spawn(logged("knight", &log), "arena").unwrap();
        world.spawn(logged("orc", &log), "arena").unwrap();
        world
            .add_effect("knight", StatusEffect::new(CombatModifier::DamageReflection, 5, 50))
            .unwrap();

        assert_eq!(world.hit("knight", 40, DamageType::Physical, Some("orc")), 30);
        assert!(!world.contains("knight"));
        assert_eq!(log.count("knight", "onDeath"), 1);
        assert_eq!(world.hit_points("orc").unwrap(), 10);
        assert_eq!(log.count("knight", "onReflected"), 1);
    }

    #[test]
    fn test_mutual_reflection_dies_out() {
        let mut world = World::new(CombatConfig {
            seed: Some(3),
            reflection_cap: 100,
            ..Default::default()
        });
        world.add_location(Location::new("arena", "Arena"));
        for id in ["a", "b"] {
            let mut mirror = Combatant::new(id, id, CombatContext::default())
                .durable()
                .immortal();
            mirror.toggle_kill_list();
            world.spawn(mirror, "arena").unwrap();
            world
                .add_effect(id, StatusEffect::new(CombatModifier::DamageReflection, 5, 100))
                .unwrap();
        }

        world.hit("a", 20, DamageType::Physical, Some("b"));
        assert!(world.pending.is_empty());
        assert!(!world.actor("a").unwrap().is_dead());
        assert!(!world.actor("b").unwrap().is_dead());
    }
}
