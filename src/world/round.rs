//! Attack rounds and heartbeats

use rand::RngCore;
use tracing::{debug, trace};

use super::{resolver_for, World};
use crate::actors::Vital;
use crate::capabilities::{EquipmentSlot, Occupant};
use crate::combat::{
    roll, AttackEntry, AttackOutcome, CombatEvent, CombatModifier, DamageType, NaturalAttack, Weapon,
};
use crate::ActorId;

impl World {
    /// Run one attack round of `attacker` against `defender`
    ///
    /// Returns false when no round was fought. An illegal pairing also
    /// ends the fight; a pending delay only postpones it.
    pub fn attack(&mut self, attacker: &str, defender: &str) -> bool {
        if self.hit_is_allowed(attacker, Some(defender)).is_err() {
            self.stop_fight(attacker, defender);
            return false;
        }

        let Some(actor) = self.actors.get_mut(attacker) else {
            return false;
        };
        if actor.combat_delay() > 0 {
            let remaining = actor.consume_combat_delay();
            actor.notify(CombatEvent::CombatDelayed { remaining });
            debug!(attacker, remaining, "Attack delayed");
            return false;
        }
        if actor.spell_action_delay() > 0 {
            trace!(attacker, "Busy with a spell action");
            return false;
        }

        self.register_attacker(defender, attacker);
        self.register_attacker(attacker, defender);
        self.heartbeats.set_heartbeat(attacker);
        self.notify(
            attacker,
            CombatEvent::Attack {
                target: defender.to_string(),
            },
        );
        self.notify(
            defender,
            CombatEvent::Attacked {
                attacker: attacker.to_string(),
            },
        );

        let attacks = self.attacks(attacker).unwrap_or_default();
        for entry in attacks {
            if !self.is_present(attacker, defender) {
                break;
            }
            if let Some(weapon) = self.weapon_for(attacker, &entry) {
                self.swing(attacker, defender, &entry, &weapon);
            }
        }
        true
    }

    /// What an attack list entry swings with
    fn weapon_for(&self, attacker: &str, entry: &AttackEntry) -> Option<Weapon> {
        if !entry.is_weapon_attack() {
            return entry.natural().map(Weapon::Natural);
        }
        let inventory = self.actors.get(attacker)?.context().inventory()?;
        let slot = entry.kind.slot().unwrap_or(EquipmentSlot::WieldedPrimary);
        Some(match inventory.equipped(slot) {
            Some(item) => Weapon::Item(item.clone()),
            None => Weapon::Natural(NaturalAttack::unarmed(&self.config)),
        })
    }

    /// One swing: roll to hit, then deliver each damage type as its own hit
    fn swing(&mut self, attacker: &str, defender: &str, entry: &AttackEntry, weapon: &Weapon) {
        let to_hit = {
            let (Some(a), Some(d)) = (
                resolver_for(&self.actors, &self.locations, &self.config, attacker),
                resolver_for(&self.actors, &self.locations, &self.config, defender),
            ) else {
                return;
            };
            a.attack(&d, weapon, Some(&mut self.rng as &mut dyn RngCore))
        };

        let outcome = AttackOutcome::from_to_hit(to_hit);
        if outcome == AttackOutcome::Fumble {
            self.notify(attacker, CombatEvent::Fumble);
        }

        let mut multiplier = outcome.multiplier();
        if self.actors.get(defender).is_some_and(|d| d.is_ethereal()) && !weapon.can_damage_ethereal() {
            multiplier = 0.0;
        }
        trace!(attacker, defender, to_hit, ?outcome, multiplier, "Swing");

        let mut inflicted = 0;
        if multiplier > 0.0 {
            for damage_type in self.extra_damage_types(attacker, weapon) {
                let damage = self.roll_damage(attacker, weapon, damage_type);
                if !self.contains(defender) {
                    break;
                }
                inflicted += self.hit(defender, damage, damage_type, Some(attacker));
            }

            let primary = weapon.primary_damage_type();
            let damage = (self.roll_damage(attacker, weapon, primary) as f64 * multiplier) as i32;
            if self.contains(defender) {
                inflicted += self.hit(defender, damage, primary, Some(attacker));
            }
        }

        if self.contains(defender) {
            self.notify(
                attacker,
                CombatEvent::chatter(defender, entry.kind, &weapon.name(), inflicted),
            );
        }
    }

    fn extra_damage_types(&self, attacker: &str, weapon: &Weapon) -> Vec<DamageType> {
        let Weapon::Item(item) = weapon else {
            return Vec::new();
        };
        self.actors
            .get(attacker)
            .and_then(|a| a.context().inventory())
            .filter(|inv| inv.is_equipped(item) || item.damage_type.is_some())
            .map(|inv| inv.extra_damage_types(item))
            .unwrap_or_default()
    }

    fn roll_damage(&mut self, attacker: &str, weapon: &Weapon, damage_type: DamageType) -> i32 {
        resolver_for(&self.actors, &self.locations, &self.config, attacker)
            .map(|r| r.damage(weapon, damage_type, Some(&mut self.rng as &mut dyn RngCore)))
            .unwrap_or(0)
    }

    /// Choose who `id` attacks next among hostiles standing with it
    ///
    /// The most recently engaged hostile is preferred; an agile one may
    /// slip away, in which case any present hostile is picked at random.
    pub fn select_target(&mut self, id: &str) -> Option<ActorId> {
        let candidates: Vec<ActorId> = self
            .actors
            .get(id)?
            .hostiles()
            .most_recent_first()
            .into_iter()
            .filter(|h| self.is_present(id, h))
            .collect();
        let first = candidates.first()?;

        let defend = self
            .resolver(first)
            .map(|r| r.defend_attack())
            .unwrap_or(0);
        if roll::random(&mut self.rng, 101) + defend > 50 {
            let index = roll::pick(&mut self.rng, candidates.len());
            return candidates.get(index).cloned();
        }
        Some(first.clone())
    }

    /// Run every due heartbeat at tick `now`, in actor-id order
    pub fn tick(&mut self, now: u64) {
        self.now = now;
        for id in self.heartbeats.due(now) {
            if self.actors.contains_key(&id) {
                self.beat(&id, now);
            } else {
                self.heartbeats.remove_heartbeat(&id);
            }
        }
    }

    /// Run one actor's heartbeat at tick `now`, starting it if needed
    ///
    /// Returns false for an unknown actor or one that already beat at `now`.
    pub fn tick_actor(&mut self, id: &str, now: u64) -> bool {
        if !self.actors.contains_key(id) {
            return false;
        }
        self.now = now;
        self.heartbeats.set_heartbeat(id);
        if !self.heartbeats.get(id).is_some_and(|hb| hb.is_due(now)) {
            return false;
        }
        self.beat(id, now);
        true
    }

    fn beat(&mut self, id: &str, now: u64) {
        if let Some(hb) = self.heartbeats.get_mut(id) {
            hb.reset(now);
        }

        self.decay_effects(id);
        if self.actors.get(id).is_some_and(|a| !a.is_dead()) {
            self.combat_heartbeat(id);
        }
        if self.actors.get(id).is_some_and(|a| !a.is_dead()) {
            self.healing_heartbeat(id);
        }
    }

    fn decay_effects(&mut self, id: &str) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        for modifier in actor.effects_mut().tick_all() {
            debug!(actor = id, ?modifier, "Effect expired");
            actor.notify(CombatEvent::EffectExpired { modifier });
        }
    }

    fn combat_heartbeat(&mut self, id: &str) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.decrement_spell_action();
        }
        self.pull_aggressive_occupants(id);

        let Some(target) = self.select_target(id) else {
            return;
        };
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        if let Some(ai) = actor.context_mut().ai_mut() {
            ai.combat_action(&target);
        }

        let slow = actor.status(CombatModifier::Slow);
        let hasted = actor.has_status(CombatModifier::Haste);
        let mut rounds = 1;
        if self
            .heartbeats
            .get_mut(id)
            .is_some_and(|hb| hb.slow_skips_round(slow))
        {
            rounds = 0;
        }
        if hasted {
            rounds += 1;
        }
        trace!(actor = id, target = %target, rounds, "Combat heartbeat");

        for _ in 0..rounds {
            if !self.is_present(id, &target) {
                break;
            }
            self.attack(id, &target);
        }

        if self.is_present(id, &target) {
            self.check_wimpy(id);
        }
    }

    /// Register occupants the actor's factions are aggressive toward
    fn pull_aggressive_occupants(&mut self, id: &str) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        let Some(factions) = actor.context().factions() else {
            return;
        };
        let Some(location) = actor.location().and_then(|l| self.locations.get(l)) else {
            return;
        };

        let occupants: Vec<Occupant> = location
            .occupants()
            .iter()
            .filter(|o| o.as_str() != id)
            .filter_map(|o| self.actors.get(o))
            .filter(|o| !o.is_dead())
            .map(|o| Occupant {
                id: o.id().to_string(),
                factions: o.context().factions().map(|f| f.factions()).unwrap_or_default(),
            })
            .collect();
        let targets = factions.aggressive_targets_in(&occupants);

        let now = self.now;
        if let Some(actor) = self.actors.get_mut(id) {
            for target in targets.iter().filter(|t| t.as_str() != id) {
                if actor.hostiles_mut().register(target, now) {
                    debug!(actor = id, target = %target, "Aggressive toward occupant");
                }
            }
        }
    }

    /// Flee when hit points drop below the wimpy threshold
    fn check_wimpy(&mut self, id: &str) {
        let Ok(resolver) = self.resolver(id) else {
            return;
        };
        let hp = resolver.current_vital(Vital::Hit);
        let max = resolver.max_vital(Vital::Hit);
        let wimpy = resolver.actor().wimpy();
        let Some(from) = resolver.actor().location().map(str::to_string) else {
            return;
        };
        if i64::from(hp) * 100 >= i64::from(max) * i64::from(wimpy) {
            return;
        }

        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        actor.notify(CombatEvent::RunAway);
        let destination = actor
            .context_mut()
            .movement_mut()
            .and_then(|movement| movement.flee(&from));
        let Some(destination) = destination else {
            debug!(actor = id, "Nowhere to flee");
            return;
        };
        if self.move_actor(id, &destination).is_err() {
            debug!(actor = id, destination = %destination, "Flee destination unknown");
            return;
        }
        self.notify(id, CombatEvent::Fled { destination });
        if let Some(actor) = self.actors.get_mut(id) {
            actor.add_spell_action(1);
        }
    }

    /// Regenerate each vital on its own countdown
    fn healing_heartbeat(&mut self, id: &str) {
        let step = self.config.heal_step;
        for vital in Vital::all() {
            let Ok(resolver) = self.resolver(id) else {
                return;
            };
            let current = resolver.current_vital(*vital);
            let max = resolver.max_vital(*vital);
            let amount = resolver.heal_amount(*vital);
            let interval = resolver.heal_interval(*vital);

            let Some(hb) = self.heartbeats.get_mut(id) else {
                return;
            };
            let countdown = hb.countdown(*vital);
            if countdown > 0 || current >= max {
                hb.set_countdown(*vital, countdown - step);
                continue;
            }
            hb.set_countdown(*vital, interval);
            if amount <= 0 {
                continue;
            }

            if let Some(actor) = self.actors.get_mut(id) {
                let healed = actor.vitals_mut().set(*vital, current + amount, max);
                if healed != current {
                    actor.notify(vital.changed_event(healed, max));
                    trace!(actor = id, ?vital, healed, "Healed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{CombatContext, Combatant};
    use crate::aggregate::InfluenceSource;
    use crate::capabilities::{AttributeScores, StaticBonuses};
    use crate::combat::{EventLog, StatusEffect};
    use crate::config::CombatConfig;
    use crate::world::{FleeRoute, Location};

    fn world() -> World {
        let mut world = World::new(CombatConfig {
            seed: Some(11),
            ..Default::default()
        });
        world.add_location(Location::new("arena", "Arena"));
        world
    }

    #[test]
    fn test_attack_delay_keeps_fight() {
        let log = EventLog::new();
        let mut world = world();
        world
            .spawn(
                Combatant::new("bob", "bob", CombatContext::builder().events(log.clone()).build()),
                "arena",
            )
            .unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();
        world.register_attacker("bob", "orc");
        world.add_combat_delay("bob", 2).unwrap();

        assert!(!world.attack("bob", "orc"));
        assert!(world.is_in_combat_with("bob", "orc"));
        assert_eq!(
            log.for_actor("bob"),
            vec![CombatEvent::CombatDelayed { remaining: 1 }]
        );
        assert!(!world.attack("bob", "orc"));
        assert!(world.attack("bob", "orc"));
    }

    #[test]
    fn test_attack_registers_both_sides() {
        let mut world = world();
        world.spawn(Combatant::new("bob", "bob", CombatContext::default()), "arena").unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();

        assert!(world.attack("bob", "orc"));
        assert!(world.is_in_combat_with("bob", "orc"));
        assert!(world.is_in_combat_with("orc", "bob"));
        assert!(world.has_heartbeat("bob"));
    }

    #[test]
    fn test_spell_action_blocks_attack() {
        let mut world = world();
        world.spawn(Combatant::new("bob", "bob", CombatContext::default()), "arena").unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();
        world.add_spell_action("bob", 1).unwrap();

        assert!(!world.attack("bob", "orc"));
        world.tick_actor("bob", 1);
        assert_eq!(world.actor("bob").unwrap().spell_action_delay(), 0);
    }

    #[test]
    fn test_select_target_requires_presence() {
        let mut world = world();
        world.add_location(Location::new("hall", "Hall"));
        world.spawn(Combatant::new("bob", "bob", CombatContext::default()), "arena").unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();
        world.register_attacker("bob", "orc");
        assert_eq!(world.select_target("bob").as_deref(), Some("orc"));

        world.move_actor("orc", "hall").unwrap();
        assert_eq!(world.select_target("bob"), None);
    }

    #[test]
    fn test_effects_expire_on_tick() {
        let log = EventLog::new();
        let mut world = world();
        world
            .spawn(
                Combatant::new("bob", "bob", CombatContext::builder().events(log.clone()).build()),
                "arena",
            )
            .unwrap();
        world
            .add_effect("bob", StatusEffect::new(CombatModifier::Haste, 2, 1))
            .unwrap();

        world.tick(1);
        assert!(world.actor("bob").unwrap().has_status(CombatModifier::Haste));
        world.tick(2);
        assert!(!world.actor("bob").unwrap().has_status(CombatModifier::Haste));
        assert_eq!(log.count("bob", "onEffectExpired"), 1);
    }

    #[test]
    fn test_healing_interval() {
        let mut world = world();
        let bob = Combatant::new(
            "bob",
            "bob",
            CombatContext::builder().attributes(AttributeScores::default()).build(),
        );
        world.spawn(bob, "arena").unwrap();
        world.hit("bob", 20, DamageType::Physical, None);
        let start = world.hit_points("bob").unwrap();

        // con 10 → effective 5 → heals 1 point
        world.tick(1);
        assert_eq!(world.hit_points("bob").unwrap(), start + 1);

        // countdown restarts at 20 and drops 2 per beat
        for now in 2..=11 {
            world.tick(now);
        }
        assert_eq!(world.hit_points("bob").unwrap(), start + 1);
        world.tick(12);
        assert_eq!(world.hit_points("bob").unwrap(), start + 2);
    }

    fn coward(wimpy: i32) -> Combatant {
        Combatant::new(
            "coward",
            "coward",
            CombatContext::builder()
                .movement(FleeRoute::new(&["hall"]))
                .build(),
        )
        .with_wimpy(wimpy)
    }

    #[test]
    fn test_wimpy_fractional_threshold() {
        let mut world = world();
        world.add_location(Location::new("hall", "Hall"));
        world.spawn(coward(5), "arena").unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();

        // 5% of 30 is 1.5, so a single remaining point is below it
        world.hit("coward", 29, DamageType::Physical, Some("orc"));
        assert_eq!(world.hit_points("coward").unwrap(), 1);
        world.tick(1);

        assert_eq!(world.actor("coward").unwrap().location(), Some("hall"));
    }

    #[test]
    fn test_wimpy_threshold_boundary() {
        let mut world = world();
        world.add_location(Location::new("hall", "Hall"));
        world.spawn(coward(50), "arena").unwrap();
        world.spawn(Combatant::new("orc", "orc", CombatContext::default()), "arena").unwrap();

        world.hit("coward", 15, DamageType::Physical, Some("orc"));
        world.tick(1);
        assert_eq!(world.actor("coward").unwrap().location(), Some("arena"));

        world.hit("coward", 1, DamageType::Physical, Some("orc"));
        world.tick(2);
        assert_eq!(world.actor("coward").unwrap().location(), Some("hall"));
    }

    #[test]
    fn test_negative_heal_never_drains() {
        let mut world = world();
        let cursed = Combatant::new(
            "cursed",
            "cursed",
            CombatContext::builder()
                .attributes(AttributeScores::default())
                .source(
                    InfluenceSource::Race,
                    StaticBonuses::new().with_bonus("BonusHealHitPoints", -100),
                )
                .build(),
        );
        world.spawn(cursed, "arena").unwrap();
        world.hit("cursed", 10, DamageType::Physical, None);
        let before = world.hit_points("cursed").unwrap();

        for now in 1..=30 {
            world.tick(now);
        }
        assert_eq!(world.hit_points("cursed").unwrap(), before);
        assert!(!world.actor("cursed").unwrap().is_dead());
    }

    #[test]
    fn test_tick_fires_once_per_now() {
        let mut world = world();
        world.spawn(Combatant::new("bob", "bob", CombatContext::default()), "arena").unwrap();
        assert!(world.tick_actor("bob", 5));
        assert!(!world.tick_actor("bob", 5));
        assert!(world.tick_actor("bob", 6));
        assert!(!world.tick_actor("nobody", 6));
    }
}
