//! Common test utilities - ArenaTest harness for end-to-end combat tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mudcombat::actors::{CombatContextBuilder, CombatantSnapshot};
use mudcombat::capabilities::{CombatAi, CombatHooks, Factions, Occupant, Persistence, Progression};
use mudcombat::combat::EventLog;
use mudcombat::world::{Location, Zone};
use mudcombat::{ActorId, CombatConfig, CombatContext, Combatant, World};

/// A seeded world with an arena, a hall and a temple, recording every event
pub struct ArenaTest {
    pub world: World,
    pub log: EventLog,
}

impl ArenaTest {
    pub fn start() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut world = World::new(CombatConfig {
            seed: Some(seed),
            ..Default::default()
        });
        world.add_location(Location::new("arena", "Arena"));
        world.add_location(Location::new("hall", "Hall"));
        world.add_location(Location::new("temple", "Temple").with_environment(Zone::sanctuary()));

        Self {
            world,
            log: EventLog::new(),
        }
    }

    /// Context builder already wired to the shared event log
    pub fn context(&self) -> CombatContextBuilder {
        CombatContext::builder().events(self.log.clone())
    }

    /// A combatant with no capabilities beyond event logging
    pub fn plain(&self, id: &str) -> Combatant {
        Combatant::new(id, id, self.context().build())
    }

    pub fn spawn(&mut self, combatant: Combatant) {
        self.spawn_at(combatant, "arena");
    }

    pub fn spawn_at(&mut self, combatant: Combatant, location: &str) {
        self.world
            .spawn(combatant, location)
            .expect("Failed to spawn combatant");
    }

    pub fn count(&self, actor: &str, event: &str) -> usize {
        self.log.count(actor, event)
    }

    pub fn run(&mut self, ticks: std::ops::RangeInclusive<u64>) {
        for now in ticks {
            self.world.tick(now);
        }
    }
}

/// Progression whose earned experience stays observable after the actor is boxed
#[derive(Clone, Default)]
pub struct SharedLevel {
    pub level: i32,
    pub value: i32,
    pub earned: Rc<Cell<i32>>,
}

impl SharedLevel {
    pub fn new(level: i32, value: i32) -> Self {
        Self {
            level,
            value,
            earned: Rc::new(Cell::new(0)),
        }
    }
}

impl Progression for SharedLevel {
    fn level(&self) -> i32 {
        self.level
    }

    fn experience_value(&self) -> i32 {
        self.value
    }

    fn add_experience(&mut self, amount: i32) {
        self.earned.set(self.earned.get() + amount);
    }
}

/// Faction capability recording every disposition change
#[derive(Clone, Default)]
pub struct SharedStanding {
    pub factions: Vec<String>,
    pub changes: Rc<RefCell<Vec<(String, i32, bool)>>>,
}

impl SharedStanding {
    pub fn member_of(factions: &[&str]) -> Self {
        Self {
            factions: factions.iter().map(|f| f.to_string()).collect(),
            changes: Rc::default(),
        }
    }
}

impl Factions for SharedStanding {
    fn factions(&self) -> Vec<String> {
        self.factions.clone()
    }

    fn update_disposition(&mut self, faction: &str, delta: i32, is_kill: bool) {
        self.changes
            .borrow_mut()
            .push((faction.to_string(), delta, is_kill));
    }

    fn aggressive_targets_in(&self, _occupants: &[Occupant]) -> Vec<ActorId> {
        Vec::new()
    }
}

/// Persistence that keeps snapshots in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub saved: Rc<RefCell<Vec<CombatantSnapshot>>>,
}

impl Persistence for MemoryStore {
    fn save(&mut self, snapshot: &CombatantSnapshot) -> anyhow::Result<()> {
        self.saved.borrow_mut().push(snapshot.clone());
        Ok(())
    }
}

/// Persistence that always fails
pub struct BrokenStore;

impl Persistence for BrokenStore {
    fn save(&mut self, _snapshot: &CombatantSnapshot) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

/// AI that counts how often it was consulted
#[derive(Clone, Default)]
pub struct CountingAi {
    pub calls: Rc<Cell<u32>>,
}

impl CombatAi for CountingAi {
    fn combat_action(&mut self, _target: &str) {
        self.calls.set(self.calls.get() + 1);
    }
}

/// Hooks that survive destruction after death
pub struct Phylactery;

impl CombatHooks for Phylactery {
    fn second_life(&mut self) -> bool {
        true
    }
}
