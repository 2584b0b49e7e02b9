//! Capabilities a combatant may carry
//!
//! Every capability is optional. An actor without one contributes zero to
//! the formulas that would have consulted it, so combat math is always
//! computable. Capabilities are resolved once when the actor's
//! [`CombatContext`](crate::actors::CombatContext) is built.

mod equipment;
mod persistence;
mod standard;

pub use equipment::{Equipment, EquipmentSlot, Item, ModifierCategory, ModifierObject};
pub use persistence::JsonSnapshotStore;
pub use standard::{AttributeScores, FactionMembership, MonsterLevel, SkillSet, StaticBonuses};

use crate::actors::{Combatant, CombatantSnapshot};
use crate::combat::{AttackEntry, CombatEvent, DamageType, Weapon};
use crate::ActorId;

/// Worn and wielded items plus registered modifier objects
pub trait Inventory {
    /// Total encumbrance of everything carried
    fn encumbrance(&self) -> i32;

    /// To-hit bonus when swinging an equipped weapon
    fn attack_bonus(&self, weapon: &Item) -> i32;

    /// Flat damage soak against a damage type
    fn defense_bonus(&self, damage_type: DamageType) -> i32;

    /// Damage bonus for a weapon and damage type pair
    fn damage_bonus(&self, weapon: &Weapon, damage_type: DamageType) -> i32;

    /// Bonus to avoid being hit
    fn defend_attack_bonus(&self) -> i32;

    /// Value of a named modifier within a category
    fn modifier(&self, category: ModifierCategory, name: &str) -> i32;

    fn equipped(&self, slot: EquipmentSlot) -> Option<&Item>;

    fn is_equipped(&self, item: &Item) -> bool;

    /// Damage types a weapon deals beyond its primary one
    fn extra_damage_types(&self, weapon: &Item) -> Vec<DamageType>;

    /// Modifier objects attached to the wearer
    fn registered_modifiers(&self) -> &[ModifierObject] {
        &[]
    }
}

pub trait Skills {
    fn skill_modifier(&self, skill: &str) -> i32;
}

/// Effective attribute values and their derived bonuses
pub trait Attributes {
    fn strength(&self) -> i32;
    fn dexterity(&self) -> i32;
    fn constitution(&self) -> i32;
    fn intelligence(&self) -> i32;
    fn wisdom(&self) -> i32;

    fn strength_bonus(&self) -> i32;
    fn dexterity_bonus(&self) -> i32;
    fn constitution_bonus(&self) -> i32;
    fn intelligence_bonus(&self) -> i32;
    fn wisdom_bonus(&self) -> i32;
}

/// A named influence source: race, guild, research, and so on
pub trait BonusProvider {
    /// Contribution to a named bonus; 0 when the source has no opinion
    fn bonus_to(&self, bonus: &str) -> i32;

    /// Attacks this source grants every round
    fn extra_attacks(&self) -> Vec<AttackEntry> {
        Vec::new()
    }

    fn has_trait_root(&self, _root: &str) -> bool {
        false
    }
}

/// Properties of the location an actor stands in
pub trait Environment {
    /// Bonus granted to a specific actor; environments may favor some actors
    fn environmental_bonus_to(&self, _bonus: &str, _actor: &Combatant) -> i32 {
        0
    }

    fn violence_prohibited(&self) -> bool {
        false
    }

    /// A message when this place refuses to let durable actors die
    fn suppress_death(&self) -> Option<String> {
        None
    }
}

/// Another actor in the same location, as seen by faction logic
#[derive(Debug, Clone)]
pub struct Occupant {
    pub id: ActorId,
    pub factions: Vec<String>,
}

pub trait Factions {
    /// Factions this actor belongs to
    fn factions(&self) -> Vec<String>;

    /// Change this actor's standing with a faction
    fn update_disposition(&mut self, faction: &str, delta: i32, is_kill: bool);

    /// Occupants this actor should attack on sight
    fn aggressive_targets_in(&self, occupants: &[Occupant]) -> Vec<ActorId>;
}

pub trait EventSink {
    fn notify(&mut self, actor: &str, event: &CombatEvent);
}

/// Durable storage for an actor's state
pub trait Persistence {
    fn save(&mut self, snapshot: &CombatantSnapshot) -> anyhow::Result<()>;
}

pub trait Movement {
    /// Pick an escape destination from the given location
    fn flee(&mut self, from: &str) -> Option<String>;
}

pub trait CombatAi {
    /// Called once per combat heartbeat before attacks are made
    fn combat_action(&mut self, target: &str);
}

/// Level and experience
pub trait Progression {
    fn level(&self) -> i32;

    /// Experience an attacker draws from damaging this actor
    fn experience_value(&self) -> i32;

    fn add_experience(&mut self, amount: i32);
}

pub trait Senses {
    fn can_see(&self) -> bool;
}

/// Per-actor overrides
pub trait CombatHooks {
    fn magical_attack_bonus(&self) -> i32 {
        0
    }

    fn magical_defend_attack_bonus(&self) -> i32 {
        0
    }

    fn magical_defense_bonus(&self) -> i32 {
        0
    }

    fn magical_damage_bonus(&self) -> i32 {
        0
    }

    /// Return true to survive destruction after a death
    fn second_life(&mut self) -> bool {
        false
    }
}
