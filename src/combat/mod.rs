//! Combat system module
//!
//! Pure combat building blocks:
//! - Damage types and resistance
//! - Attack kinds, attack lists and weapons
//! - To-hit, damage, soak and vital formulas
//! - Timed status effects
//! - Hostile registries, kill statistics and corpses
//! - Combat events and sinks
//!
//! The stateful pieces that tie these together live in [`crate::world`].

mod attacks;
mod damage;
mod death;
mod effects;
mod events;
mod hostiles;
mod resolver;
pub mod roll;
mod statistics;

pub use attacks::{assemble, AttackEntry, AttackKind, NaturalAttack, Weapon};
pub use damage::{resistance_from_percent, DamageType};
pub use death::{Corpse, CorpseFactory, StandardCorpseFactory};
pub use effects::{ActiveEffects, CombatModifier, StatusEffect};
pub use events::{CombatEvent, EventLog, TracingEvents};
pub use hostiles::{Engagement, HostileRegistry};
pub use resolver::{damage_modifier_from_attack, AttackOutcome, CombatResolver, FUMBLE};
pub use statistics::{CombatStatistics, KillRecord};
