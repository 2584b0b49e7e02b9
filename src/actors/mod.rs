//! Combatants and the capabilities attached to them

mod combatant;
mod context;
mod vitals;

pub use combatant::{Combatant, CombatantSnapshot};
pub use context::{CombatContext, CombatContextBuilder};
pub use vitals::{Vital, Vitals};
