//! mudcombat - combat resolution core for a MUD
//!
//! Actors fight through a single-threaded, tick-driven [`World`]: attack
//! rounds roll to-hit and damage from aggregated bonuses, hits feed a death
//! pipeline (corpses, experience, faction standing, persistence), and
//! heartbeats run automatic rounds, flight and regeneration.
//!
//! Everything an actor brings to a fight (inventory, skills, attributes,
//! factions, ...) is an optional capability; see [`capabilities`].

pub mod actors;
pub mod aggregate;
pub mod arena;
pub mod capabilities;
pub mod combat;
pub mod config;
pub mod error;
pub mod timers;
pub mod world;

/// Unique identifier of an actor
pub type ActorId = String;

/// Unique identifier of a location
pub type LocationId = String;

pub use actors::{CombatContext, Combatant, Vital};
pub use config::{CombatConfig, Settings};
pub use error::{CombatError, HitRefusal};
pub use world::World;
