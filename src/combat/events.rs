//! Combat notifications
//!
//! The engine reports state changes to each actor's event sink. Two sinks
//! ship with the crate: one forwarding to `tracing`, one recording events
//! in memory.

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

use super::{AttackKind, CombatModifier, DamageType};
use crate::capabilities::EventSink;
use crate::ActorId;

/// Something that happened to or was done by an actor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    HitPointsChanged { current: i32, max: i32 },
    SpellPointsChanged { current: i32, max: i32 },
    StaminaPointsChanged { current: i32, max: i32 },
    Hit { damage_type: DamageType, damage: i32 },
    Death { killer: Option<ActorId> },
    /// Death was prevented; the message explains why
    DeathAverted { message: String },
    Attack { target: ActorId },
    Attacked { attacker: ActorId },
    CombatDelayed { remaining: u32 },
    Fumble,
    CombatChatter { target: ActorId, attack: String, damage: i32 },
    Reflected { target: ActorId, damage: i32 },
    RunAway,
    Fled { destination: String },
    EffectExpired { modifier: CombatModifier },
    KillListRefused { foe: ActorId },
}

impl CombatEvent {
    /// Conventional handler name for this event
    pub fn name(&self) -> &'static str {
        match self {
            CombatEvent::HitPointsChanged { .. } => "onHitPointsChanged",
            CombatEvent::SpellPointsChanged { .. } => "onSpellPointsChanged",
            CombatEvent::StaminaPointsChanged { .. } => "onStaminaPointsChanged",
            CombatEvent::Hit { .. } => "onHit",
            CombatEvent::Death { .. } => "onDeath",
            CombatEvent::DeathAverted { .. } => "onDeathAverted",
            CombatEvent::Attack { .. } => "onAttack",
            CombatEvent::Attacked { .. } => "onAttacked",
            CombatEvent::CombatDelayed { .. } => "onCombatDelayed",
            CombatEvent::Fumble => "onFumble",
            CombatEvent::CombatChatter { .. } => "onCombatChatter",
            CombatEvent::Reflected { .. } => "onReflected",
            CombatEvent::RunAway => "onRunAway",
            CombatEvent::Fled { .. } => "onFled",
            CombatEvent::EffectExpired { .. } => "onEffectExpired",
            CombatEvent::KillListRefused { .. } => "onKillListRefused",
        }
    }

    /// Chatter line for a swing with the given attack
    pub fn chatter(target: &str, attack: AttackKind, weapon_name: &str, damage: i32) -> Self {
        let attack = if attack.is_weapon_attack() {
            weapon_name.to_string()
        } else {
            attack.to_string()
        };
        CombatEvent::CombatChatter {
            target: target.to_string(),
            attack,
            damage,
        }
    }
}

/// Forwards events to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn notify(&mut self, actor: &str, event: &CombatEvent) {
        debug!(actor, event = event.name(), details = ?event, "Combat event");
    }
}

/// Records events in memory; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<(ActorId, CombatEvent)>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(ActorId, CombatEvent)> {
        self.events.borrow().clone()
    }

    /// Events received by one actor, in order
    pub fn for_actor(&self, actor: &str) -> Vec<CombatEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(id, _)| id == actor)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// How many events with a handler name one actor received
    pub fn count(&self, actor: &str, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|(id, event)| id == actor && event.name() == name)
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for EventLog {
    fn notify(&mut self, actor: &str, event: &CombatEvent) {
        self.events
            .borrow_mut()
            .push((actor.to_string(), event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_is_shared_between_clones() {
        let log = EventLog::new();
        let mut sink = log.clone();
        sink.notify("bob", &CombatEvent::Fumble);
        sink.notify("alice", &CombatEvent::RunAway);
        sink.notify("bob", &CombatEvent::RunAway);

        assert_eq!(log.events().len(), 3);
        assert_eq!(log.for_actor("bob"), vec![CombatEvent::Fumble, CombatEvent::RunAway]);
        assert_eq!(log.count("bob", "onRunAway"), 1);

        log.clear();
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_chatter_names_weapon_or_attack() {
        let swing = CombatEvent::chatter("orc", AttackKind::WieldedPrimary, "long sword", 7);
        assert_eq!(
            swing,
            CombatEvent::CombatChatter {
                target: "orc".to_string(),
                attack: "long sword".to_string(),
                damage: 7
            }
        );

        let bite = CombatEvent::chatter("orc", AttackKind::Bite, "bite", 3);
        assert!(matches!(bite, CombatEvent::CombatChatter { attack, .. } if attack == "bite"));
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(CombatEvent::Hit {
            damage_type: DamageType::Fire,
            damage: 4,
        })
        .unwrap();
        assert_eq!(json["event"], "hit");
        assert_eq!(json["damage_type"], "fire");
    }
}
