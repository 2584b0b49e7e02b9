//! Hit, spell and stamina point pools
//!
//! Maxima depend on live bonuses, so current values are stored raw and
//! clamped against the live maximum whenever they are observed.

use serde::{Deserialize, Serialize};

use crate::combat::CombatEvent;

/// One of the three regenerating resource pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vital {
    Hit,
    Spell,
    Stamina,
}

impl Vital {
    pub fn all() -> &'static [Vital] {
        &[Vital::Hit, Vital::Spell, Vital::Stamina]
    }

    /// Item property raising the maximum
    pub fn max_item_key(&self) -> &'static str {
        match self {
            Vital::Hit => "bonus hit points",
            Vital::Spell => "bonus spell points",
            Vital::Stamina => "bonus stamina points",
        }
    }

    /// Aggregated bonus raising the maximum
    pub fn max_bonus_key(&self) -> &'static str {
        match self {
            Vital::Hit => "MaxHitPoints",
            Vital::Spell => "MaxSpellPoints",
            Vital::Stamina => "MaxStaminaPoints",
        }
    }

    pub fn heal_bonus_key(&self) -> &'static str {
        match self {
            Vital::Hit => "BonusHealHitPoints",
            Vital::Spell => "BonusHealSpellPoints",
            Vital::Stamina => "BonusHealStamina",
        }
    }

    pub fn heal_item_key(&self) -> &'static str {
        match self {
            Vital::Hit => "bonus heal hit points",
            Vital::Spell => "bonus heal spell points",
            Vital::Stamina => "bonus heal stamina",
        }
    }

    pub fn heal_rate_bonus_key(&self) -> &'static str {
        match self {
            Vital::Hit => "BonusHealHitPointsRate",
            Vital::Spell => "BonusHealSpellPointsRate",
            Vital::Stamina => "BonusHealStaminaRate",
        }
    }

    pub fn heal_rate_item_key(&self) -> &'static str {
        match self {
            Vital::Hit => "bonus heal hit points rate",
            Vital::Spell => "bonus heal spell points rate",
            Vital::Stamina => "bonus heal stamina rate",
        }
    }

    /// Guild modifier and aggregated bonus applied to gains
    pub fn recover_keys(&self) -> (&'static str, &'static str) {
        match self {
            Vital::Hit => ("bonus recover hit points", "RecoverHitPoints"),
            Vital::Spell => ("bonus recover spell points", "RecoverSpellPoints"),
            Vital::Stamina => ("bonus recover stamina points", "RecoverStaminaPoints"),
        }
    }

    /// Guild modifier and aggregated bonus applied to costs
    pub fn reduce_keys(&self) -> (&'static str, &'static str) {
        match self {
            Vital::Hit => ("bonus reduce hit points", "ReduceHitPoints"),
            Vital::Spell => ("bonus reduce spell points", "ReduceSpellPoints"),
            Vital::Stamina => ("bonus reduce stamina points", "ReduceStaminaPoints"),
        }
    }

    /// The event announcing a change to this pool
    pub fn changed_event(&self, current: i32, max: i32) -> CombatEvent {
        match self {
            Vital::Hit => CombatEvent::HitPointsChanged { current, max },
            Vital::Spell => CombatEvent::SpellPointsChanged { current, max },
            Vital::Stamina => CombatEvent::StaminaPointsChanged { current, max },
        }
    }
}

impl std::fmt::Display for Vital {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Vital::Hit => "hit points",
            Vital::Spell => "spell points",
            Vital::Stamina => "stamina points",
        };
        write!(f, "{}", s)
    }
}

/// Raw pool values and configured base maxima
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    hit: i32,
    spell: i32,
    stamina: i32,
    base_max_hit: Option<i32>,
    base_max_spell: Option<i32>,
    base_max_stamina: Option<i32>,
}

impl Vitals {
    /// Empty pools with no configured maxima
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, vital: Vital) -> i32 {
        match vital {
            Vital::Hit => self.hit,
            Vital::Spell => self.spell,
            Vital::Stamina => self.stamina,
        }
    }

    fn base_slot(&mut self, vital: Vital) -> &mut Option<i32> {
        match vital {
            Vital::Hit => &mut self.base_max_hit,
            Vital::Spell => &mut self.base_max_spell,
            Vital::Stamina => &mut self.base_max_stamina,
        }
    }

    /// Base maximum, if one was set or filled in at spawn
    pub fn base_max(&self, vital: Vital) -> Option<i32> {
        match vital {
            Vital::Hit => self.base_max_hit,
            Vital::Spell => self.base_max_spell,
            Vital::Stamina => self.base_max_stamina,
        }
    }

    pub fn set_base_max(&mut self, vital: Vital, value: i32) {
        *self.base_slot(vital) = Some(value.max(1));
    }

    /// Configure every base maximum that was not set explicitly
    pub fn fill_base_max(&mut self, default: i32) {
        for vital in Vital::all() {
            let slot = self.base_slot(*vital);
            if slot.is_none() {
                *slot = Some(default.max(1));
            }
        }
    }

    /// Current value clamped to `[0, max]`
    pub fn current(&self, vital: Vital, max: i32) -> i32 {
        self.raw(vital).clamp(0, max.max(0))
    }

    /// Store a new value clamped to `[0, max]`, returning it
    pub fn set(&mut self, vital: Vital, value: i32, max: i32) -> i32 {
        let value = value.clamp(0, max.max(0));
        match vital {
            Vital::Hit => self.hit = value,
            Vital::Spell => self.spell = value,
            Vital::Stamina => self.stamina = value,
        }
        value
    }
}
