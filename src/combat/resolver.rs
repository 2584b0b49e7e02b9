//! Combat formulas
//!
//! Every number combat needs is computed here from an actor's capabilities,
//! its status modifiers and the aggregated influence-source bonuses:
//! to-hit, defend, damage, soak, resistance, vital maxima and heal rates.
//! Percentage modifiers are applied one after another, truncating after each.

use rand::RngCore;

use super::{damage::resistance_from_percent, roll, CombatModifier, DamageType, Weapon};
use crate::actors::{Combatant, Vital};
use crate::aggregate::aggregate;
use crate::capabilities::{EquipmentSlot, Environment, ModifierCategory};
use crate::config::{CombatConfig, MAX_REFLECTION_CAP};

/// To-hit value of a fumble; nothing scores lower
pub const FUMBLE: i32 = -101;

/// Classification of a final to-hit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Fumble,
    Miss,
    Hit,
    GoodHit,
    GreatHit,
    Critical,
    Devastating,
}

impl AttackOutcome {
    pub fn from_to_hit(to_hit: i32) -> Self {
        match to_hit {
            i32::MIN..=FUMBLE => AttackOutcome::Fumble,
            -100..=10 => AttackOutcome::Miss,
            11..=95 => AttackOutcome::Hit,
            96..=135 => AttackOutcome::GoodHit,
            136..=150 => AttackOutcome::GreatHit,
            151..=200 => AttackOutcome::Critical,
            _ => AttackOutcome::Devastating,
        }
    }

    /// Damage multiplier for this outcome
    pub fn multiplier(&self) -> f64 {
        match self {
            AttackOutcome::Fumble | AttackOutcome::Miss => 0.0,
            AttackOutcome::Hit => 1.0,
            AttackOutcome::GoodHit => 1.1,
            AttackOutcome::GreatHit => 1.25,
            AttackOutcome::Critical => 1.5,
            AttackOutcome::Devastating => 2.0,
        }
    }

    pub fn landed(&self) -> bool {
        self.multiplier() > 0.0
    }
}

/// Damage multiplier for a final to-hit value
pub fn damage_modifier_from_attack(to_hit: i32) -> f64 {
    AttackOutcome::from_to_hit(to_hit).multiplier()
}

/// Apply a percentage modifier with truncation toward zero
fn scale(value: i32, factor: f64) -> i32 {
    (value as f64 * factor) as i32
}

/// Formulas evaluated for one actor standing in one environment
#[derive(Clone, Copy)]
pub struct CombatResolver<'a> {
    actor: &'a Combatant,
    environment: Option<&'a dyn Environment>,
    config: &'a CombatConfig,
}

impl<'a> CombatResolver<'a> {
    pub fn new(
        actor: &'a Combatant,
        environment: Option<&'a dyn Environment>,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            actor,
            environment,
            config,
        }
    }

    pub fn actor(&self) -> &'a Combatant {
        self.actor
    }

    pub fn aggregate(&self, bonus: &str) -> i32 {
        aggregate(bonus, self.actor, self.environment)
    }

    /// Sum of a combat modifier across equipment and attachments
    fn item_bonus(&self, key: &str) -> i32 {
        self.actor
            .context()
            .inventory()
            .map(|inv| inv.modifier(ModifierCategory::CombatModifiers, key))
            .unwrap_or(0)
    }

    fn guild_bonus(&self, key: &str) -> i32 {
        self.actor
            .context()
            .inventory()
            .map(|inv| inv.modifier(ModifierCategory::GuildModifiers, key))
            .unwrap_or(0)
    }

    fn has(&self, modifier: CombatModifier) -> bool {
        self.actor.has_status(modifier)
    }

    /// Adjustment for fighting without sight
    fn blind_fighting(&self) -> i32 {
        let ctx = self.actor.context();
        match (ctx.senses(), ctx.skills()) {
            (Some(senses), Some(skills)) if !senses.can_see() => {
                skills.skill_modifier("blind fighting") - 10
            }
            _ => 0,
        }
    }

    /// Ability to avoid being hit
    pub fn defend_attack(&self) -> i32 {
        let ctx = self.actor.context();
        let mut value = 0;

        if let Some(inventory) = ctx.inventory() {
            value += inventory.defend_attack_bonus() - inventory.encumbrance();

            if let Some(skills) = ctx.skills() {
                let primary = inventory.equipped(EquipmentSlot::WieldedPrimary);
                if let Some(skill) = primary.and_then(|w| w.weapon_type.as_deref()) {
                    value += skills.skill_modifier(skill).max(0) / 4;
                }

                if let Some(offhand) = inventory.equipped(EquipmentSlot::WieldedOffhand) {
                    let is_primary = primary.is_some_and(|p| p.id == offhand.id);
                    if offhand.is_shield() {
                        value += skills.skill_modifier("shield").max(0);
                    } else if let (false, Some(skill)) = (is_primary, offhand.weapon_type.as_deref()) {
                        value += skills.skill_modifier(skill).max(0) / 4;
                    }
                }

                if let Some(armor) = inventory.equipped(EquipmentSlot::Armor) {
                    if let Some(skill) = armor.armor_type.as_deref() {
                        value += skills.skill_modifier(skill) - armor.get("skill penalty");
                    }
                }
            }
        }

        if self.has(CombatModifier::Disease) {
            value = scale(value, 0.9);
        }

        value += self.aggregate("DefendAttackBonus");
        value += self.blind_fighting();

        if let Some(attributes) = ctx.attributes() {
            value += attributes.dexterity_bonus() / 2 + attributes.wisdom_bonus() / 2;
        }

        value + ctx.hooks().map(|h| h.magical_defend_attack_bonus()).unwrap_or(0)
    }

    /// Final to-hit value of a swing at `defender`
    pub fn attack(
        &self,
        defender: &CombatResolver<'_>,
        weapon: &Weapon,
        rng: Option<&mut dyn RngCore>,
    ) -> i32 {
        let ctx = self.actor.context();
        let mut value = ctx.hooks().map(|h| h.magical_attack_bonus()).unwrap_or(0);

        if let Some(rng) = rng {
            value += roll::to_hit_offset(rng);
        }
        value -= defender.defend_attack();

        if let Some(inventory) = ctx.inventory() {
            value -= inventory.encumbrance();
            if let Weapon::Item(item) = weapon {
                if inventory.is_equipped(item) {
                    value += inventory.attack_bonus(item);
                }
            }
            if let Weapon::Natural(attack) = weapon {
                value += attack.calculate_attack();
            }
        }

        if self.has(CombatModifier::Disease) {
            value = scale(value, 0.9);
        }
        if self.has(CombatModifier::Enfeebled) {
            value = scale(value, 0.85);
        }
        if self.has(CombatModifier::Fortified) {
            value = scale(value, 1.15);
        }

        value += self.aggregate("AttackBonus");
        value += self.blind_fighting();

        if let Some(attributes) = ctx.attributes() {
            value += attributes.dexterity_bonus() / 2 + attributes.intelligence_bonus() / 2;
        }

        if value < -100 {
            FUMBLE
        } else {
            value
        }
    }

    /// Flat damage absorbed from a hit of the given type
    pub fn soak_damage(&self, damage_type: DamageType) -> i32 {
        let ctx = self.actor.context();
        let mut value = ctx
            .inventory()
            .map(|inv| inv.defense_bonus(damage_type))
            .unwrap_or(0);

        if self.has(CombatModifier::Paralysis) {
            value = scale(value, 0.9);
        }

        value += self.aggregate("DefenseBonus");

        if let Some(attributes) = ctx.attributes() {
            value += attributes.constitution_bonus() / 2 + attributes.strength_bonus() / 2;
        }

        value + ctx.hooks().map(|h| h.magical_defense_bonus()).unwrap_or(0)
    }

    /// Damage dealt by one landed swing before the outcome multiplier
    pub fn damage(
        &self,
        weapon: &Weapon,
        damage_type: DamageType,
        rng: Option<&mut dyn RngCore>,
    ) -> i32 {
        let ctx = self.actor.context();
        let mut value = match weapon {
            Weapon::Natural(attack) => attack.calculate_damage(),
            Weapon::Item(_) => 0,
        };

        if let Some(inventory) = ctx.inventory() {
            value += inventory.damage_bonus(weapon, damage_type);
        }

        if self.has(CombatModifier::Enfeebled) {
            value = scale(value, 0.75);
        }
        if self.has(CombatModifier::Fortified) {
            value = scale(value, 1.25);
        }

        value += self.aggregate("DamageBonus");

        if let Some(attributes) = ctx.attributes() {
            if damage_type == DamageType::Physical || weapon.is_natural() {
                value += attributes.strength_bonus() / 2;
            }
            if value != 0 {
                value += attributes.intelligence_bonus() / 4 + attributes.wisdom_bonus() / 4;
            }
        }

        value += ctx.hooks().map(|h| h.magical_damage_bonus()).unwrap_or(0);

        if let Some(rng) = rng {
            value += roll::damage_variance(rng, value);
        }

        value.max(0)
    }

    /// Percentage reduction from "resist <type>" bonuses
    pub fn damage_resistance(&self, damage: i32, damage_type: DamageType) -> i32 {
        resistance_from_percent(damage, self.aggregate(&damage_type.resistance_bonus()))
    }

    /// Live maximum of a vital, never below 1
    pub fn max_vital(&self, vital: Vital) -> i32 {
        let mut value = self
            .actor
            .vitals()
            .base_max(vital)
            .unwrap_or(self.config.default_vital_maximum)
            + self.item_bonus(vital.max_item_key())
            + self.aggregate(vital.max_bonus_key());

        if let Some(attributes) = self.actor.context().attributes() {
            value += match vital {
                Vital::Hit => 6 * attributes.constitution(),
                Vital::Spell => 3 * attributes.intelligence() + 3 * attributes.wisdom(),
                Vital::Stamina => 3 * attributes.strength() + 3 * attributes.constitution(),
            };
        }

        value.max(1)
    }

    /// Current value of a vital, clamped to its live maximum
    pub fn current_vital(&self, vital: Vital) -> i32 {
        self.actor.vitals().current(vital, self.max_vital(vital))
    }

    /// Adjust a spell or stamina change by recover/reduce bonuses
    pub fn adjusted_delta(&self, vital: Vital, delta: i32) -> i32 {
        let (item_key, bonus_key) = match delta {
            d if d > 0 => vital.recover_keys(),
            d if d < 0 => vital.reduce_keys(),
            _ => return 0,
        };
        delta + self.guild_bonus(item_key) + self.aggregate(bonus_key)
    }

    /// Points restored when a vital's heal countdown expires
    pub fn heal_amount(&self, vital: Vital) -> i32 {
        let Some(attributes) = self.actor.context().attributes() else {
            return 0;
        };

        let base = match vital {
            Vital::Hit => 1 + attributes.constitution() / 10,
            Vital::Spell => 1 + (attributes.intelligence() + attributes.wisdom()) / 12,
            Vital::Stamina => 1 + attributes.constitution() / 10 + attributes.dexterity() / 15,
        };
        base + self.aggregate(vital.heal_bonus_key()) + self.item_bonus(vital.heal_item_key())
    }

    /// Ticks between heals of a vital
    pub fn heal_interval(&self, vital: Vital) -> i32 {
        if self.actor.context().attributes().is_none() {
            return self.config.heal_interval;
        }

        let interval = self.config.heal_interval
            - self.aggregate(vital.heal_rate_bonus_key())
            - self.item_bonus(vital.heal_rate_item_key());
        interval.max(self.config.min_heal_interval)
    }

    /// Percentage of incoming damage reflected at the attacker's side
    pub fn damage_reflection(&self) -> i32 {
        self.actor
            .status(CombatModifier::DamageReflection)
            .clamp(0, self.config.reflection_cap.clamp(0, MAX_REFLECTION_CAP))
    }
}
