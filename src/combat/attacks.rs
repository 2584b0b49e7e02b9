//! Attack types and per-round attack list assembly
//!
//! An attack round iterates an attack list rebuilt from scratch each round:
//! innate attacks, wielded weapons, and every active bonus-attack source.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::DamageType;
use crate::actors::Combatant;
use crate::capabilities::{EquipmentSlot, Inventory, Item};
use crate::config::CombatConfig;

/// Kinds of attack an actor can make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Swing whatever is in the primary weapon slot
    WieldedPrimary,
    /// Swing whatever is in the offhand weapon slot
    WieldedOffhand,
    Unarmed,
    Claw,
    Bite,
    Beak,
    Tongue,
    Bludgeon,
    Energy,
    Psionic,
    Fire,
    Cold,
    Acid,
    Electricity,
    Sonic,
    Poison,
    Magical,
}

impl AttackKind {
    /// Attack kinds with self-contained to-hit and damage values
    pub fn natural() -> &'static [AttackKind] {
        &[
            AttackKind::Unarmed,
            AttackKind::Claw,
            AttackKind::Bite,
            AttackKind::Beak,
            AttackKind::Tongue,
            AttackKind::Bludgeon,
            AttackKind::Energy,
            AttackKind::Psionic,
            AttackKind::Fire,
            AttackKind::Cold,
            AttackKind::Acid,
            AttackKind::Electricity,
            AttackKind::Sonic,
            AttackKind::Poison,
            AttackKind::Magical,
        ]
    }

    /// Whether this attack uses an equipment slot
    pub fn is_weapon_attack(&self) -> bool {
        matches!(self, AttackKind::WieldedPrimary | AttackKind::WieldedOffhand)
    }

    /// Equipment slot swung by a weapon attack
    pub fn slot(&self) -> Option<EquipmentSlot> {
        match self {
            AttackKind::WieldedPrimary => Some(EquipmentSlot::WieldedPrimary),
            AttackKind::WieldedOffhand => Some(EquipmentSlot::WieldedOffhand),
            _ => None,
        }
    }

    /// Damage type dealt by a natural attack
    pub fn damage_type(&self) -> DamageType {
        match self {
            AttackKind::Claw => DamageType::Slash,
            AttackKind::Bite => DamageType::Thrust,
            AttackKind::Bludgeon => DamageType::Bludgeon,
            AttackKind::Energy => DamageType::Energy,
            AttackKind::Psionic => DamageType::Psionic,
            AttackKind::Fire => DamageType::Fire,
            AttackKind::Cold => DamageType::Cold,
            AttackKind::Acid => DamageType::Acid,
            AttackKind::Electricity => DamageType::Electricity,
            AttackKind::Sonic => DamageType::Sonic,
            AttackKind::Poison => DamageType::Poison,
            AttackKind::Magical => DamageType::Magical,
            AttackKind::WieldedPrimary
            | AttackKind::WieldedOffhand
            | AttackKind::Unarmed
            | AttackKind::Beak
            | AttackKind::Tongue => DamageType::Physical,
        }
    }

    /// Modifier-object property granting an extra attack of this kind
    pub fn bonus_key(&self) -> String {
        format!("bonus {} attack", self)
    }
}

impl FromStr for AttackKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wielded primary" | "wielded_primary" => Ok(AttackKind::WieldedPrimary),
            "wielded offhand" | "wielded_offhand" => Ok(AttackKind::WieldedOffhand),
            "unarmed" => Ok(AttackKind::Unarmed),
            "claw" => Ok(AttackKind::Claw),
            "bite" => Ok(AttackKind::Bite),
            "beak" => Ok(AttackKind::Beak),
            "tongue" => Ok(AttackKind::Tongue),
            "bludgeon" => Ok(AttackKind::Bludgeon),
            "energy" => Ok(AttackKind::Energy),
            "psionic" => Ok(AttackKind::Psionic),
            "fire" => Ok(AttackKind::Fire),
            "cold" | "ice" => Ok(AttackKind::Cold),
            "acid" => Ok(AttackKind::Acid),
            "electricity" => Ok(AttackKind::Electricity),
            "sonic" => Ok(AttackKind::Sonic),
            "poison" => Ok(AttackKind::Poison),
            "magical" => Ok(AttackKind::Magical),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for AttackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttackKind::WieldedPrimary => "wielded primary",
            AttackKind::WieldedOffhand => "wielded offhand",
            AttackKind::Unarmed => "unarmed",
            AttackKind::Claw => "claw",
            AttackKind::Bite => "bite",
            AttackKind::Beak => "beak",
            AttackKind::Tongue => "tongue",
            AttackKind::Bludgeon => "bludgeon",
            AttackKind::Energy => "energy",
            AttackKind::Psionic => "psionic",
            AttackKind::Fire => "fire",
            AttackKind::Cold => "cold",
            AttackKind::Acid => "acid",
            AttackKind::Electricity => "electricity",
            AttackKind::Sonic => "sonic",
            AttackKind::Poison => "poison",
            AttackKind::Magical => "magical",
        };
        write!(f, "{}", s)
    }
}

/// One attack opportunity in a combat round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackEntry {
    pub kind: AttackKind,
    /// Base to-hit for natural attacks; unused for weapon attacks
    pub to_hit: i32,
    /// Base damage for natural attacks; unused for weapon attacks
    pub damage: i32,
}

impl AttackEntry {
    pub fn new(kind: AttackKind, to_hit: i32, damage: i32) -> Self {
        Self { kind, to_hit, damage }
    }

    /// A swing of the weapon in the given slot
    pub fn weapon(kind: AttackKind) -> Self {
        Self::new(kind, 0, 0)
    }

    pub fn is_weapon_attack(&self) -> bool {
        self.kind.is_weapon_attack()
    }

    /// Natural attacks need damage to be usable
    pub fn is_valid(&self) -> bool {
        self.kind.is_weapon_attack() || self.damage != 0
    }

    /// The natural attack this entry describes, if any
    pub fn natural(&self) -> Option<NaturalAttack> {
        (!self.kind.is_weapon_attack()).then(|| NaturalAttack::new(self.kind, self.to_hit, self.damage))
    }
}

/// An attack that is not an equipped item: fists, claws, breath, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaturalAttack {
    pub kind: AttackKind,
    pub to_hit: i32,
    pub damage: i32,
}

impl NaturalAttack {
    pub fn new(kind: AttackKind, to_hit: i32, damage: i32) -> Self {
        Self { kind, to_hit, damage }
    }

    /// The default bare-handed attack
    pub fn unarmed(config: &CombatConfig) -> Self {
        Self::new(AttackKind::Unarmed, config.unarmed_to_hit, config.unarmed_damage)
    }

    pub fn calculate_attack(&self) -> i32 {
        self.to_hit
    }

    pub fn calculate_damage(&self) -> i32 {
        self.damage
    }
}

/// What an attack is made with
#[derive(Debug, Clone)]
pub enum Weapon {
    /// An item from the attacker's inventory
    Item(Item),
    /// A natural or granted attack with self-contained values
    Natural(NaturalAttack),
}

impl Weapon {
    pub fn name(&self) -> String {
        match self {
            Weapon::Item(item) => item.name.clone(),
            Weapon::Natural(attack) => attack.kind.to_string(),
        }
    }

    /// Explicit damage type, if the weapon declares one
    pub fn declared_damage_type(&self) -> Option<DamageType> {
        match self {
            Weapon::Item(item) => item.damage_type,
            Weapon::Natural(attack) => Some(attack.kind.damage_type()),
        }
    }

    pub fn primary_damage_type(&self) -> DamageType {
        self.declared_damage_type().unwrap_or(DamageType::Physical)
    }

    pub fn is_natural(&self) -> bool {
        matches!(self, Weapon::Natural(_))
    }

    pub fn can_damage_ethereal(&self) -> bool {
        match self {
            Weapon::Item(item) => {
                item.can_damage_ethereal || item.damage_type.is_some_and(|t| t.affects_ethereal())
            }
            Weapon::Natural(attack) => attack.kind.damage_type().affects_ethereal(),
        }
    }
}

/// Primary swings granted by a bonus; the offhand joins on odd swings or when forced
fn weapon_attacks_from_bonus(
    inventory: Option<&dyn Inventory>,
    count: usize,
    add_offhand: bool,
) -> Vec<AttackEntry> {
    let mut attacks = Vec::new();
    let Some(inventory) = inventory else {
        return attacks;
    };

    let has_offhand = inventory.equipped(EquipmentSlot::WieldedOffhand).is_some();
    for i in 0..count {
        attacks.push(AttackEntry::weapon(AttackKind::WieldedPrimary));
        if has_offhand && (i % 2 == 1 || add_offhand) {
            attacks.push(AttackEntry::weapon(AttackKind::WieldedOffhand));
        }
    }
    attacks
}

/// Build the attack list for one combat round
pub fn assemble(actor: &Combatant, config: &CombatConfig) -> Vec<AttackEntry> {
    let ctx = actor.context();
    let inventory = ctx.inventory();
    let mut attacks = actor.base_attacks().to_vec();

    if let Some(inventory) = inventory {
        let primary = inventory.equipped(EquipmentSlot::WieldedPrimary);
        if primary.is_some() {
            attacks.push(AttackEntry::weapon(AttackKind::WieldedPrimary));
        }

        // Defense-only shields don't swing
        if let Some(offhand) = inventory.equipped(EquipmentSlot::WieldedOffhand) {
            let is_primary = primary.is_some_and(|p| p.id == offhand.id);
            if offhand.get("weapon class") != 0 && !is_primary {
                attacks.push(AttackEntry::weapon(AttackKind::WieldedOffhand));
            }
        }
    }

    if attacks.is_empty() {
        attacks.push(AttackEntry::new(
            AttackKind::Unarmed,
            config.unarmed_to_hit,
            config.unarmed_damage,
        ));
    }

    let mut weapon_grants = 0usize;
    for (source, provider) in ctx.sources() {
        if !source.grants_attacks() {
            continue;
        }
        for extra in provider.extra_attacks() {
            if extra.is_weapon_attack() {
                attacks.extend(weapon_attacks_from_bonus(inventory, 1, weapon_grants % 2 == 1));
                weapon_grants += 1;
            } else if extra.is_valid() {
                attacks.push(extra);
            }
        }
    }

    if let Some(inventory) = inventory {
        let has_primary = inventory.equipped(EquipmentSlot::WieldedPrimary).is_some();
        for modifier in inventory.registered_modifiers() {
            for kind in AttackKind::natural() {
                let bonus = modifier.get(&kind.bonus_key());
                if bonus != 0 {
                    attacks.push(AttackEntry::new(
                        *kind,
                        config.bonus_attack_to_hit + bonus,
                        bonus,
                    ));
                }
            }

            let extra_swings = modifier.get("bonus weapon attack");
            if extra_swings > 0 && has_primary {
                attacks.extend(weapon_attacks_from_bonus(
                    Some(inventory),
                    extra_swings as usize,
                    false,
                ));
            }
        }
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{CombatContext, Combatant};
    use crate::aggregate::InfluenceSource;
    use crate::capabilities::{Equipment, ModifierObject, StaticBonuses};

    fn sword() -> Item {
        Item::weapon("sword-1", "long sword", "long sword", 10)
    }

    fn kinds(attacks: &[AttackEntry]) -> Vec<AttackKind> {
        attacks.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_attack_kind_parsing() {
        assert_eq!("claw".parse::<AttackKind>(), Ok(AttackKind::Claw));
        assert_eq!(
            "wielded primary".parse::<AttackKind>(),
            Ok(AttackKind::WieldedPrimary)
        );
        assert!("kick".parse::<AttackKind>().is_err());
        assert_eq!(AttackKind::Fire.bonus_key(), "bonus fire attack");
    }

    #[test]
    fn test_unarmed_when_nothing_else() {
        let actor = Combatant::new("bob", "Bob", CombatContext::default());
        let attacks = assemble(&actor, &CombatConfig::default());
        assert_eq!(attacks, vec![AttackEntry::new(AttackKind::Unarmed, 50, 10)]);
    }

    #[test]
    fn test_innate_attacks_replace_unarmed() {
        let mut actor = Combatant::new("wolf", "wolf", CombatContext::default());
        assert!(actor.add_attack(AttackKind::Bite, 20, 35).is_ok());
        assert!(actor.add_attack(AttackKind::Claw, 0, 10).is_err());

        let attacks = assemble(&actor, &CombatConfig::default());
        assert_eq!(kinds(&attacks), vec![AttackKind::Bite]);
    }

    #[test]
    fn test_wielded_weapons() {
        let mut equipment = Equipment::new();
        equipment.equip(EquipmentSlot::WieldedPrimary, sword());
        equipment.equip(
            EquipmentSlot::WieldedOffhand,
            Item::weapon("dagger-1", "dagger", "dagger", 5),
        );
        let actor = Combatant::new(
            "bob",
            "Bob",
            CombatContext::builder().inventory(equipment).build(),
        );

        let attacks = assemble(&actor, &CombatConfig::default());
        assert_eq!(
            kinds(&attacks),
            vec![AttackKind::WieldedPrimary, AttackKind::WieldedOffhand]
        );
    }

    #[test]
    fn test_shield_does_not_swing() {
        let mut equipment = Equipment::new();
        equipment.equip(EquipmentSlot::WieldedPrimary, sword());
        equipment.equip(
            EquipmentSlot::WieldedOffhand,
            Item::shield("shield-1", "shield", 1),
        );
        let actor = Combatant::new(
            "bob",
            "Bob",
            CombatContext::builder().inventory(equipment).build(),
        );

        let attacks = assemble(&actor, &CombatConfig::default());
        assert_eq!(kinds(&attacks), vec![AttackKind::WieldedPrimary]);
    }

    #[test]
    fn test_source_extra_attacks() {
        let mut equipment = Equipment::new();
        equipment.equip(EquipmentSlot::WieldedPrimary, sword());
        equipment.equip(
            EquipmentSlot::WieldedOffhand,
            Item::weapon("dagger-1", "dagger", "dagger", 5),
        );
        let guild = StaticBonuses::new()
            .with_extra_attack(AttackEntry::weapon(AttackKind::WieldedPrimary))
            .with_extra_attack(AttackEntry::weapon(AttackKind::WieldedPrimary))
            .with_extra_attack(AttackEntry::new(AttackKind::Fire, 10, 15));
        let biological =
            StaticBonuses::new().with_extra_attack(AttackEntry::new(AttackKind::Bite, 5, 5));

        let actor = Combatant::new(
            "bob",
            "Bob",
            CombatContext::builder()
                .inventory(equipment)
                .source(InfluenceSource::Guild, guild)
                .source(InfluenceSource::Biological, biological)
                .build(),
        );

        let attacks = assemble(&actor, &CombatConfig::default());
        assert_eq!(
            kinds(&attacks),
            vec![
                AttackKind::WieldedPrimary,
                AttackKind::WieldedOffhand,
                // first weapon grant: primary only
                AttackKind::WieldedPrimary,
                // second weapon grant: primary and offhand
                AttackKind::WieldedPrimary,
                AttackKind::WieldedOffhand,
                AttackKind::Fire,
            ]
        );
    }

    #[test]
    fn test_modifier_object_attacks() {
        let mut equipment = Equipment::new();
        equipment.equip(EquipmentSlot::WieldedPrimary, sword());
        equipment.register_modifier(
            ModifierObject::combat("ring-of-fire")
                .with_property("bonus fire attack", 15)
                .with_property("bonus weapon attack", 2),
        );
        let actor = Combatant::new(
            "bob",
            "Bob",
            CombatContext::builder().inventory(equipment).build(),
        );

        let attacks = assemble(&actor, &CombatConfig::default());
        assert_eq!(attacks.len(), 4);
        assert_eq!(attacks[0].kind, AttackKind::WieldedPrimary);
        assert_eq!(attacks[1], AttackEntry::new(AttackKind::Fire, 65, 15));
        assert_eq!(attacks[2].kind, AttackKind::WieldedPrimary);
        assert_eq!(attacks[3].kind, AttackKind::WieldedPrimary);
    }

    #[test]
    fn test_weapon_ethereal_reach() {
        let mut blade = sword();
        assert!(!Weapon::Item(blade.clone()).can_damage_ethereal());
        blade.damage_type = Some(DamageType::Fire);
        assert!(Weapon::Item(blade).can_damage_ethereal());
        assert!(Weapon::Natural(NaturalAttack::new(AttackKind::Energy, 0, 5)).can_damage_ethereal());
        assert!(!Weapon::Natural(NaturalAttack::new(AttackKind::Claw, 0, 5)).can_damage_ethereal());
    }
}
