//! Reference inventory: equipment slots and modifier objects
//!
//! Items carry a flat property map ("weapon class", "armor class",
//! "bonus hit points", ...). Bonuses are summed across every distinct
//! equipped item and every registered combat modifier object.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::Inventory;
use crate::combat::{DamageType, Weapon};

/// Where an item is worn or wielded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    WieldedPrimary,
    WieldedOffhand,
    Armor,
    Helmet,
    Gloves,
    Boots,
    Cloak,
    Amulet,
    Ring,
    Belt,
}

/// Groups of modifier values an inventory can be asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierCategory {
    /// Status modifiers and combat bonuses from equipment and attachments
    CombatModifiers,
    /// Bonuses granted by guild membership objects
    GuildModifiers,
}

/// A wearable or wieldable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Skill used to wield this item
    pub weapon_type: Option<String>,
    /// Skill used to wear this item
    pub armor_type: Option<String>,
    pub damage_type: Option<DamageType>,
    #[serde(default)]
    pub extra_damage_types: Vec<DamageType>,
    #[serde(default)]
    pub can_damage_ethereal: bool,
    #[serde(default)]
    pub properties: HashMap<String, i32>,
}

impl Item {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            weapon_type: None,
            armor_type: None,
            damage_type: None,
            extra_damage_types: Vec::new(),
            can_damage_ethereal: false,
            properties: HashMap::new(),
        }
    }

    pub fn weapon(id: &str, name: &str, weapon_type: &str, weapon_class: i32) -> Self {
        let mut item = Self::new(id, name);
        item.weapon_type = Some(weapon_type.to_string());
        item.damage_type = Some(DamageType::Physical);
        item.with_property("weapon class", weapon_class)
    }

    /// A shield defends with the shield skill and never swings
    pub fn shield(id: &str, name: &str, defense_class: i32) -> Self {
        let mut item = Self::new(id, name);
        item.weapon_type = Some("shield".to_string());
        item.with_property("defense class", defense_class)
    }

    pub fn armor(id: &str, name: &str, armor_type: &str, armor_class: i32) -> Self {
        let mut item = Self::new(id, name);
        item.armor_type = Some(armor_type.to_string());
        item.with_property("armor class", armor_class)
    }

    pub fn with_property(mut self, key: &str, value: i32) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = Some(damage_type);
        self
    }

    pub fn with_extra_damage_type(mut self, damage_type: DamageType) -> Self {
        self.extra_damage_types.push(damage_type);
        self
    }

    /// Property value, 0 when unset
    pub fn get(&self, key: &str) -> i32 {
        self.properties.get(key).copied().unwrap_or(0)
    }

    pub fn is_shield(&self) -> bool {
        self.weapon_type.as_deref() == Some("shield")
    }
}

/// A non-item object attached to an actor that grants modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierObject {
    pub name: String,
    pub category: ModifierCategory,
    #[serde(default)]
    pub properties: HashMap<String, i32>,
}

impl ModifierObject {
    pub fn new(name: &str, category: ModifierCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
            properties: HashMap::new(),
        }
    }

    pub fn combat(name: &str) -> Self {
        Self::new(name, ModifierCategory::CombatModifiers)
    }

    pub fn guild(name: &str) -> Self {
        Self::new(name, ModifierCategory::GuildModifiers)
    }

    pub fn with_property(mut self, key: &str, value: i32) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> i32 {
        self.properties.get(key).copied().unwrap_or(0)
    }
}

/// In-memory equipment
#[derive(Debug, Clone, Default)]
pub struct Equipment {
    slots: HashMap<EquipmentSlot, Item>,
    modifiers: Vec<ModifierObject>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an item in a slot, returning whatever was there before
    pub fn equip(&mut self, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.slots.insert(slot, item)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Item> {
        self.slots.remove(&slot)
    }

    pub fn register_modifier(&mut self, modifier: ModifierObject) {
        self.modifiers.push(modifier);
    }

    pub fn unregister_modifier(&mut self, name: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.name != name);
        self.modifiers.len() != before
    }

    /// Each distinct equipped item once, even when it fills two slots
    fn distinct_items(&self) -> impl Iterator<Item = &Item> {
        let mut seen = HashSet::new();
        self.slots
            .values()
            .filter(move |item| seen.insert(item.id.clone()))
    }

    fn modifier_sum(&self, category: ModifierCategory, key: &str) -> i32 {
        self.modifiers
            .iter()
            .filter(|m| m.category == category)
            .map(|m| m.get(key))
            .sum()
    }

    /// Sum of a property across equipment and combat modifier objects
    fn sum(&self, key: &str) -> i32 {
        let items: i32 = self.distinct_items().map(|item| item.get(key)).sum();
        items + self.modifier_sum(ModifierCategory::CombatModifiers, key)
    }
}

impl Inventory for Equipment {
    fn encumbrance(&self) -> i32 {
        self.sum("encumbrance")
    }

    fn attack_bonus(&self, weapon: &Item) -> i32 {
        weapon.get("weapon class") + self.sum("bonus attack")
    }

    fn defense_bonus(&self, damage_type: DamageType) -> i32 {
        self.sum("armor class")
            + self.sum("bonus soak")
            + self.sum(&format!("bonus {} soak", damage_type))
    }

    fn damage_bonus(&self, weapon: &Weapon, damage_type: DamageType) -> i32 {
        let base = match weapon {
            Weapon::Item(item) => item.get("weapon class"),
            Weapon::Natural(_) => 0,
        };
        base + self.sum("bonus damage") + self.sum(&format!("bonus {} damage", damage_type))
    }

    fn defend_attack_bonus(&self) -> i32 {
        self.sum("defense class")
    }

    fn modifier(&self, category: ModifierCategory, name: &str) -> i32 {
        match category {
            ModifierCategory::CombatModifiers => self.sum(name),
            ModifierCategory::GuildModifiers => self.modifier_sum(category, name),
        }
    }

    fn equipped(&self, slot: EquipmentSlot) -> Option<&Item> {
        self.slots.get(&slot)
    }

    fn is_equipped(&self, item: &Item) -> bool {
        self.slots.values().any(|equipped| equipped.id == item.id)
    }

    fn extra_damage_types(&self, weapon: &Item) -> Vec<DamageType> {
        weapon.extra_damage_types.clone()
    }

    fn registered_modifiers(&self) -> &[ModifierObject] {
        &self.modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{AttackKind, NaturalAttack};

    #[test]
    fn test_bonus_summed_across_items_and_modifiers() {
        let mut equipment = Equipment::new();
        equipment.equip(
            EquipmentSlot::WieldedPrimary,
            Item::weapon("sword", "sword", "long sword", 10).with_property("bonus hit points", 2),
        );
        equipment.equip(
            EquipmentSlot::Armor,
            Item::armor("mail", "chainmail", "medium armor", 4).with_property("bonus hit points", 4),
        );
        equipment.register_modifier(ModifierObject::combat("blessing").with_property("bonus hit points", 6));
        equipment.register_modifier(ModifierObject::guild("oath").with_property("bonus hit points", 100));

        assert_eq!(
            equipment.modifier(ModifierCategory::CombatModifiers, "bonus hit points"),
            12
        );
        assert_eq!(
            equipment.modifier(ModifierCategory::GuildModifiers, "bonus hit points"),
            100
        );
    }

    #[test]
    fn test_two_handed_item_counted_once() {
        let mut equipment = Equipment::new();
        let greatsword = Item::weapon("gs", "greatsword", "two-handed sword", 15)
            .with_property("encumbrance", 5);
        equipment.equip(EquipmentSlot::WieldedPrimary, greatsword.clone());
        equipment.equip(EquipmentSlot::WieldedOffhand, greatsword);

        assert_eq!(equipment.encumbrance(), 5);
    }

    #[test]
    fn test_equip_and_unequip() {
        let mut equipment = Equipment::new();
        let sword = Item::weapon("sword", "sword", "long sword", 10);
        assert!(!equipment.is_equipped(&sword));

        assert!(equipment.equip(EquipmentSlot::WieldedPrimary, sword.clone()).is_none());
        assert!(equipment.is_equipped(&sword));
        assert_eq!(
            equipment.equipped(EquipmentSlot::WieldedPrimary).map(|i| i.name.as_str()),
            Some("sword")
        );

        assert!(equipment.unequip(EquipmentSlot::WieldedPrimary).is_some());
        assert!(!equipment.is_equipped(&sword));
    }

    #[test]
    fn test_damage_bonus_by_weapon_kind() {
        let mut equipment = Equipment::new();
        equipment.register_modifier(
            ModifierObject::combat("rage")
                .with_property("bonus damage", 2)
                .with_property("bonus fire damage", 3),
        );
        let sword = Item::weapon("sword", "sword", "long sword", 10);

        assert_eq!(
            equipment.damage_bonus(&Weapon::Item(sword), DamageType::Physical),
            12
        );
        assert_eq!(
            equipment.damage_bonus(
                &Weapon::Natural(NaturalAttack::new(AttackKind::Fire, 0, 5)),
                DamageType::Fire
            ),
            5
        );
    }

    #[test]
    fn test_unregister_modifier() {
        let mut equipment = Equipment::new();
        equipment.register_modifier(ModifierObject::combat("haste potion").with_property("haste", 1));
        assert_eq!(equipment.modifier(ModifierCategory::CombatModifiers, "haste"), 1);

        assert!(equipment.unregister_modifier("haste potion"));
        assert!(!equipment.unregister_modifier("haste potion"));
        assert_eq!(equipment.modifier(ModifierCategory::CombatModifiers, "haste"), 0);
    }
}
