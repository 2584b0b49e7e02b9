//! Damage types and percentage resistance
//!
//! Handles:
//! - The damage types an attack can carry
//! - Which types can reach ethereal beings
//! - Percentage resistance layered on top of flat soak

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Types of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    /// Generic physical damage
    Physical,
    /// Bludgeoning damage (maces, hammers, fists)
    Bludgeon,
    /// Slashing damage (swords, claws)
    Slash,
    /// Thrusting damage (spears, daggers, teeth)
    Thrust,
    Fire,
    Cold,
    Acid,
    Electricity,
    Energy,
    Sonic,
    Air,
    Earth,
    Water,
    Poison,
    Disease,
    Paralysis,
    Psionic,
    Magical,
    Good,
    Evil,
    Neutral,
    Chaos,
    Undead,
}

impl DamageType {
    /// Get all damage types
    pub fn all() -> &'static [DamageType] {
        &[
            DamageType::Physical,
            DamageType::Bludgeon,
            DamageType::Slash,
            DamageType::Thrust,
            DamageType::Fire,
            DamageType::Cold,
            DamageType::Acid,
            DamageType::Electricity,
            DamageType::Energy,
            DamageType::Sonic,
            DamageType::Air,
            DamageType::Earth,
            DamageType::Water,
            DamageType::Poison,
            DamageType::Disease,
            DamageType::Paralysis,
            DamageType::Psionic,
            DamageType::Magical,
            DamageType::Good,
            DamageType::Evil,
            DamageType::Neutral,
            DamageType::Chaos,
            DamageType::Undead,
        ]
    }

    /// Whether this damage can harm an ethereal being
    pub fn affects_ethereal(&self) -> bool {
        matches!(
            self,
            DamageType::Electricity
                | DamageType::Energy
                | DamageType::Evil
                | DamageType::Good
                | DamageType::Fire
                | DamageType::Magical
        )
    }

    /// Name of the aggregated bonus granting resistance to this type
    pub fn resistance_bonus(&self) -> String {
        format!("resist {}", self)
    }
}

impl FromStr for DamageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physical" => Ok(DamageType::Physical),
            "bludgeon" | "bludgeoning" => Ok(DamageType::Bludgeon),
            "slash" | "slashing" => Ok(DamageType::Slash),
            "thrust" | "piercing" => Ok(DamageType::Thrust),
            "fire" => Ok(DamageType::Fire),
            "cold" | "ice" => Ok(DamageType::Cold),
            "acid" => Ok(DamageType::Acid),
            "electricity" | "lightning" => Ok(DamageType::Electricity),
            "energy" => Ok(DamageType::Energy),
            "sonic" | "thunder" => Ok(DamageType::Sonic),
            "air" => Ok(DamageType::Air),
            "earth" => Ok(DamageType::Earth),
            "water" => Ok(DamageType::Water),
            "poison" => Ok(DamageType::Poison),
            "disease" => Ok(DamageType::Disease),
            "paralysis" => Ok(DamageType::Paralysis),
            "psionic" | "mental" => Ok(DamageType::Psionic),
            "magical" | "magic" => Ok(DamageType::Magical),
            "good" | "holy" => Ok(DamageType::Good),
            "evil" => Ok(DamageType::Evil),
            "neutral" => Ok(DamageType::Neutral),
            "chaos" => Ok(DamageType::Chaos),
            "undead" => Ok(DamageType::Undead),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DamageType::Physical => "physical",
            DamageType::Bludgeon => "bludgeon",
            DamageType::Slash => "slash",
            DamageType::Thrust => "thrust",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Acid => "acid",
            DamageType::Electricity => "electricity",
            DamageType::Energy => "energy",
            DamageType::Sonic => "sonic",
            DamageType::Air => "air",
            DamageType::Earth => "earth",
            DamageType::Water => "water",
            DamageType::Poison => "poison",
            DamageType::Disease => "disease",
            DamageType::Paralysis => "paralysis",
            DamageType::Psionic => "psionic",
            DamageType::Magical => "magical",
            DamageType::Good => "good",
            DamageType::Evil => "evil",
            DamageType::Neutral => "neutral",
            DamageType::Chaos => "chaos",
            DamageType::Undead => "undead",
        };
        write!(f, "{}", s)
    }
}

/// Percentage reduction: `floor(damage * percent / 100)`
pub fn resistance_from_percent(damage: i32, percent: i32) -> i32 {
    (damage as f64 * percent as f64 / 100.0).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_type_parsing() {
        assert_eq!("fire".parse::<DamageType>(), Ok(DamageType::Fire));
        assert_eq!("FIRE".parse::<DamageType>(), Ok(DamageType::Fire));
        assert_eq!("slashing".parse::<DamageType>(), Ok(DamageType::Slash));
        assert_eq!("ice".parse::<DamageType>(), Ok(DamageType::Cold));
        assert!("invalid".parse::<DamageType>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for dtype in DamageType::all() {
            assert_eq!(dtype.to_string().parse::<DamageType>(), Ok(*dtype));
        }
    }

    #[test]
    fn test_ethereal_damage_types() {
        assert!(DamageType::Fire.affects_ethereal());
        assert!(DamageType::Magical.affects_ethereal());
        assert!(!DamageType::Physical.affects_ethereal());
        assert!(!DamageType::Slash.affects_ethereal());
    }

    #[test]
    fn test_resistance_bonus_name() {
        assert_eq!(DamageType::Fire.resistance_bonus(), "resist fire");
    }

    #[test]
    fn test_resistance_from_percent() {
        assert_eq!(resistance_from_percent(100, 0), 0);
        assert_eq!(resistance_from_percent(100, 25), 25);
        assert_eq!(resistance_from_percent(15, 10), 1);
        assert_eq!(resistance_from_percent(19, 10), 1);
        assert_eq!(resistance_from_percent(20, 10), 2);
    }

    #[test]
    fn test_resistance_is_monotonic() {
        let mut previous = i32::MIN;
        for percent in 0..=100 {
            let value = resistance_from_percent(37, percent);
            assert!(value >= previous);
            previous = value;
        }
    }
}
