//! Stat aggregation across influence sources
//!
//! This is the one place that enumerates which systems may influence
//! combat: the ordered influence sources attached to an actor, plus the
//! environment of the location the actor stands in.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::actors::Combatant;
use crate::capabilities::Environment;

/// Named systems that can contribute bonuses, in query order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfluenceSource {
    Race,
    Guild,
    Research,
    Trait,
    Biological,
    Background,
}

impl InfluenceSource {
    pub fn all() -> &'static [InfluenceSource] {
        &[
            InfluenceSource::Race,
            InfluenceSource::Guild,
            InfluenceSource::Research,
            InfluenceSource::Trait,
            InfluenceSource::Biological,
            InfluenceSource::Background,
        ]
    }

    /// Biological effects modify stats but never add attacks
    pub fn grants_attacks(&self) -> bool {
        !matches!(self, InfluenceSource::Biological)
    }
}

impl FromStr for InfluenceSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "race" => Ok(InfluenceSource::Race),
            "guild" | "guilds" => Ok(InfluenceSource::Guild),
            "research" => Ok(InfluenceSource::Research),
            "trait" | "traits" => Ok(InfluenceSource::Trait),
            "biological" => Ok(InfluenceSource::Biological),
            "background" => Ok(InfluenceSource::Background),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for InfluenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InfluenceSource::Race => "race",
            InfluenceSource::Guild => "guild",
            InfluenceSource::Research => "research",
            InfluenceSource::Trait => "trait",
            InfluenceSource::Biological => "biological",
            InfluenceSource::Background => "background",
        };
        write!(f, "{}", s)
    }
}

/// Sum a named bonus over every influence source and the environment
pub fn aggregate(bonus: &str, actor: &Combatant, environment: Option<&dyn Environment>) -> i32 {
    let sources: i32 = actor
        .context()
        .sources()
        .map(|(_, provider)| provider.bonus_to(bonus))
        .sum();

    let environmental = environment
        .map(|env| env.environmental_bonus_to(bonus, actor))
        .unwrap_or(0);

    sources + environmental
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::CombatContext;
    use crate::capabilities::StaticBonuses;

    struct Shrine;

    impl Environment for Shrine {
        fn environmental_bonus_to(&self, bonus: &str, actor: &Combatant) -> i32 {
            if bonus == "DefenseBonus" && actor.name() == "Priest" {
                7
            } else {
                0
            }
        }
    }

    fn priest() -> Combatant {
        Combatant::new(
            "priest",
            "Priest",
            CombatContext::builder()
                .source(InfluenceSource::Race, StaticBonuses::new().with_bonus("DefenseBonus", 2))
                .source(InfluenceSource::Guild, StaticBonuses::new().with_bonus("DefenseBonus", 3))
                .source(
                    InfluenceSource::Background,
                    StaticBonuses::new().with_bonus("AttackBonus", 4),
                )
                .build(),
        )
    }

    #[test]
    fn test_sources_sum() {
        let actor = priest();
        assert_eq!(aggregate("DefenseBonus", &actor, None), 5);
        assert_eq!(aggregate("AttackBonus", &actor, None), 4);
        assert_eq!(aggregate("DamageBonus", &actor, None), 0);
    }

    #[test]
    fn test_missing_sources_contribute_nothing() {
        let actor = Combatant::new("rat", "rat", CombatContext::default());
        assert_eq!(aggregate("DefenseBonus", &actor, None), 0);
    }

    #[test]
    fn test_environment_filters_by_actor() {
        let priest = priest();
        let rat = Combatant::new("rat", "rat", CombatContext::default());
        assert_eq!(aggregate("DefenseBonus", &priest, Some(&Shrine)), 12);
        assert_eq!(aggregate("DefenseBonus", &rat, Some(&Shrine)), 0);
    }

    #[test]
    fn test_source_order() {
        let mut sorted = InfluenceSource::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, InfluenceSource::all());
        assert!(!InfluenceSource::Biological.grants_attacks());
        assert_eq!("traits".parse::<InfluenceSource>(), Ok(InfluenceSource::Trait));
    }
}
