//! Corpses left behind by deaths

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actors::Combatant;
use crate::ActorId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpse {
    pub id: Uuid,
    pub victim_id: ActorId,
    pub victim_name: String,
    /// Set only when a durable actor was killed by another durable actor
    pub killed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Builds the corpse for a victim
pub trait CorpseFactory {
    fn create(&self, victim: &Combatant, killed_by: Option<&str>) -> Corpse;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCorpseFactory;

impl CorpseFactory for StandardCorpseFactory {
    fn create(&self, victim: &Combatant, killed_by: Option<&str>) -> Corpse {
        Corpse {
            id: Uuid::new_v4(),
            victim_id: victim.id().to_string(),
            victim_name: victim.name().to_string(),
            killed_by: killed_by.map(str::to_string),
            created_at: Utc::now(),
        }
    }
}

impl Corpse {
    pub fn description(&self) -> String {
        match &self.killed_by {
            Some(killer) => format!("the corpse of {}, slain by {}", self.victim_name, killer),
            None => format!("the corpse of {}", self.victim_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::CombatContext;

    #[test]
    fn test_standard_corpse() {
        let victim = Combatant::new("orc-1", "orc", CombatContext::default());
        let corpse = StandardCorpseFactory.create(&victim, None);
        assert_eq!(corpse.victim_id, "orc-1");
        assert_eq!(corpse.description(), "the corpse of orc");

        let tagged = StandardCorpseFactory.create(&victim, Some("Hero"));
        assert_eq!(tagged.description(), "the corpse of orc, slain by Hero");
        assert_ne!(corpse.id, tagged.id);
    }
}
