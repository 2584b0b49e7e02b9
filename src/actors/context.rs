//! Capabilities attached to one combatant
//!
//! A `CombatContext` is resolved once when an actor is built; formulas
//! consult it instead of probing the actor for optional behavior.

use std::collections::BTreeMap;

use crate::aggregate::InfluenceSource;
use crate::capabilities::{
    Attributes, BonusProvider, CombatAi, CombatHooks, EventSink, Factions, Inventory, Movement,
    Persistence, Progression, Senses, Skills,
};
use crate::combat::CombatEvent;

#[derive(Default)]
pub struct CombatContext {
    inventory: Option<Box<dyn Inventory>>,
    skills: Option<Box<dyn Skills>>,
    attributes: Option<Box<dyn Attributes>>,
    sources: BTreeMap<InfluenceSource, Box<dyn BonusProvider>>,
    factions: Option<Box<dyn Factions>>,
    progression: Option<Box<dyn Progression>>,
    senses: Option<Box<dyn Senses>>,
    persistence: Option<Box<dyn Persistence>>,
    movement: Option<Box<dyn Movement>>,
    ai: Option<Box<dyn CombatAi>>,
    events: Option<Box<dyn EventSink>>,
    hooks: Option<Box<dyn CombatHooks>>,
}

impl std::fmt::Debug for CombatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatContext")
            .field("inventory", &self.inventory.is_some())
            .field("skills", &self.skills.is_some())
            .field("attributes", &self.attributes.is_some())
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("factions", &self.factions.is_some())
            .field("progression", &self.progression.is_some())
            .field("senses", &self.senses.is_some())
            .field("persistence", &self.persistence.is_some())
            .field("movement", &self.movement.is_some())
            .field("ai", &self.ai.is_some())
            .field("events", &self.events.is_some())
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

impl CombatContext {
    pub fn builder() -> CombatContextBuilder {
        CombatContextBuilder::default()
    }

    pub fn inventory(&self) -> Option<&dyn Inventory> {
        self.inventory.as_deref()
    }

    pub fn inventory_mut(&mut self) -> Option<&mut dyn Inventory> {
        self.inventory
            .as_mut()
            .map(|i| i.as_mut() as &mut dyn Inventory)
    }

    pub fn skills(&self) -> Option<&dyn Skills> {
        self.skills.as_deref()
    }

    pub fn attributes(&self) -> Option<&dyn Attributes> {
        self.attributes.as_deref()
    }

    /// Attached influence sources in query order
    pub fn sources(&self) -> impl Iterator<Item = (InfluenceSource, &dyn BonusProvider)> + '_ {
        self.sources
            .iter()
            .map(|(source, provider)| (*source, provider.as_ref()))
    }

    pub fn source(&self, source: InfluenceSource) -> Option<&dyn BonusProvider> {
        self.sources.get(&source).map(|p| p.as_ref())
    }

    pub fn factions(&self) -> Option<&dyn Factions> {
        self.factions.as_deref()
    }

    pub fn factions_mut(&mut self) -> Option<&mut dyn Factions> {
        self.factions
            .as_mut()
            .map(|f| f.as_mut() as &mut dyn Factions)
    }

    pub fn progression(&self) -> Option<&dyn Progression> {
        self.progression.as_deref()
    }

    pub fn progression_mut(&mut self) -> Option<&mut dyn Progression> {
        self.progression
            .as_mut()
            .map(|p| p.as_mut() as &mut dyn Progression)
    }

    pub fn senses(&self) -> Option<&dyn Senses> {
        self.senses.as_deref()
    }

    pub fn persistence_mut(&mut self) -> Option<&mut dyn Persistence> {
        self.persistence
            .as_mut()
            .map(|p| p.as_mut() as &mut dyn Persistence)
    }

    pub fn movement_mut(&mut self) -> Option<&mut dyn Movement> {
        self.movement
            .as_mut()
            .map(|m| m.as_mut() as &mut dyn Movement)
    }

    pub fn ai_mut(&mut self) -> Option<&mut dyn CombatAi> {
        self.ai
            .as_mut()
            .map(|a| a.as_mut() as &mut dyn CombatAi)
    }

    pub fn hooks(&self) -> Option<&dyn CombatHooks> {
        self.hooks.as_deref()
    }

    pub fn hooks_mut(&mut self) -> Option<&mut dyn CombatHooks> {
        self.hooks
            .as_mut()
            .map(|h| h.as_mut() as &mut dyn CombatHooks)
    }

    pub fn set_events(&mut self, events: impl EventSink + 'static) {
        self.events = Some(Box::new(events));
    }

    pub fn set_source(&mut self, source: InfluenceSource, provider: impl BonusProvider + 'static) {
        self.sources.insert(source, Box::new(provider));
    }

    pub fn remove_source(&mut self, source: InfluenceSource) -> bool {
        self.sources.remove(&source).is_some()
    }

    /// Deliver an event to the attached sink, if any
    pub fn notify(&mut self, actor: &str, event: &CombatEvent) {
        if let Some(events) = self.events.as_mut() {
            events.notify(actor, event);
        }
    }
}

/// Builder for [`CombatContext`]
#[derive(Default)]
pub struct CombatContextBuilder {
    context: CombatContext,
}

impl CombatContextBuilder {
    pub fn inventory(mut self, inventory: impl Inventory + 'static) -> Self {
        self.context.inventory = Some(Box::new(inventory));
        self
    }

    pub fn skills(mut self, skills: impl Skills + 'static) -> Self {
        self.context.skills = Some(Box::new(skills));
        self
    }

    pub fn attributes(mut self, attributes: impl Attributes + 'static) -> Self {
        self.context.attributes = Some(Box::new(attributes));
        self
    }

    pub fn source(mut self, source: InfluenceSource, provider: impl BonusProvider + 'static) -> Self {
        self.context.sources.insert(source, Box::new(provider));
        self
    }

    pub fn factions(mut self, factions: impl Factions + 'static) -> Self {
        self.context.factions = Some(Box::new(factions));
        self
    }

    pub fn progression(mut self, progression: impl Progression + 'static) -> Self {
        self.context.progression = Some(Box::new(progression));
        self
    }

    pub fn senses(mut self, senses: impl Senses + 'static) -> Self {
        self.context.senses = Some(Box::new(senses));
        self
    }

    pub fn persistence(mut self, persistence: impl Persistence + 'static) -> Self {
        self.context.persistence = Some(Box::new(persistence));
        self
    }

    pub fn movement(mut self, movement: impl Movement + 'static) -> Self {
        self.context.movement = Some(Box::new(movement));
        self
    }

    pub fn ai(mut self, ai: impl CombatAi + 'static) -> Self {
        self.context.ai = Some(Box::new(ai));
        self
    }

    pub fn events(mut self, events: impl EventSink + 'static) -> Self {
        self.context.events = Some(Box::new(events));
        self
    }

    pub fn hooks(mut self, hooks: impl CombatHooks + 'static) -> Self {
        self.context.hooks = Some(Box::new(hooks));
        self
    }

    pub fn build(self) -> CombatContext {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Equipment, SkillSet, StaticBonuses};
    use crate::combat::EventLog;

    #[test]
    fn test_empty_context() {
        let ctx = CombatContext::default();
        assert!(ctx.inventory().is_none());
        assert!(ctx.skills().is_none());
        assert_eq!(ctx.sources().count(), 0);
    }

    #[test]
    fn test_sources_iterate_in_fixed_order() {
        let ctx = CombatContext::builder()
            .source(InfluenceSource::Background, StaticBonuses::new())
            .source(InfluenceSource::Race, StaticBonuses::new())
            .source(InfluenceSource::Trait, StaticBonuses::new())
            .build();

        let order: Vec<_> = ctx.sources().map(|(s, _)| s).collect();
        assert_eq!(
            order,
            vec![
                InfluenceSource::Race,
                InfluenceSource::Trait,
                InfluenceSource::Background
            ]
        );
    }

    #[test]
    fn test_notify_reaches_sink() {
        let log = EventLog::new();
        let mut ctx = CombatContext::builder()
            .inventory(Equipment::new())
            .skills(SkillSet::new())
            .events(log.clone())
            .build();

        ctx.notify("bob", &CombatEvent::Fumble);
        assert_eq!(log.count("bob", "onFumble"), 1);
        assert!(format!("{:?}", ctx).contains("inventory: true"));
    }
}
