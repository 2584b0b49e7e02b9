//! Arena scenarios built from configuration
//!
//! An arena turns [`Settings`] into a populated [`World`]: one zone per
//! configured location and one combatant per configured actor, each wired
//! with the reference capabilities.

use std::path::Path;
use tracing::{info, warn};

use crate::actors::{CombatContext, Combatant};
use crate::aggregate::InfluenceSource;
use crate::capabilities::{
    Equipment, EquipmentSlot, FactionMembership, JsonSnapshotStore, MonsterLevel, SkillSet,
    StaticBonuses,
};
use crate::combat::TracingEvents;
use crate::config::{ActorConfig, Settings};
use crate::error::CombatError;
use crate::world::{FleeRoute, Location, World, Zone};

/// Build a world from settings
///
/// When `snapshots` is given, durable actors persist there on death and
/// resume from an existing snapshot on startup.
pub fn build_world(settings: &Settings, snapshots: Option<&Path>) -> Result<World, CombatError> {
    let mut world = World::new(settings.combat.clone());

    for config in &settings.arena.locations {
        let name = config.name.as_deref().unwrap_or(&config.id);
        world.add_location(Location::new(&config.id, name).with_environment(Zone::from(config)));
    }

    for config in &settings.arena.actors {
        let combatant = combatant_from_config(config, snapshots)?;
        world.spawn(combatant, &config.location)?;

        if let (true, Some(dir)) = (config.durable, snapshots) {
            let store = JsonSnapshotStore::new(dir);
            if store.path_for(&config.id).exists() {
                let snapshot = store
                    .load(&config.id)
                    .map_err(|e| CombatError::Persistence(format!("{:#}", e)))?;
                if let Some(actor) = world.actor_mut(&config.id) {
                    actor.restore(&snapshot);
                    info!(actor = %config.id, "Restored from snapshot");
                }
                world.set_wimpy(&config.id, snapshot.wimpy)?;
            }
        }
    }

    for config in &settings.arena.actors {
        for target in &config.attacks_on_start {
            let engaged =
                world.register_attacker(target, &config.id) && world.register_attacker(&config.id, target);
            if engaged {
                world.activate(&config.id);
                world.activate(target);
            } else {
                warn!(attacker = %config.id, target = %target, "Opening attack not allowed");
            }
        }
    }

    info!(
        locations = settings.arena.locations.len(),
        actors = settings.arena.actors.len(),
        "Arena ready"
    );
    Ok(world)
}

/// Build a combatant with reference capabilities from its configuration
pub fn combatant_from_config(
    config: &ActorConfig,
    snapshots: Option<&Path>,
) -> Result<Combatant, CombatError> {
    let mut equipment = Equipment::new();
    let slots = [
        (EquipmentSlot::WieldedPrimary, &config.weapon),
        (EquipmentSlot::WieldedOffhand, &config.offhand),
        (EquipmentSlot::Armor, &config.armor),
    ];
    for (slot, item) in slots {
        if let Some(item) = item {
            equipment.equip(slot, item.clone());
        }
    }

    let skills = config
        .skills
        .iter()
        .fold(SkillSet::new(), |set, (skill, value)| set.with_skill(skill, *value));

    let mut factions = FactionMembership::new();
    for faction in &config.factions {
        factions = factions.member_of(faction);
    }
    for faction in &config.hostile_to {
        factions = factions.hostile_to(faction);
    }

    let mut builder = CombatContext::builder()
        .inventory(equipment)
        .skills(skills)
        .factions(factions)
        .progression(MonsterLevel::new(config.level))
        .movement(FleeRoute::from(config.flee_to.clone()))
        .events(TracingEvents);

    if let Some(attributes) = config.attributes {
        builder = builder.attributes(attributes);
    }
    for (source, bonuses) in &config.bonuses {
        let source: InfluenceSource = source
            .parse()
            .map_err(|_| CombatError::UnknownSource(source.clone()))?;
        let provider = bonuses
            .iter()
            .fold(StaticBonuses::new(), |p, (bonus, value)| p.with_bonus(bonus, *value));
        builder = builder.source(source, provider);
    }
    if let (true, Some(dir)) = (config.durable, snapshots) {
        builder = builder.persistence(JsonSnapshotStore::new(dir));
    }

    let name = if config.name.is_empty() {
        &config.id
    } else {
        &config.name
    };
    let mut combatant = Combatant::new(&config.id, name, builder.build()).with_wimpy(config.wimpy);
    if let Some(template) = &config.template {
        combatant = combatant.with_template(template);
    }
    if let Some(race) = &config.race {
        combatant = combatant.with_race(race);
    }
    if config.durable {
        combatant = combatant.durable();
    }
    if config.immortal {
        combatant = combatant.immortal();
    }
    if config.ethereal {
        combatant = combatant.ethereal();
    }
    for attack in &config.attacks {
        combatant.add_attack(attack.kind, attack.to_hit, attack.damage)?;
    }

    Ok(combatant)
}
