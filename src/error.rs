//! Error types for the combat core

use thiserror::Error;

use crate::combat::DamageType;

/// Errors surfaced by world lookups and setup
#[derive(Debug, Error)]
pub enum CombatError {
    #[error("unknown actor: {0}")]
    UnknownActor(String),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("actor already exists: {0}")]
    DuplicateActor(String),

    #[error("invalid attack type: {0}")]
    InvalidAttack(String),

    #[error("unknown influence source: {0}")]
    UnknownSource(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

/// Why a hit or an attack was not allowed to happen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HitRefusal {
    #[error("actor no longer exists")]
    Missing,

    #[error("actor is not in any location")]
    Nowhere,

    #[error("actor is already dead")]
    Dead,

    #[error("actor is invulnerable")]
    Invulnerable,

    #[error("violence is prohibited here")]
    ViolenceProhibited,

    #[error("opponent is not present")]
    FoeAbsent,

    #[error("opponent is already dead")]
    FoeDead,

    #[error("you're not allowed to attack players not on the kill list")]
    NotOnKillList,

    #[error("ethereal beings cannot be hurt by {0} damage")]
    Ethereal(DamageType),
}
