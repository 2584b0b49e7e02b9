//! mudcombat - run an arena scenario through the combat core

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mudcombat::{arena, Settings, World};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "mudcombat", about = "Run a MUD combat arena")]
struct Args {
    /// TOML file with [combat] tuning and an [arena] scenario
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Heartbeats to run
    #[arg(short, long, default_value_t = 30)]
    ticks: u64,

    /// Seed for reproducible fights; overrides the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace heartbeats at the configured wall-clock interval
    #[arg(long)]
    realtime: bool,

    /// Directory for durable actor snapshots
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mudcombat=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Nobody left with a fight to pick
fn is_settled(world: &World) -> bool {
    world
        .actor_ids()
        .iter()
        .filter_map(|id| world.actor(id))
        .all(|actor| actor.is_dead() || actor.hostiles().is_empty())
}

fn report(world: &World) {
    for id in world.actor_ids() {
        let Some(actor) = world.actor(&id) else {
            continue;
        };
        info!(
            actor = %id,
            hit_points = world.hit_points(&id).unwrap_or(0),
            max_hit_points = world.max_hit_points(&id).unwrap_or(0),
            dead = actor.is_dead(),
            kills = actor.statistics().total_kills(),
            "Final state"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    if args.seed.is_some() {
        settings.combat.seed = args.seed;
    }

    let mut world =
        arena::build_world(&settings, args.snapshots.as_deref()).context("building arena")?;
    info!(ticks = args.ticks, realtime = args.realtime, "Starting combat");

    let mut interval = tokio::time::interval(settings.combat.heartbeat_interval());
    for now in 1..=args.ticks {
        if args.realtime {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        world.tick(now);
        if is_settled(&world) {
            info!(tick = now, "Combat settled");
            break;
        }
    }

    report(&world);
    Ok(())
}
