//! JSON snapshot persistence for durable actors

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Persistence;
use crate::actors::CombatantSnapshot;

/// Writes one pretty-printed JSON file per actor into a directory
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File an actor's snapshot is written to
    pub fn path_for(&self, actor_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", actor_id))
    }

    pub fn load(&self, actor_id: &str) -> anyhow::Result<CombatantSnapshot> {
        let path = self.path_for(actor_id);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&json)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        Ok(snapshot)
    }
}

impl Persistence for JsonSnapshotStore {
    fn save(&mut self, snapshot: &CombatantSnapshot) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating snapshot dir {}", self.dir.display()))?;

        let path = self.path_for(&snapshot.id);
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing snapshot {}", path.display()))?;

        debug!(actor = %snapshot.id, path = %path.display(), "Saved combat snapshot");
        Ok(())
    }
}
