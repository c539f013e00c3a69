//! Snapshot and restore of complete world state.

use crate::world::World;
use anthill_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Format version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub tick: u64,
    pub world: World,
}

impl Snapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tick: world.tick(),
            world: world.clone(),
        }
    }

    /// Unpack into a world, rejecting foreign versions and broken state
    pub fn into_world(self) -> Result<World> {
        if self.version != SNAPSHOT_VERSION {
            return Err(Error::InvalidState(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if self.tick != self.world.tick() {
            return Err(Error::InvalidState(format!(
                "snapshot header says tick {} but world is at tick {}",
                self.tick,
                self.world.tick()
            )));
        }
        self.world.check_consistency()?;
        Ok(self.world)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize snapshot: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| Error::Serialization(format!("Failed to deserialize snapshot: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write to `path`; a `.json` extension selects JSON, anything else bincode
    #[instrument(skip(self), fields(tick = self.tick))]
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = if is_json(path) {
            self.to_json()?.into_bytes()
        } else {
            self.to_bytes()?
        };
        fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "Snapshot written");
        Ok(())
    }

    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let snapshot = if is_json(path) {
            let text = std::str::from_utf8(&bytes)
                .map_err(|e| Error::Serialization(format!("Snapshot is not UTF-8: {}", e)))?;
            Self::from_json(text)?
        } else {
            Self::from_bytes(&bytes)?
        };
        info!(tick = snapshot.tick, "Snapshot loaded");
        Ok(snapshot)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anthill_core::{NestConfig, SimulationConfig};

    fn world() -> World {
        let mut config = SimulationConfig::default();
        config.seed = 3;
        config.field.width = 16;
        config.field.height = 16;
        config.nests = vec![NestConfig::new(8, 8, 5)];
        World::new(config).unwrap()
    }

    #[test]
    fn test_bytes_restore_preserves_tick() {
        let mut world = world();
        for _ in 0..5 {
            world.step().unwrap();
        }
        let bytes = Snapshot::capture(&world).to_bytes().unwrap();
        let restored = Snapshot::from_bytes(&bytes).unwrap().into_world().unwrap();
        assert_eq!(restored.tick(), 5);
        assert_eq!(restored.colonies()[0].population(), world.colonies()[0].population());
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut snapshot = Snapshot::capture(&world());
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert!(matches!(snapshot.into_world(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(Snapshot::from_bytes(&[1, 2, 3]).is_err());
        assert!(Snapshot::from_json("{").is_err());
    }

    #[test]
    fn test_save_and_load_files() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::capture(&world());

        for name in ["state.bin", "state.json"] {
            let path = dir.path().join(name);
            snapshot.save(&path).unwrap();
            let loaded = Snapshot::load(&path).unwrap();
            assert_eq!(loaded.tick, snapshot.tick);
            assert!(loaded.into_world().is_ok());
        }
    }
}
