//! Host-facing facade over one world.

use crate::colony::Colony;
use crate::field::Field;
use crate::snapshot::Snapshot;
use crate::world::World;
use anthill_core::{Result, SimulationConfig, TickSummary};
use tracing::error;

/// Owns exactly one [`World`] and advances it one tick per call
pub struct Simulation {
    world: World,
    summary: TickSummary,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Ok(Self::from_world(World::new(config)?))
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(SimulationConfig::default())
    }

    pub fn from_world(world: World) -> Self {
        let summary = TickSummary {
            tick: world.tick(),
            colonies: Vec::new(),
        };
        Self { world, summary }
    }

    /// Advance the world by one tick.
    ///
    /// # Panics
    ///
    /// Panics if the step fails. Every input is checked at construction,
    /// so a failure here is an engine defect; use [`Simulation::try_update`]
    /// to handle it instead.
    pub fn update(&mut self) {
        match self.world.step() {
            Ok(summary) => self.summary = summary,
            Err(e) => {
                error!(tick = self.world.tick(), error = %e, "Simulation step failed");
                panic!("simulation step failed at tick {}: {}", self.world.tick(), e);
            }
        }
    }

    /// Advance the world by one tick and report what happened
    pub fn try_update(&mut self) -> Result<&TickSummary> {
        self.summary = self.world.step()?;
        Ok(&self.summary)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn tick(&self) -> u64 {
        self.world.tick()
    }

    pub fn field(&self) -> &Field {
        self.world.field()
    }

    pub fn colonies(&self) -> &[Colony] {
        self.world.colonies()
    }

    /// Outcome of the most recent tick
    pub fn summary(&self) -> &TickSummary {
        &self.summary
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world)
    }

    pub fn restore(snapshot: Snapshot) -> Result<Self> {
        Ok(Self::from_world(snapshot.into_world()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anthill_core::NestConfig;

    fn config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.field.width = 20;
        config.field.height = 20;
        config.nests = vec![NestConfig::new(10, 10, 4)];
        config
    }

    #[test]
    fn test_update_advances_one_tick() {
        let mut sim = Simulation::new(config()).unwrap();
        assert_eq!(sim.tick(), 0);
        sim.update();
        sim.update();
        assert_eq!(sim.tick(), 2);
        assert_eq!(sim.summary().tick, 2);
        assert_eq!(sim.summary().colonies.len(), 1);
    }

    #[test]
    fn test_try_update_returns_summary() {
        let mut sim = Simulation::new(config()).unwrap();
        let summary = sim.try_update().unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.total_population(), 4);
    }

    #[test]
    fn test_with_defaults() {
        let sim = Simulation::with_defaults().unwrap();
        assert_eq!(sim.colonies().len(), 1);
        assert_eq!(sim.field().width, 128);
    }

    #[test]
    fn test_restore_resumes_tick() {
        let mut sim = Simulation::new(config()).unwrap();
        for _ in 0..3 {
            sim.update();
        }
        let restored = Simulation::restore(sim.snapshot()).unwrap();
        assert_eq!(restored.tick(), 3);
    }
}
