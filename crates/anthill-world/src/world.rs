//! The world: one field shared by every colony, driven tick by tick.

use crate::agent::AgentState;
use crate::colony::Colony;
use crate::field::{Field, PheromoneDynamics};
use anthill_core::{Channel, ColonyId, Error, Result, SimulationConfig, TickSummary};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, event, info, instrument, Level};

/// Complete simulation state. Everything that influences a future tick
/// lives here, including the random generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    config: SimulationConfig,
    field: Field,
    colonies: Vec<Colony>,
    rng: ChaCha8Rng,
    tick: u64,
}

impl World {
    /// Build a world with a generated field, seeded from `config.seed`
    #[instrument(skip(config), fields(seed = config.seed))]
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let field = Field::generate(&config, &mut rng)?;
        Self::assemble(config, field, rng)
    }

    /// Build a world around a prepared field, e.g. a hand-made scenario
    pub fn with_field(config: SimulationConfig, field: Field) -> Result<Self> {
        config.validate()?;
        if field.width != config.field.width || field.height != config.field.height {
            return Err(Error::invalid_config(format!(
                "field is {}x{} but configuration expects {}x{}",
                field.width, field.height, config.field.width, config.field.height
            )));
        }
        if field.dynamics() != &PheromoneDynamics::from(&config.pheromone) {
            return Err(Error::invalid_config(format!(
                "field dynamics {:?} do not match the pheromone configuration",
                field.dynamics()
            )));
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::assemble(config, field, rng)
    }

    fn assemble(config: SimulationConfig, field: Field, mut rng: ChaCha8Rng) -> Result<Self> {
        let mut colonies = Vec::with_capacity(config.nests.len());
        for (index, nest) in config.nests.iter().enumerate() {
            let position = nest.position();
            if !field.is_passable(position) {
                return Err(Error::invalid_config(format!(
                    "nest {} at {} is on an obstacle",
                    index, position
                )));
            }
            let mut colony = Colony::new(ColonyId(index as u32), position);
            colony.seed(nest.initial_agents, &config, &mut rng);
            colonies.push(colony);
        }

        info!(
            width = field.width,
            height = field.height,
            colonies = colonies.len(),
            agents = colonies.iter().map(Colony::population).sum::<usize>(),
            "World created"
        );

        Ok(Self {
            config,
            field,
            colonies,
            rng,
            tick: 0,
        })
    }

    /// Advance one tick: the field evolves first, then every colony
    /// steps in order against the updated field.
    pub fn step(&mut self) -> Result<TickSummary> {
        self.field.decay_and_diffuse();

        let mut colonies = Vec::with_capacity(self.colonies.len());
        for colony in &mut self.colonies {
            colonies.push(colony.step(&mut self.field, &self.config, &mut self.rng)?);
        }
        self.tick += 1;

        let summary = TickSummary {
            tick: self.tick,
            colonies,
        };
        debug!(
            tick = self.tick,
            population = summary.total_population(),
            delivered = summary.total_delivered(),
            "Tick complete"
        );

        let interval = self.config.metrics_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.emit_population_metrics();
        }

        Ok(summary)
    }

    /// Periodic per-colony and field metrics
    fn emit_population_metrics(&self) {
        for colony in &self.colonies {
            let stats = colony.stats();
            info!(
                event = "population_metrics",
                tick = self.tick,
                colony = %colony.id,
                population = colony.population(),
                exploring = colony.count_where(|s| matches!(s, AgentState::Exploring { .. })),
                returning = colony.count_where(AgentState::is_returning),
                idle = colony.count_where(|s| matches!(s, AgentState::Idle { .. })),
                stored = colony.stored(),
                food_delivered = stats.food_delivered,
                trips_completed = stats.trips_completed,
                mean_load = stats.mean_load(),
                spawned = stats.spawned,
                died = stats.died,
                "Colony metrics snapshot"
            );

            event!(
                Level::INFO,
                gauge_name = "colony_population",
                gauge_value = colony.population(),
                colony = %colony.id,
                tick = self.tick,
                "Colony population gauge"
            );
        }

        info!(
            event = "field_metrics",
            tick = self.tick,
            to_food_total = self.field.total_pheromone(Channel::ToFood),
            to_home_total = self.field.total_pheromone(Channel::ToHome),
            to_food_peak = self.field.max_pheromone(Channel::ToFood),
            to_home_peak = self.field.max_pheromone(Channel::ToHome),
            food_remaining = self.field.total_food(),
            "Field metrics snapshot"
        );
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Mutable field access for scenario setup between ticks
    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.get(id.0 as usize)
    }

    pub fn colony_mut(&mut self, id: ColonyId) -> Option<&mut Colony> {
        self.colonies.get_mut(id.0 as usize)
    }

    /// Validate state that was not produced by [`World::new`]
    pub fn check_consistency(&self) -> Result<()> {
        self.config.validate()?;
        if self.field.width != self.config.field.width
            || self.field.height != self.config.field.height
        {
            return Err(Error::InvalidState(format!(
                "field is {}x{} but configuration expects {}x{}",
                self.field.width,
                self.field.height,
                self.config.field.width,
                self.config.field.height
            )));
        }
        if self.colonies.len() != self.config.nests.len() {
            return Err(Error::InvalidState(format!(
                "{} colonies for {} configured nests",
                self.colonies.len(),
                self.config.nests.len()
            )));
        }
        if self.field.dynamics() != &PheromoneDynamics::from(&self.config.pheromone) {
            return Err(Error::InvalidState(format!(
                "field dynamics {:?} do not match the pheromone configuration",
                self.field.dynamics()
            )));
        }
        self.field.check_layers()?;
        for (index, colony) in self.colonies.iter().enumerate() {
            if colony.id.0 as usize != index {
                return Err(Error::InvalidState(format!(
                    "{} stored at position {}",
                    colony.id, index
                )));
            }
            colony.check_consistency(&self.field, &self.config)?;
        }
        Ok(())
    }
}
