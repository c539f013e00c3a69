//! Colony ownership of ants, the nest and the food store.

use crate::agent::{Agent, AgentState};
use crate::field::Field;
use anthill_core::{
    AgentId, ColonyId, ColonyStats, ColonyTick, Direction, Position, Result, SimulationConfig,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A nest, the ants it owns and the food they have brought home
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colony {
    pub id: ColonyId,
    pub nest: Position,
    /// Keyed by id so iteration is always in ascending id order
    agents: BTreeMap<AgentId, Agent>,
    stored: f32,
    next_agent_id: u64,
    stats: ColonyStats,
}

impl Colony {
    pub fn new(id: ColonyId, nest: Position) -> Self {
        Self {
            id,
            nest,
            agents: BTreeMap::new(),
            stored: 0.0,
            next_agent_id: 0,
            stats: ColonyStats::new(),
        }
    }

    /// Place `count` fresh ants on the nest without charging the store
    pub fn seed<R: Rng>(&mut self, count: u32, config: &SimulationConfig, rng: &mut R) {
        for _ in 0..count {
            self.spawn_agent(config, rng);
        }
    }

    /// Add one exploring ant at the nest with a random heading
    pub fn spawn_agent<R: Rng>(&mut self, config: &SimulationConfig, rng: &mut R) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        let heading = Direction::from_index(rng.gen_range(0..8));
        let agent = Agent::new(id, self.nest, heading, config.energy.initial_energy);
        self.agents.insert(id, agent);
        id
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn stored(&self) -> f32 {
        self.stored
    }

    pub fn stats(&self) -> &ColonyStats {
        &self.stats
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Ants in ascending id order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    /// Step every ant, credit deliveries, bury the dead and maybe spawn.
    pub fn step<R: Rng>(
        &mut self,
        field: &mut Field,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<ColonyTick> {
        let mut tick = ColonyTick {
            colony: self.id,
            ..Default::default()
        };
        let mut dead = Vec::new();

        for (id, agent) in self.agents.iter_mut() {
            let report = agent.step(field, self.nest, config, rng)?;

            if report.died {
                dead.push(*id);
                continue;
            }
            if report.picked_up > 0.0 {
                tick.pickups += 1;
                debug!(
                    colony = %self.id,
                    agent = %id,
                    amount = report.picked_up,
                    x = agent.position.x,
                    y = agent.position.y,
                    "Food picked up"
                );
            }
            if let Some(amount) = report.delivered {
                self.stored += amount;
                self.stats.food_delivered += amount;
                self.stats.trips_completed += 1;
                tick.delivered += amount;
                debug!(
                    colony = %self.id,
                    agent = %id,
                    amount,
                    stored = self.stored,
                    "Food delivered"
                );
            }
            if report.departed && config.energy.enabled {
                let deficit = (config.energy.initial_energy - agent.energy).max(0.0);
                let rate = config.energy.food_per_energy;
                let restored = if rate > 0.0 {
                    deficit.min(self.stored / rate)
                } else {
                    deficit
                };
                let cost = restored * rate;
                agent.energy += restored;
                self.stored = (self.stored - cost).max(0.0);
                self.stats.food_spent += cost;
            }
        }

        for id in dead {
            if let Some(agent) = self.agents.remove(&id) {
                self.stats.died += 1;
                tick.died += 1;
                debug!(
                    colony = %self.id,
                    agent = %id,
                    age = agent.age,
                    carried = agent.carried,
                    "Ant died"
                );
            }
        }

        let rules = &config.colony;
        if self.agents.len() < rules.max_population
            && self.stored >= rules.spawn_threshold
            && self.stored >= rules.spawn_cost
        {
            self.stored -= rules.spawn_cost;
            self.stats.food_spent += rules.spawn_cost;
            self.stats.spawned += 1;
            tick.spawned += 1;
            let id = self.spawn_agent(config, rng);
            debug!(
                colony = %self.id,
                agent = %id,
                stored = self.stored,
                population = self.agents.len(),
                "Ant spawned"
            );
        }

        tick.population = self.agents.len();
        tick.stored = self.stored;
        Ok(tick)
    }

    /// Number of ants whose state matches `predicate`
    pub fn count_where(&self, predicate: impl Fn(&AgentState) -> bool) -> usize {
        self.agents.values().filter(|a| predicate(&a.state)).count()
    }

    /// Check restored state against the field and configuration
    pub(crate) fn check_consistency(&self, field: &Field, config: &SimulationConfig) -> Result<()> {
        use anthill_core::Error;

        if !field.is_passable(self.nest) {
            return Err(Error::InvalidState(format!(
                "{} nest at {} is not a passable cell",
                self.id, self.nest
            )));
        }
        if !(self.stored >= 0.0) {
            return Err(Error::InvalidState(format!(
                "{} has negative stored food {}",
                self.id, self.stored
            )));
        }
        for (id, agent) in &self.agents {
            if *id != agent.id || id.0 >= self.next_agent_id {
                return Err(Error::InvalidState(format!("{} has a mismatched {}", self.id, id)));
            }
            if !field.is_passable(agent.position) {
                return Err(Error::InvalidState(format!(
                    "{} of {} stands on impassable cell {}",
                    id, self.id, agent.position
                )));
            }
            if !(agent.carried >= 0.0 && agent.carried <= config.agent.capacity) {
                return Err(Error::InvalidState(format!(
                    "{} of {} carries {} beyond capacity {}",
                    id, self.id, agent.carried, config.agent.capacity
                )));
            }
        }
        Ok(())
    }
}
