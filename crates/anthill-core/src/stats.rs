//! Colony statistics and per-tick summaries.

use crate::ColonyId;
use serde::{Deserialize, Serialize};

/// Running totals of one colony since construction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonyStats {
    /// Food handed in at the nest
    pub food_delivered: f32,
    /// Completed round trips (pickups that reached the nest)
    pub trips_completed: u64,
    /// Ants spawned from stored food, excluding the initial seed
    pub spawned: u64,
    /// Ants lost to starvation or old age
    pub died: u64,
    /// Stored food spent on spawning and refuelling
    pub food_spent: f32,
}

impl ColonyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mean food per completed trip
    pub fn mean_load(&self) -> f32 {
        if self.trips_completed == 0 {
            0.0
        } else {
            self.food_delivered / self.trips_completed as f32
        }
    }
}

/// What happened to one colony during a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonyTick {
    pub colony: ColonyId,
    pub population: usize,
    pub stored: f32,
    pub delivered: f32,
    pub pickups: u32,
    pub spawned: u32,
    pub died: u32,
}

/// Result of one world step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    /// Tick number after the step completed
    pub tick: u64,
    pub colonies: Vec<ColonyTick>,
}

impl TickSummary {
    pub fn total_population(&self) -> usize {
        self.colonies.iter().map(|c| c.population).sum()
    }

    pub fn total_delivered(&self) -> f32 {
        self.colonies.iter().map(|c| c.delivered).sum()
    }
}
