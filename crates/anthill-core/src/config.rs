//! Configuration types for the simulation.

use crate::{Error, Position, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Field dimensions and initial terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Width of the field grid
    pub width: i32,
    /// Height of the field grid
    pub height: i32,
    /// Obstacle density (0.0 to 1.0)
    pub obstacle_density: f32,
    /// Number of food patches scattered at construction
    pub food_patches: u32,
    /// Chessboard radius of each food patch
    pub food_patch_radius: i32,
    /// Food placed on every cell of a patch
    pub food_per_cell: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            obstacle_density: 0.02,
            food_patches: 6,
            food_patch_radius: 3,
            food_per_cell: 20.0,
        }
    }
}

/// Deposit parameters of one pheromone channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositConfig {
    /// Amount laid on the first step away from the trail origin
    pub strength: f32,
    /// Amount subtracted per step travelled since the origin
    pub distance_decay: f32,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            strength: 10.0,
            distance_decay: 0.05,
        }
    }
}

impl DepositConfig {
    /// Amount to lay after `steps` moves away from the trail origin
    pub fn amount_after(&self, steps: u32) -> f32 {
        (self.strength - self.distance_decay * steps as f32).max(0.0)
    }
}

/// Pheromone dynamics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PheromoneConfig {
    /// Fraction of every concentration lost per tick (0.0 to 1.0)
    pub evaporation_rate: f32,
    /// Weight of the neighbour blend per tick (0.0 to 1.0)
    pub diffusion_weight: f32,
    /// Saturation level of a single cell
    pub max_concentration: f32,
    /// Concentrations below this are flushed to zero
    pub min_concentration: f32,
    /// Trail laid by ants carrying food
    pub to_food: DepositConfig,
    /// Trail laid by exploring ants
    pub to_home: DepositConfig,
}

impl Default for PheromoneConfig {
    fn default() -> Self {
        Self {
            evaporation_rate: 0.02,
            diffusion_weight: 0.1,
            max_concentration: 100.0,
            min_concentration: 1e-3,
            to_food: DepositConfig::default(),
            to_home: DepositConfig::default(),
        }
    }
}

impl PheromoneConfig {
    pub fn deposit(&self, channel: crate::Channel) -> &DepositConfig {
        match channel {
            crate::Channel::ToFood => &self.to_food,
            crate::Channel::ToHome => &self.to_home,
        }
    }
}

/// Per-ant limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum food an ant can carry
    pub capacity: f32,
    /// Minimum food on a cell for an ant to pick it up
    pub pickup_threshold: f32,
    /// Ticks an ant rests at the nest before exploring again
    pub idle_ticks: u32,
    /// How far an exploring ant can smell food (chessboard radius)
    pub sense_radius: i32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            capacity: 5.0,
            pickup_threshold: 1.0,
            idle_ticks: 2,
            sense_radius: 4,
        }
    }
}

/// How an ant turns candidate scores into a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSelection {
    /// Highest score wins; ties go to the earlier compass direction
    #[default]
    Greedy,
    /// Draw from a softmax over the scores, scaled by `temperature`
    Softmax,
}

/// Weights of the move scoring function
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub selection: MoveSelection,
    /// Softmax temperature; lower is greedier
    pub temperature: f32,
    /// Pull of the sensed pheromone gradient
    pub gradient_weight: f32,
    /// Pull toward food an explorer can smell
    pub target_weight: f32,
    /// Pull toward the nest while returning
    pub homing_weight: f32,
    /// Preference for keeping the current heading while exploring
    pub persistence: f32,
    /// Scale of the uniform random perturbation added to every move
    pub noise: f32,
    /// Below this concentration no gradient is considered detectable
    pub detection_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            selection: MoveSelection::Greedy,
            temperature: 0.25,
            gradient_weight: 1.0,
            target_weight: 1.0,
            homing_weight: 1.0,
            persistence: 0.3,
            noise: 0.2,
            detection_threshold: 0.01,
        }
    }
}

/// Energy and attrition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Disable to make ants immortal
    pub enabled: bool,
    /// Energy of a freshly spawned ant, and the refuel ceiling
    pub initial_energy: f32,
    /// Energy burnt every tick
    pub decay_per_tick: f32,
    /// Explorers below this head back to the nest
    pub return_threshold: f32,
    /// Ticks an ant lives at most; 0 disables ageing
    pub max_age: u64,
    /// Stored food spent per unit of energy refuelled at the nest
    pub food_per_energy: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_energy: 500.0,
            decay_per_tick: 1.0,
            return_threshold: 100.0,
            max_age: 0,
            food_per_energy: 0.01,
        }
    }
}

/// Colony economy shared by every colony
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Stored food spent to spawn one ant
    pub spawn_cost: f32,
    /// Stored food required before a spawn is considered
    pub spawn_threshold: f32,
    /// Population cap per colony
    pub max_population: usize,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            spawn_cost: 5.0,
            spawn_threshold: 10.0,
            max_population: 500,
        }
    }
}

/// Placement of one colony
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestConfig {
    pub x: i32,
    pub y: i32,
    /// Ants seeded at the nest on construction
    pub initial_agents: u32,
}

impl NestConfig {
    pub fn new(x: i32, y: i32, initial_agents: u32) -> Self {
        Self { x, y, initial_agents }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Ticks between population metric log lines; 0 disables them
    pub metrics_interval: u64,
    pub field: FieldConfig,
    pub pheromone: PheromoneConfig,
    pub agent: AgentConfig,
    pub movement: MovementConfig,
    pub energy: EnergyConfig,
    pub colony: ColonyConfig,
    /// One entry per colony, stepped in this order
    pub nests: Vec<NestConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let field = FieldConfig::default();
        let nest = NestConfig::new(field.width / 2, field.height / 2, 20);
        Self {
            seed: 0,
            metrics_interval: 100,
            field,
            pheromone: PheromoneConfig::default(),
            agent: AgentConfig::default(),
            movement: MovementConfig::default(),
            energy: EnergyConfig::default(),
            colony: ColonyConfig::default(),
            nests: vec![nest],
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading simulation config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject any configuration the engine cannot run faithfully.
    ///
    /// Values are never clamped; the first violation is reported.
    pub fn validate(&self) -> Result<()> {
        let field = &self.field;
        if field.width <= 0 || field.height <= 0 {
            return Err(Error::invalid_config(format!(
                "field dimensions must be positive, got {}x{}",
                field.width, field.height
            )));
        }
        field
            .width
            .checked_mul(field.height)
            .ok_or_else(|| Error::invalid_config("field dimensions overflow"))?;
        check_fraction("field.obstacle_density", field.obstacle_density)?;
        check_non_negative("field.food_per_cell", field.food_per_cell)?;
        if field.food_patch_radius < 0 {
            return Err(Error::invalid_config("field.food_patch_radius must not be negative"));
        }

        let pheromone = &self.pheromone;
        check_fraction("pheromone.evaporation_rate", pheromone.evaporation_rate)?;
        check_fraction("pheromone.diffusion_weight", pheromone.diffusion_weight)?;
        check_positive("pheromone.max_concentration", pheromone.max_concentration)?;
        check_non_negative("pheromone.min_concentration", pheromone.min_concentration)?;
        check_non_negative("pheromone.to_food.strength", pheromone.to_food.strength)?;
        check_non_negative("pheromone.to_food.distance_decay", pheromone.to_food.distance_decay)?;
        check_non_negative("pheromone.to_home.strength", pheromone.to_home.strength)?;
        check_non_negative("pheromone.to_home.distance_decay", pheromone.to_home.distance_decay)?;

        let agent = &self.agent;
        check_positive("agent.capacity", agent.capacity)?;
        check_positive("agent.pickup_threshold", agent.pickup_threshold)?;
        if agent.sense_radius < 0 {
            return Err(Error::invalid_config("agent.sense_radius must not be negative"));
        }

        let movement = &self.movement;
        check_non_negative("movement.gradient_weight", movement.gradient_weight)?;
        check_non_negative("movement.target_weight", movement.target_weight)?;
        check_non_negative("movement.homing_weight", movement.homing_weight)?;
        check_non_negative("movement.persistence", movement.persistence)?;
        check_non_negative("movement.noise", movement.noise)?;
        check_non_negative("movement.detection_threshold", movement.detection_threshold)?;
        if movement.selection == MoveSelection::Softmax {
            check_positive("movement.temperature", movement.temperature)?;
        }

        let energy = &self.energy;
        if energy.enabled {
            check_positive("energy.initial_energy", energy.initial_energy)?;
            check_non_negative("energy.decay_per_tick", energy.decay_per_tick)?;
            check_non_negative("energy.return_threshold", energy.return_threshold)?;
            check_non_negative("energy.food_per_energy", energy.food_per_energy)?;
            if energy.return_threshold >= energy.initial_energy {
                return Err(Error::invalid_config(format!(
                    "energy.return_threshold ({}) must be below energy.initial_energy ({})",
                    energy.return_threshold, energy.initial_energy
                )));
            }
        }

        let colony = &self.colony;
        check_non_negative("colony.spawn_cost", colony.spawn_cost)?;
        check_non_negative("colony.spawn_threshold", colony.spawn_threshold)?;
        if colony.spawn_threshold < colony.spawn_cost {
            return Err(Error::invalid_config(format!(
                "colony.spawn_threshold ({}) must not be below colony.spawn_cost ({})",
                colony.spawn_threshold, colony.spawn_cost
            )));
        }

        if self.nests.is_empty() {
            return Err(Error::invalid_config("at least one nest is required"));
        }
        for (index, nest) in self.nests.iter().enumerate() {
            if !nest.position().in_bounds(field.width, field.height) {
                return Err(Error::invalid_config(format!(
                    "nest {} at {} lies outside the {}x{} field",
                    index,
                    nest.position(),
                    field.width,
                    field.height
                )));
            }
        }

        Ok(())
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!("{} must be a non-negative number, got {}", name, value)))
    }
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(format!("{} must be positive, got {}", name, value)))
    }
}

fn check_fraction(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!("{} must lie in [0, 1], got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = SimulationConfig::default();
        assert_eq!(config.field.width, 128);
        assert_eq!(config.field.height, 128);
        assert_eq!(config.nests.len(), 1);
        assert_eq!(config.nests[0].position(), Position::new(64, 64));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let json = r#"{ "seed": 7, "field": { "width": 32, "height": 16 }, "nests": [{ "x": 1, "y": 2, "initial_agents": 3 }] }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.field.width, 32);
        assert_eq!(config.field.food_patches, FieldConfig::default().food_patches);
        assert_eq!(config.agent.capacity, 5.0);
        assert_eq!(config.nests[0].initial_agents, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let mut config = SimulationConfig::default();
        config.field.width = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_bad_rates() {
        let mut config = SimulationConfig::default();
        config.pheromone.evaporation_rate = -0.1;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.pheromone.diffusion_weight = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.movement.noise = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut config = SimulationConfig::default();
        config.agent.capacity = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nest_outside_field() {
        let mut config = SimulationConfig::default();
        config.nests = vec![NestConfig::new(500, 0, 1)];
        assert!(config.validate().is_err());

        config.nests.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_return_threshold_at_or_above_initial_energy() {
        let mut config = SimulationConfig::default();
        config.energy.initial_energy = 50.0;
        config.energy.return_threshold = 100.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));

        config.energy.return_threshold = 50.0;
        assert!(config.validate().is_err());

        config.energy.return_threshold = 49.0;
        assert!(config.validate().is_ok());

        config.energy.enabled = false;
        config.energy.return_threshold = 100.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_softmax_selection_needs_positive_temperature() {
        let json = r#"{ "movement": { "selection": "softmax", "temperature": 0.0 } }"#;
        let mut config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.movement.selection, MoveSelection::Softmax);
        assert!(config.validate().is_err());

        config.movement.temperature = 0.5;
        assert!(config.validate().is_ok());

        config.movement.selection = MoveSelection::Greedy;
        config.movement.temperature = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_threshold_below_cost() {
        let mut config = SimulationConfig::default();
        config.colony.spawn_cost = 20.0;
        config.colony.spawn_threshold = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deposit_amount_after() {
        let deposit = DepositConfig {
            strength: 10.0,
            distance_decay: 0.5,
        };
        assert_eq!(deposit.amount_after(0), 10.0);
        assert_eq!(deposit.amount_after(4), 8.0);
        assert_eq!(deposit.amount_after(100), 0.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(config.seed, deserialized.seed);
        assert_eq!(config.pheromone.diffusion_weight, deserialized.pheromone.diffusion_weight);
    }
}
