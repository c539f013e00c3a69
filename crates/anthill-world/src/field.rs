//! Bounded 2D field of pheromone, food and obstacle state.

use anthill_core::{Channel, Error, PheromoneConfig, Position, Result, SimulationConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Coefficients of the per-tick pheromone pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PheromoneDynamics {
    pub evaporation_rate: f32,
    pub diffusion_weight: f32,
    pub max_concentration: f32,
    pub min_concentration: f32,
}

impl From<&PheromoneConfig> for PheromoneDynamics {
    fn from(config: &PheromoneConfig) -> Self {
        Self {
            evaporation_rate: config.evaporation_rate,
            diffusion_weight: config.diffusion_weight,
            max_concentration: config.max_concentration,
            min_concentration: config.min_concentration,
        }
    }
}

impl PheromoneDynamics {
    /// Reject coefficients that would let the sweep create mass or go negative
    pub fn validate(&self) -> Result<()> {
        let fraction = |name: &str, value: f32| {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::invalid_config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )))
            }
        };
        fraction("pheromone.evaporation_rate", self.evaporation_rate)?;
        fraction("pheromone.diffusion_weight", self.diffusion_weight)?;
        if !(self.max_concentration.is_finite() && self.max_concentration > 0.0) {
            return Err(Error::invalid_config(format!(
                "pheromone.max_concentration must be positive, got {}",
                self.max_concentration
            )));
        }
        if !(self.min_concentration.is_finite() && self.min_concentration >= 0.0) {
            return Err(Error::invalid_config(format!(
                "pheromone.min_concentration must not be negative, got {}",
                self.min_concentration
            )));
        }
        Ok(())
    }
}

impl Default for PheromoneDynamics {
    fn default() -> Self {
        Self::from(&PheromoneConfig::default())
    }
}

/// Read-only copy of one cell, for renderers and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellView {
    pub to_food: f32,
    pub to_home: f32,
    pub food: f32,
    pub obstacle: bool,
}

/// A fixed-size, non-wrapping grid.
///
/// Every coordinate access is bounds-checked and reports
/// [`Error::OutOfBounds`] instead of clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub width: i32,
    pub height: i32,
    dynamics: PheromoneDynamics,
    pheromones: [Vec<f32>; Channel::COUNT],
    food: Vec<f32>,
    obstacles: Vec<bool>,
    /// Write buffer of the diffusion pass, swapped with the live layer
    #[serde(skip)]
    scratch: Vec<f32>,
}

impl Field {
    pub fn new(width: i32, height: i32, dynamics: PheromoneDynamics) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::invalid_config(format!(
                "field dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        dynamics.validate()?;
        let size = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            dynamics,
            pheromones: [vec![0.0; size], vec![0.0; size]],
            food: vec![0.0; size],
            obstacles: vec![false; size],
            scratch: Vec::new(),
        })
    }

    /// Create a field from configuration, scattering obstacles and food
    /// patches while keeping every nest and its neighbourhood clear
    pub fn generate<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Result<Self> {
        let field_config = &config.field;
        let mut field = Self::new(
            field_config.width,
            field_config.height,
            PheromoneDynamics::from(&config.pheromone),
        )?;

        let nests: Vec<Position> = config.nests.iter().map(|n| n.position()).collect();
        let near_nest = |pos: Position| nests.iter().any(|nest| nest.chebyshev_distance(&pos) <= 1);

        if field_config.obstacle_density > 0.0 {
            for y in 0..field.height {
                for x in 0..field.width {
                    let pos = Position::new(x, y);
                    let roll = rng.gen::<f32>();
                    if roll < field_config.obstacle_density && !near_nest(pos) {
                        field.set_obstacle(pos, true)?;
                    }
                }
            }
        }

        let radius = field_config.food_patch_radius;
        for _ in 0..field_config.food_patches {
            let center = Position::new(
                rng.gen_range(0..field.width),
                rng.gen_range(0..field.height),
            );
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let pos = center.add(dx, dy);
                    if field.in_bounds(pos) && !near_nest(pos) {
                        field.place_food(pos, field_config.food_per_cell)?;
                    }
                }
            }
        }

        debug!(
            width = field.width,
            height = field.height,
            total_food = field.total_food(),
            "Generated field"
        );

        Ok(field)
    }

    pub fn dynamics(&self) -> &PheromoneDynamics {
        &self.dynamics
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    fn index(&self, pos: Position) -> Result<usize> {
        if !self.in_bounds(pos) {
            return Err(Error::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((pos.y * self.width + pos.x) as usize)
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Pheromone concentration of `channel` at the cell containing `pos`
    pub fn sample(&self, pos: Position, channel: Channel) -> Result<f32> {
        let index = self.index(pos)?;
        Ok(self.pheromones[channel.index()][index])
    }

    /// Add pheromone to a cell, saturating at the maximum concentration.
    ///
    /// Returns the amount actually added; obstacles and non-positive or
    /// non-finite amounts take nothing.
    pub fn deposit(&mut self, pos: Position, channel: Channel, amount: f32) -> Result<f32> {
        let index = self.index(pos)?;
        if self.obstacles[index] || !(amount.is_finite() && amount > 0.0) {
            return Ok(0.0);
        }
        let cell = &mut self.pheromones[channel.index()][index];
        let before = *cell;
        *cell = (before + amount).min(self.dynamics.max_concentration);
        Ok(*cell - before)
    }

    /// Remove up to `amount` food from a cell, returning what was taken
    pub fn consume_food(&mut self, pos: Position, amount: f32) -> Result<f32> {
        let index = self.index(pos)?;
        let cell = &mut self.food[index];
        let taken = amount.max(0.0).min(*cell);
        *cell -= taken;
        Ok(taken)
    }

    /// Add food to a cell; obstacles take nothing
    pub fn place_food(&mut self, pos: Position, amount: f32) -> Result<f32> {
        let index = self.index(pos)?;
        if self.obstacles[index] || !(amount > 0.0) {
            return Ok(0.0);
        }
        self.food[index] += amount;
        Ok(amount)
    }

    pub fn food_at(&self, pos: Position) -> Result<f32> {
        let index = self.index(pos)?;
        Ok(self.food[index])
    }

    /// Mark or clear an obstacle. An obstacle cell holds no food or pheromone.
    pub fn set_obstacle(&mut self, pos: Position, obstacle: bool) -> Result<()> {
        let index = self.index(pos)?;
        self.obstacles[index] = obstacle;
        if obstacle {
            self.food[index] = 0.0;
            for layer in &mut self.pheromones {
                layer[index] = 0.0;
            }
        }
        Ok(())
    }

    pub fn is_obstacle(&self, pos: Position) -> Result<bool> {
        let index = self.index(pos)?;
        Ok(self.obstacles[index])
    }

    /// Whether an ant may stand on `pos`; false outside the field
    pub fn is_passable(&self, pos: Position) -> bool {
        match self.index(pos) {
            Ok(index) => !self.obstacles[index],
            Err(_) => false,
        }
    }

    /// Verify layer sizes and value ranges, for fields read back from disk
    pub fn check_layers(&self) -> Result<()> {
        self.dynamics.validate()?;
        let size = (self.width.max(0) as usize) * (self.height.max(0) as usize);
        if self.food.len() != size
            || self.obstacles.len() != size
            || self.pheromones.iter().any(|layer| layer.len() != size)
        {
            return Err(Error::InvalidState(format!(
                "field layers do not match {}x{}",
                self.width, self.height
            )));
        }
        for channel in Channel::ALL {
            let layer = &self.pheromones[channel.index()];
            let out_of_range = layer
                .iter()
                .any(|&v| !(0.0..=self.dynamics.max_concentration).contains(&v));
            if out_of_range {
                return Err(Error::InvalidState(format!(
                    "{} layer holds values outside [0, {}]",
                    channel.as_str(),
                    self.dynamics.max_concentration
                )));
            }
        }
        if self.food.iter().any(|&v| !(v >= 0.0)) {
            return Err(Error::InvalidState("negative food amount".to_string()));
        }
        Ok(())
    }

    /// Evaporate and diffuse every pheromone layer once.
    ///
    /// Each output cell is computed from the previous buffer only, so the
    /// sweep is order independent and deterministic. Obstacles and the
    /// border exchange nothing; the blend is a convex combination of prior
    /// values and never creates mass.
    pub fn decay_and_diffuse(&mut self) {
        let mut next = std::mem::take(&mut self.scratch);
        next.resize(self.food.len(), 0.0);

        for channel in Channel::ALL {
            self.row_sweep(channel).sweep(&mut next);
            std::mem::swap(&mut self.pheromones[channel.index()], &mut next);
        }
        self.scratch = next;
    }

    fn row_sweep(&self, channel: Channel) -> RowSweep<'_> {
        RowSweep {
            prev: &self.pheromones[channel.index()],
            obstacles: &self.obstacles,
            width: self.width as usize,
            height: self.height as usize,
            keep: 1.0 - self.dynamics.evaporation_rate,
            spread: self.dynamics.diffusion_weight * 0.25,
            floor: self.dynamics.min_concentration,
            ceiling: self.dynamics.max_concentration,
        }
    }

    /// Sum of one pheromone layer over the whole field
    pub fn total_pheromone(&self, channel: Channel) -> f64 {
        self.pheromones[channel.index()].iter().map(|&v| v as f64).sum()
    }

    /// Highest concentration of one layer
    pub fn max_pheromone(&self, channel: Channel) -> f32 {
        self.pheromones[channel.index()]
            .iter()
            .copied()
            .fold(0.0, f32::max)
    }

    pub fn total_food(&self) -> f64 {
        self.food.iter().map(|&v| v as f64).sum()
    }

    /// Raw row-major layer, for renderers
    pub fn pheromone_layer(&self, channel: Channel) -> &[f32] {
        &self.pheromones[channel.index()]
    }

    /// Iterator over all cells with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, CellView)> + '_ {
        (0..self.food.len()).map(move |i| {
            (
                self.index_to_pos(i),
                CellView {
                    to_food: self.pheromones[Channel::ToFood.index()][i],
                    to_home: self.pheromones[Channel::ToHome.index()][i],
                    food: self.food[i],
                    obstacle: self.obstacles[i],
                },
            )
        })
    }
}

/// Read side of one diffusion pass
struct RowSweep<'a> {
    prev: &'a [f32],
    obstacles: &'a [bool],
    width: usize,
    height: usize,
    keep: f32,
    spread: f32,
    floor: f32,
    ceiling: f32,
}

impl RowSweep<'_> {
    fn sweep(&self, next: &mut [f32]) {
        #[cfg(feature = "parallel")]
        self.sweep_parallel(next);

        #[cfg(not(feature = "parallel"))]
        self.sweep_sequential(next);
    }

    #[cfg_attr(all(feature = "parallel", not(test)), allow(dead_code))]
    fn sweep_sequential(&self, next: &mut [f32]) {
        next.chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| self.fill_row(y, row));
    }

    #[cfg(feature = "parallel")]
    fn sweep_parallel(&self, next: &mut [f32]) {
        next.par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| self.fill_row(y, row));
    }

    fn fill_row(&self, y: usize, row: &mut [f32]) {
        let base = y * self.width;
        for (x, out) in row.iter_mut().enumerate() {
            let i = base + x;
            if self.obstacles[i] {
                *out = 0.0;
                continue;
            }

            let value = self.prev[i];
            let mut flux = 0.0;
            if x > 0 && !self.obstacles[i - 1] {
                flux += self.prev[i - 1] - value;
            }
            if x + 1 < self.width && !self.obstacles[i + 1] {
                flux += self.prev[i + 1] - value;
            }
            if y > 0 && !self.obstacles[i - self.width] {
                flux += self.prev[i - self.width] - value;
            }
            if y + 1 < self.height && !self.obstacles[i + self.width] {
                flux += self.prev[i + self.width] - value;
            }

            let next = (self.keep * (value + self.spread * flux)).clamp(0.0, self.ceiling);
            *out = if next < self.floor { 0.0 } else { next };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anthill_core::NestConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dynamics(evaporation_rate: f32, diffusion_weight: f32) -> PheromoneDynamics {
        PheromoneDynamics {
            evaporation_rate,
            diffusion_weight,
            max_concentration: 100.0,
            min_concentration: 0.0,
        }
    }

    #[test]
    fn test_field_creation() {
        let field = Field::new(10, 8, PheromoneDynamics::default()).unwrap();
        assert_eq!(field.width, 10);
        assert_eq!(field.height, 8);
        assert_eq!(field.food.len(), 80);
        assert_eq!(field.iter().count(), 80);
        assert!(Field::new(0, 8, PheromoneDynamics::default()).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_reported() {
        let mut field = Field::new(10, 10, PheromoneDynamics::default()).unwrap();
        let outside = Position::new(10, 3);

        assert!(matches!(
            field.sample(outside, Channel::ToFood),
            Err(Error::OutOfBounds { x: 10, y: 3, .. })
        ));
        assert!(field.deposit(outside, Channel::ToHome, 1.0).is_err());
        assert!(field.consume_food(Position::new(-1, 0), 1.0).is_err());
        assert!(!field.is_passable(outside));
    }

    #[test]
    fn test_deposit_saturates() {
        let mut field = Field::new(4, 4, dynamics(0.0, 0.0)).unwrap();
        let pos = Position::new(1, 1);

        assert_eq!(field.deposit(pos, Channel::ToFood, 60.0).unwrap(), 60.0);
        assert_eq!(field.deposit(pos, Channel::ToFood, 60.0).unwrap(), 40.0);
        assert_eq!(field.sample(pos, Channel::ToFood).unwrap(), 100.0);
        assert_eq!(field.sample(pos, Channel::ToHome).unwrap(), 0.0);
        assert_eq!(field.deposit(pos, Channel::ToFood, -5.0).unwrap(), 0.0);
    }

    #[test]
    fn test_obstacle_rejects_deposit_and_food() {
        let mut field = Field::new(4, 4, PheromoneDynamics::default()).unwrap();
        let pos = Position::new(2, 2);
        field.place_food(pos, 3.0).unwrap();
        field.set_obstacle(pos, true).unwrap();

        assert_eq!(field.food_at(pos).unwrap(), 0.0);
        assert_eq!(field.deposit(pos, Channel::ToHome, 5.0).unwrap(), 0.0);
        assert_eq!(field.place_food(pos, 5.0).unwrap(), 0.0);
        assert!(!field.is_passable(pos));
    }

    #[test]
    fn test_consume_food_saturates() {
        let mut field = Field::new(4, 4, PheromoneDynamics::default()).unwrap();
        let pos = Position::new(0, 3);
        field.place_food(pos, 3.0).unwrap();

        assert_eq!(field.consume_food(pos, 2.0).unwrap(), 2.0);
        assert_eq!(field.consume_food(pos, 5.0).unwrap(), 1.0);
        assert_eq!(field.consume_food(pos, 5.0).unwrap(), 0.0);
        assert_eq!(field.food_at(pos).unwrap(), 0.0);
    }

    #[test]
    fn test_evaporation_only() {
        let mut field = Field::new(3, 3, dynamics(0.5, 0.0)).unwrap();
        let pos = Position::new(1, 1);
        field.deposit(pos, Channel::ToHome, 8.0).unwrap();

        field.decay_and_diffuse();
        assert_eq!(field.sample(pos, Channel::ToHome).unwrap(), 4.0);
        field.decay_and_diffuse();
        assert_eq!(field.sample(pos, Channel::ToHome).unwrap(), 2.0);
    }

    #[test]
    fn test_diffusion_is_symmetric_and_conserving() {
        let mut field = Field::new(5, 5, dynamics(0.0, 0.4)).unwrap();
        let center = Position::new(2, 2);
        field.deposit(center, Channel::ToFood, 10.0).unwrap();

        field.decay_and_diffuse();

        let north = field.sample(Position::new(2, 1), Channel::ToFood).unwrap();
        let south = field.sample(Position::new(2, 3), Channel::ToFood).unwrap();
        let east = field.sample(Position::new(3, 2), Channel::ToFood).unwrap();
        let west = field.sample(Position::new(1, 2), Channel::ToFood).unwrap();
        assert_eq!(north, south);
        assert_eq!(east, west);
        assert_eq!(north, east);
        assert!((north - 1.0).abs() < 1e-6);
        assert!((field.sample(center, Channel::ToFood).unwrap() - 6.0).abs() < 1e-6);
        assert!((field.total_pheromone(Channel::ToFood) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_obstacle_wall_blocks_diffusion() {
        let mut field = Field::new(7, 3, dynamics(0.0, 1.0)).unwrap();
        for y in 0..3 {
            field.set_obstacle(Position::new(3, y), true).unwrap();
        }
        field.deposit(Position::new(0, 1), Channel::ToHome, 50.0).unwrap();

        for _ in 0..50 {
            field.decay_and_diffuse();
        }

        for y in 0..3 {
            for x in 3..7 {
                assert_eq!(field.sample(Position::new(x, y), Channel::ToHome).unwrap(), 0.0);
            }
        }
        assert!((field.total_pheromone(Channel::ToHome) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_diffusion_flows_around_obstacle() {
        let mut field = Field::new(5, 3, dynamics(0.0, 1.0)).unwrap();
        // wall with a gap in the bottom row
        field.set_obstacle(Position::new(2, 0), true).unwrap();
        field.set_obstacle(Position::new(2, 1), true).unwrap();
        field.deposit(Position::new(0, 0), Channel::ToFood, 50.0).unwrap();

        for _ in 0..20 {
            field.decay_and_diffuse();
        }

        assert!(field.sample(Position::new(4, 0), Channel::ToFood).unwrap() > 0.0);
        assert_eq!(field.sample(Position::new(2, 0), Channel::ToFood).unwrap(), 0.0);
    }

    #[test]
    fn test_min_concentration_flushes() {
        let mut field = Field::new(2, 2, PheromoneDynamics {
            evaporation_rate: 0.5,
            diffusion_weight: 0.0,
            max_concentration: 100.0,
            min_concentration: 0.3,
        })
        .unwrap();
        let pos = Position::new(0, 0);
        field.deposit(pos, Channel::ToFood, 1.0).unwrap();

        field.decay_and_diffuse();
        assert_eq!(field.sample(pos, Channel::ToFood).unwrap(), 0.5);
        field.decay_and_diffuse();
        assert_eq!(field.sample(pos, Channel::ToFood).unwrap(), 0.0);
    }

    #[test]
    fn test_generate_keeps_nests_clear() {
        let mut config = SimulationConfig::default();
        config.field.width = 20;
        config.field.height = 20;
        config.field.obstacle_density = 0.9;
        config.field.food_patches = 10;
        config.nests = vec![NestConfig::new(5, 5, 1)];

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let field = Field::generate(&config, &mut rng).unwrap();

        for dy in -1..=1 {
            for dx in -1..=1 {
                let pos = Position::new(5 + dx, 5 + dy);
                assert!(field.is_passable(pos));
                assert_eq!(field.food_at(pos).unwrap(), 0.0);
            }
        }
        assert!(field.iter().any(|(_, cell)| cell.obstacle));
    }

    #[test]
    fn test_generate_is_seeded() {
        let config = SimulationConfig::default();
        let a = Field::generate(&config, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = Field::generate(&config, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(bincode::serialize(&a).unwrap(), bincode::serialize(&b).unwrap());
        assert!(a.total_food() > 0.0);
    }

    #[test]
    fn test_invalid_dynamics_are_rejected() {
        assert!(Field::new(4, 4, dynamics(-1.0, 0.1)).is_err());
        assert!(Field::new(4, 4, dynamics(1.5, 0.1)).is_err());
        assert!(Field::new(4, 4, dynamics(0.1, 1.2)).is_err());
        assert!(Field::new(4, 4, dynamics(f32::NAN, 0.1)).is_err());
        assert!(Field::new(4, 4, PheromoneDynamics {
            max_concentration: 0.0,
            ..dynamics(0.1, 0.1)
        })
        .is_err());
        assert!(Field::new(4, 4, dynamics(1.0, 1.0)).is_ok());
    }

    #[test]
    fn test_check_layers_rejects_edited_dynamics() {
        let field = Field::new(3, 3, PheromoneDynamics::default()).unwrap();
        assert!(field.check_layers().is_ok());

        let mut json: serde_json::Value = serde_json::to_value(&field).unwrap();
        json["dynamics"]["evaporation_rate"] = serde_json::json!(-3.0);
        let edited: Field = serde_json::from_value(json).unwrap();
        assert_eq!(edited.dynamics().evaporation_rate, -3.0);
        assert!(edited.check_layers().is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_sweep_matches_sequential() {
        let mut config = SimulationConfig::default();
        config.field.width = 37;
        config.field.height = 23;
        config.field.obstacle_density = 0.15;
        config.nests = vec![NestConfig::new(3, 3, 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut field = Field::generate(&config, &mut rng).unwrap();
        for i in 0..field.food.len() {
            let pos = field.index_to_pos(i);
            field.deposit(pos, Channel::ToFood, rng.gen_range(0.0..100.0)).unwrap();
            field.deposit(pos, Channel::ToHome, rng.gen_range(0.0..100.0)).unwrap();
        }

        for _ in 0..10 {
            for channel in Channel::ALL {
                let sweep = field.row_sweep(channel);
                let mut sequential = vec![0.0; field.food.len()];
                let mut parallel = vec![0.0; field.food.len()];
                sweep.sweep_sequential(&mut sequential);
                sweep.sweep_parallel(&mut parallel);
                let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
                assert_eq!(bits(&sequential), bits(&parallel));
            }
            field.decay_and_diffuse();
        }
    }

    fn field_strategy() -> impl Strategy<Value = (Field, usize)> {
        (1i32..8, 1i32..8, 0.0f32..1.0, 0.0f32..1.0, 1usize..12).prop_flat_map(
            |(width, height, evaporation, diffusion, steps)| {
                let cells = (width * height) as usize;
                (
                    prop::collection::vec(0.0f32..100.0, cells),
                    prop::collection::vec(prop::bool::weighted(0.2), cells),
                )
                    .prop_map(move |(values, walls)| {
                        let mut field = Field::new(width, height, dynamics(evaporation, diffusion))
                            .unwrap();
                        for (i, (value, wall)) in values.iter().zip(&walls).enumerate() {
                            let pos = field.index_to_pos(i);
                            field.set_obstacle(pos, *wall).unwrap();
                            field.deposit(pos, Channel::ToFood, *value).unwrap();
                            field.deposit(pos, Channel::ToHome, *value / 2.0).unwrap();
                        }
                        (field, steps)
                    })
            },
        )
    }

    proptest! {
        #[test]
        fn prop_concentrations_stay_bounded((mut field, steps) in field_strategy()) {
            for _ in 0..steps {
                field.decay_and_diffuse();
                for (_, cell) in field.iter() {
                    prop_assert!(cell.to_food >= 0.0 && cell.to_food <= 100.0);
                    prop_assert!(cell.to_home >= 0.0 && cell.to_home <= 100.0);
                }
            }
        }

        #[test]
        fn prop_mass_never_increases((mut field, steps) in field_strategy()) {
            for _ in 0..steps {
                for channel in Channel::ALL {
                    let before = field.total_pheromone(channel);
                    let food_before = field.total_food();
                    field.decay_and_diffuse();
                    let after = field.total_pheromone(channel);
                    prop_assert!(after <= before * (1.0 + 1e-5) + 1e-3);
                    prop_assert_eq!(field.total_food(), food_before);
                }
            }
        }

        #[test]
        fn prop_sweep_is_deterministic((field, steps) in field_strategy()) {
            let mut a = field.clone();
            let mut b = field;
            for _ in 0..steps {
                a.decay_and_diffuse();
                b.decay_and_diffuse();
            }
            prop_assert_eq!(bincode::serialize(&a).unwrap(), bincode::serialize(&b).unwrap());
        }
    }
}
