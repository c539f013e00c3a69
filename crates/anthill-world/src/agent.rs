//! Ant state and behaviour.

use crate::field::Field;
use crate::spatial::{self, Move};
use anthill_core::{AgentId, Channel, Direction, Position, Result, SimulationConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Behavioural state of an ant, with the data each state needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// Searching for food, laying a trail home
    Exploring { steps_from_home: u32 },
    /// Carrying food to the nest, laying a trail to the food
    ReturningWithFood { steps_from_food: u32 },
    /// Heading to the nest empty-handed to refuel
    ReturningHome,
    /// Resting at the nest
    Idle { cooldown: u32 },
}

impl AgentState {
    pub fn name(&self) -> &'static str {
        match self {
            AgentState::Exploring { .. } => "exploring",
            AgentState::ReturningWithFood { .. } => "returning_with_food",
            AgentState::ReturningHome => "returning_home",
            AgentState::Idle { .. } => "idle",
        }
    }

    pub fn is_returning(&self) -> bool {
        matches!(
            self,
            AgentState::ReturningWithFood { .. } | AgentState::ReturningHome
        )
    }
}

/// What one step did that the owning colony has to act on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub moved: bool,
    /// Food taken from the field this tick
    pub picked_up: f32,
    /// Food handed to the colony this tick
    pub delivered: Option<f32>,
    /// Left the nest this tick and may be refuelled
    pub departed: bool,
    pub died: bool,
}

/// An ant in the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Position,
    pub heading: Direction,
    pub state: AgentState,
    pub carried: f32,
    pub energy: f32,
    pub age: u64,
}

impl Agent {
    pub fn new(id: AgentId, position: Position, heading: Direction, energy: f32) -> Self {
        Self {
            id,
            position,
            heading,
            state: AgentState::Exploring { steps_from_home: 0 },
            carried: 0.0,
            energy,
            age: 0,
        }
    }

    pub fn is_carrying(&self) -> bool {
        self.carried > 0.0
    }

    /// Advance the ant by one tick against the shared field.
    ///
    /// Coordinate errors from the field are propagated; every move is
    /// pre-filtered, so one surfacing here is an engine defect.
    pub fn step<R: Rng>(
        &mut self,
        field: &mut Field,
        nest: Position,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<StepReport> {
        let mut report = StepReport::default();
        self.age += 1;

        let energy = &config.energy;
        if energy.enabled {
            self.energy = (self.energy - energy.decay_per_tick).max(0.0);
            let too_old = energy.max_age > 0 && self.age >= energy.max_age;
            if self.energy <= 0.0 || too_old {
                trace!(agent = %self.id, age = self.age, "Ant expired");
                report.died = true;
                return Ok(report);
            }
        }

        match self.state {
            AgentState::Idle { cooldown } if cooldown > 0 => {
                self.state = AgentState::Idle {
                    cooldown: cooldown - 1,
                };
            }
            AgentState::Idle { .. } => {
                self.transition(AgentState::Exploring { steps_from_home: 0 });
                report.departed = true;
                self.explore(field, config, rng, &mut report)?;
            }
            AgentState::Exploring { .. } => {
                if energy.enabled && self.energy < energy.return_threshold {
                    self.transition(AgentState::ReturningHome);
                    self.return_to_nest(field, nest, config, rng, &mut report)?;
                } else {
                    self.explore(field, config, rng, &mut report)?;
                }
            }
            AgentState::ReturningWithFood { .. } | AgentState::ReturningHome => {
                self.return_to_nest(field, nest, config, rng, &mut report)?;
            }
        }

        Ok(report)
    }

    fn transition(&mut self, next: AgentState) {
        trace!(
            agent = %self.id,
            from = self.state.name(),
            to = next.name(),
            x = self.position.x,
            y = self.position.y,
            "State transition"
        );
        self.state = next;
    }

    fn explore<R: Rng>(
        &mut self,
        field: &mut Field,
        config: &SimulationConfig,
        rng: &mut R,
        report: &mut StepReport,
    ) -> Result<()> {
        if self.try_pickup(field, config, report)? {
            return Ok(());
        }

        let moves = spatial::open_moves(field, self.position);
        let Some(chosen) = self.choose_exploring_move(field, &moves, config, rng)? else {
            return Ok(());
        };
        self.advance(chosen);
        report.moved = true;

        let steps = match &mut self.state {
            AgentState::Exploring { steps_from_home } => {
                *steps_from_home = steps_from_home.saturating_add(1);
                *steps_from_home
            }
            _ => 0,
        };
        let amount = config.pheromone.deposit(Channel::ToHome).amount_after(steps);
        field.deposit(self.position, Channel::ToHome, amount)?;

        self.try_pickup(field, config, report)?;
        Ok(())
    }

    fn return_to_nest<R: Rng>(
        &mut self,
        field: &mut Field,
        nest: Position,
        config: &SimulationConfig,
        rng: &mut R,
        report: &mut StepReport,
    ) -> Result<()> {
        if self.position == nest {
            self.arrive(config, report);
            return Ok(());
        }

        let moves = spatial::open_moves(field, self.position);
        let Some(chosen) = self.choose_homing_move(field, &moves, nest, config, rng)? else {
            return Ok(());
        };
        self.advance(chosen);
        report.moved = true;

        if let AgentState::ReturningWithFood { steps_from_food } = &mut self.state {
            *steps_from_food = steps_from_food.saturating_add(1);
            let amount = config
                .pheromone
                .deposit(Channel::ToFood)
                .amount_after(*steps_from_food);
            field.deposit(self.position, Channel::ToFood, amount)?;
        }

        if self.position == nest {
            self.arrive(config, report);
        }
        Ok(())
    }

    fn advance(&mut self, chosen: Move) {
        self.position = chosen.target;
        self.heading = chosen.direction;
    }

    /// Take food from the current cell if there is enough of it
    fn try_pickup(
        &mut self,
        field: &mut Field,
        config: &SimulationConfig,
        report: &mut StepReport,
    ) -> Result<bool> {
        let available = field.food_at(self.position)?;
        if available < config.agent.pickup_threshold {
            return Ok(false);
        }
        let room = (config.agent.capacity - self.carried).max(0.0);
        let taken = field.consume_food(self.position, room)?;
        if taken <= 0.0 {
            return Ok(false);
        }

        self.carried += taken;
        report.picked_up += taken;
        self.heading = self.heading.opposite();
        self.transition(AgentState::ReturningWithFood { steps_from_food: 0 });
        Ok(true)
    }

    fn arrive(&mut self, config: &SimulationConfig, report: &mut StepReport) {
        if let AgentState::ReturningWithFood { .. } = self.state {
            report.delivered = Some(self.carried);
            self.carried = 0.0;
        }
        self.transition(AgentState::Idle {
            cooldown: config.agent.idle_ticks,
        });
    }

    fn choose_exploring_move<R: Rng>(
        &self,
        field: &Field,
        moves: &[Move],
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Option<Move>> {
        if moves.is_empty() {
            trace!(agent = %self.id, "Boxed in, holding position");
            return Ok(None);
        }

        let weights = &config.movement;
        let gradient_max = spatial::strongest(field, moves, Channel::ToFood);
        let target = spatial::nearest_food(
            field,
            self.position,
            config.agent.sense_radius,
            config.agent.pickup_threshold,
        )
        .map(|food| self.position.offset_to(&food));
        let (hx, hy) = self.heading.to_delta();

        let mut scores = Vec::with_capacity(moves.len());
        for m in moves {
            let mut score = 0.0;
            if gradient_max > weights.detection_threshold {
                score += weights.gradient_weight * field.sample(m.target, Channel::ToFood)? / gradient_max;
            }
            if let Some((tx, ty)) = target {
                score += weights.target_weight * m.direction.alignment(tx, ty);
            }
            score += weights.persistence * m.direction.alignment(hx, hy);
            if weights.noise > 0.0 {
                score += weights.noise * rng.gen::<f32>();
            }
            scores.push(score);
        }

        Ok(spatial::select_index(&scores, weights, rng).map(|i| moves[i]))
    }

    /// Gradient ascent on the home trail, with the straight line to the
    /// nest always in the mix so an ant without a trail still gets home
    fn choose_homing_move<R: Rng>(
        &self,
        field: &Field,
        moves: &[Move],
        nest: Position,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Option<Move>> {
        if moves.is_empty() {
            trace!(agent = %self.id, "Boxed in, holding position");
            return Ok(None);
        }

        let weights = &config.movement;
        let gradient_max = spatial::strongest(field, moves, Channel::ToHome);
        let (nx, ny) = self.position.offset_to(&nest);

        let mut scores = Vec::with_capacity(moves.len());
        for m in moves {
            let mut score = weights.homing_weight * m.direction.alignment(nx, ny);
            if gradient_max > weights.detection_threshold {
                score += weights.gradient_weight * field.sample(m.target, Channel::ToHome)? / gradient_max;
            }
            if weights.noise > 0.0 {
                score += weights.noise * rng.gen::<f32>();
            }
            scores.push(score);
        }

        Ok(spatial::select_index(&scores, weights, rng).map(|i| moves[i]))
    }
}
