//! Neighbourhood queries and move scoring over the field.

use crate::field::Field;
use anthill_core::{Channel, Direction, MoveSelection, MovementConfig, Position};
use rand::Rng;

/// A legal one-cell move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub direction: Direction,
    pub target: Position,
}

/// Moves into in-bounds, obstacle-free neighbours, in compass order.
///
/// Moves off the field are dropped rather than wrapped or clamped.
pub fn open_moves(field: &Field, pos: Position) -> Vec<Move> {
    Direction::all()
        .into_iter()
        .map(|direction| Move {
            direction,
            target: pos.step(direction),
        })
        .filter(|m| field.is_passable(m.target))
        .collect()
}

/// Highest concentration of `channel` among the move targets
pub fn strongest(field: &Field, moves: &[Move], channel: Channel) -> f32 {
    moves
        .iter()
        .filter_map(|m| field.sample(m.target, channel).ok())
        .fold(0.0, f32::max)
}

/// Closest cell holding at least `threshold` food within `radius`,
/// excluding `pos` itself. Ties resolve to the first cell in row-major order.
pub fn nearest_food(field: &Field, pos: Position, radius: i32, threshold: f32) -> Option<Position> {
    let mut best: Option<(i32, Position)> = None;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx == 0 && dy == 0 {
                continue;
            }
            let cell = pos.add(dx, dy);
            let Ok(food) = field.food_at(cell) else {
                continue;
            };
            if food < threshold {
                continue;
            }
            let distance = pos.chebyshev_distance(&cell);
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, cell));
            }
        }
    }
    best.map(|(_, cell)| cell)
}

/// Index of the highest score; the earliest entry wins a tie
pub fn best_index(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Draw an index with probability proportional to `exp(score / temperature)`.
///
/// Exactly one random number is consumed per call, so stepping order alone
/// fixes the generator's stream.
pub fn softmax_index<R: Rng>(scores: &[f32], temperature: f32, rng: &mut R) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let weights: Vec<f64> = scores
        .iter()
        .map(|&s| (f64::from(s - max) / f64::from(temperature)).exp())
        .collect();
    let total: f64 = weights.iter().sum();

    let roll = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if roll < cumulative {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

/// Pick a candidate according to the configured selection mode
pub fn select_index<R: Rng>(scores: &[f32], movement: &MovementConfig, rng: &mut R) -> Option<usize> {
    match movement.selection {
        MoveSelection::Greedy => best_index(scores),
        MoveSelection::Softmax => softmax_index(scores, movement.temperature, rng),
    }
}
