//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an ant, unique within its colony and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ant-{}", self.0)
    }
}

/// Identifier of a colony; also its position in the world's stepping order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColonyId(pub u32);

impl fmt::Display for ColonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "colony-{}", self.0)
    }
}

/// Cell-aligned 2D position in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Whether the position lies inside a `width` x `height` grid
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }

    /// Vector from `self` to `other`
    pub fn offset_to(&self, other: &Position) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Chessboard distance; the number of 8-way moves between two cells
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction for movement.
///
/// The declaration order is the tie-break order used when two moves score
/// the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }

    pub fn from_index(index: usize) -> Direction {
        Self::all()[index % 8]
    }

    /// Unit-length vector pointing along this direction
    pub fn unit_vector(&self) -> (f32, f32) {
        let (dx, dy) = self.to_delta();
        let len = ((dx * dx + dy * dy) as f32).sqrt();
        (dx as f32 / len, dy as f32 / len)
    }

    /// Cosine between this direction and an arbitrary vector, in `[-1, 1]`.
    /// A zero vector aligns with nothing.
    pub fn alignment(&self, dx: i32, dy: i32) -> f32 {
        if dx == 0 && dy == 0 {
            return 0.0;
        }
        let (ux, uy) = self.unit_vector();
        let len = ((dx * dx + dy * dy) as f32).sqrt();
        (ux * dx as f32 + uy * dy as f32) / len
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }
}

/// Pheromone layer in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Laid by ants carrying food; followed by explorers
    ToFood,
    /// Laid by explorers; followed by ants heading back to the nest
    ToHome,
}

impl Channel {
    pub const COUNT: usize = 2;

    pub const ALL: [Channel; Channel::COUNT] = [Channel::ToFood, Channel::ToHome];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::ToFood => "to_food",
            Channel::ToHome => "to_home",
        }
    }
}
