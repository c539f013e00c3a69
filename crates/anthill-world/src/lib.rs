//! Ant colony simulation engine.
//!
//! Colonies of ants share one bounded field of pheromone, food and
//! obstacles. Ants lay and follow trails, carry food home and feed
//! colony growth; the host drives everything through [`Simulation::update`].

pub mod agent;
pub mod colony;
pub mod facade;
pub mod field;
pub mod snapshot;
pub mod spatial;
pub mod world;

pub use agent::{Agent, AgentState, StepReport};
pub use colony::Colony;
pub use facade::Simulation;
pub use field::{CellView, Field, PheromoneDynamics};
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
pub use world::World;
