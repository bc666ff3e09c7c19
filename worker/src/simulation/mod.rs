mod colony;
mod maze;
mod pheromone;
pub mod seed;
mod sim;

// Re-export key types for easier imports
pub use colony::{Colony, ColonyError, ColonySnapshot, TickParams};
pub use maze::{Exits, GridMaze, Maze, MazeError};
pub use pheromone::{PheromoneField, PheromoneGrid};
pub use sim::Simulation;

/// Ticks between progress lines in headless runs.
pub const DEFAULT_REPORT_INTERVAL: u64 = 500;
