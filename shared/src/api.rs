use rkyv::{Archive, Deserialize, Serialize};

/// Wire code used for an ant that has not moved since leaving the nest.
pub const DIRECTION_NONE_CODE: u8 = 4;

/// A maze cell, addressed by row then column.
#[derive(
    Archive, Serialize, Deserialize, serde::Deserialize, serde::Serialize, Debug, Clone, Copy,
    PartialEq, Eq, Hash, Default,
)]
pub struct GridPos {
    pub row: u16,
    pub col: u16,
}

impl GridPos {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Shifts the position by a signed offset, `None` if it would leave the u16 range.
    pub fn offset_by(self, d_row: i16, d_col: i16) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }

    /// Neighbouring cell in `dir`, `None` across the top or left edge.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (d_row, d_col) = dir.offset();
        self.offset_by(d_row, d_col)
    }
}

/// One of the four grid directions.
///
/// The discriminants are chosen so that `reverse(d) == 3 - d`.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    East = 1,
    West = 2,
    South = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::South,
    ];

    #[inline(always)]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::North),
            1 => Some(Direction::East),
            2 => Some(Direction::West),
            3 => Some(Direction::South),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn reverse(self) -> Self {
        Self::ALL[3 - self as usize]
    }

    /// (row delta, column delta) of a single step.
    #[inline(always)]
    pub fn offset(self) -> (i16, i16) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::South => (1, 0),
        }
    }
}

/// Encodes an optional heading for the wire, `DIRECTION_NONE_CODE` standing for none.
pub fn direction_code(dir: Option<Direction>) -> u8 {
    dir.map_or(DIRECTION_NONE_CODE, Direction::code)
}

/// Startup parameters of a run, read from TOML by the display and sent to the worker.
#[derive(Archive, Serialize, Deserialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationSetup {
    pub rows: u16,
    pub cols: u16,
    pub maze_seed: u64,
    /// Chance of knocking down each wall left after carving, creating loops.
    pub braid_probability: f64,
    /// Defaults to a quarter of the cell count.
    pub population: Option<u32>,
    pub max_life: u32,
    pub exploration_probability: f64,
    /// Weight of the strongest neighbour when laying pheromone.
    pub alpha: f64,
    /// Evaporation factor applied once per tick.
    pub beta: f64,
    pub nest: GridPos,
    /// Defaults to the corner opposite the origin.
    pub food: Option<GridPos>,
}

impl Default for SimulationSetup {
    fn default() -> Self {
        Self {
            rows: 25,
            cols: 25,
            maze_seed: 12345,
            braid_probability: 0.0,
            population: None,
            max_life: 500,
            exploration_probability: 0.0,
            alpha: 0.9,
            beta: 0.99,
            nest: GridPos::new(0, 0),
            food: None,
        }
    }
}

impl SimulationSetup {
    pub fn population(&self) -> u32 {
        self.population
            .unwrap_or((self.rows as u32 * self.cols as u32) / 4)
    }

    pub fn food(&self) -> GridPos {
        self.food.unwrap_or(GridPos::new(
            self.rows.saturating_sub(1),
            self.cols.saturating_sub(1),
        ))
    }
}

/// Static maze description sent once after the setup is accepted.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MazeLayout {
    pub rows: u16,
    pub cols: u16,
    /// Row-major exit flags (see `EXIT_*`).
    pub cells: Vec<u8>,
    pub nest: GridPos,
    pub food: GridPos,
}

pub const EXIT_NORTH: u8 = 1;
pub const EXIT_EAST: u8 = 2;
pub const EXIT_SOUTH: u8 = 4;
pub const EXIT_WEST: u8 = 8;

impl MazeLayout {
    #[inline(always)]
    pub fn cell(&self, row: u16, col: u16) -> u8 {
        self.cells[row as usize * self.cols as usize + col as usize]
    }
}

/// State of the colony after one tick.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    pub tick: u64,
    pub food_counter: u64,
    pub positions: Vec<GridPos>,
    /// Heading codes, `DIRECTION_NONE_CODE` for none.
    pub directions: Vec<u8>,
    pub loaded: Vec<bool>,
    pub ages: Vec<u32>,
    /// Row-major pheromone levels of the maze cells, padding excluded.
    pub pheromone: Vec<f32>,
}

impl FrameUpdate {
    pub fn loaded_count(&self) -> usize {
        self.loaded.iter().filter(|&&l| l).count()
    }
}
