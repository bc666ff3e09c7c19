use super::maze::Exits;
use shared::GridPos;

/// Trail strengths the colony senses and marks.
pub trait PheromoneField {
    /// (rows, cols) of the maze the field covers, padding excluded.
    fn shape(&self) -> (u16, u16);

    /// Level at a cell in maze coordinates. Accepts one cell of padding on
    /// every side (`-1..=rows`, `-1..=cols`); padding always reads 0.
    fn level(&self, row: i32, col: i32) -> f64;

    /// Marks `pos`, weighting the deposit by the cell's open exits.
    fn deposit(&mut self, pos: GridPos, exits: Exits);
}

/// Pheromone map with a ring of padding cells around the maze.
#[derive(Debug, Clone)]
pub struct PheromoneGrid {
    rows: u16,
    cols: u16,
    /// `(rows + 2) x (cols + 2)`, row-major.
    data: Vec<f64>,
    food: GridPos,
    alpha: f64,
    beta: f64,
}

impl PheromoneGrid {
    pub fn new(rows: u16, cols: u16, food: GridPos, alpha: f64, beta: f64) -> Self {
        let padded = (rows as usize + 2) * (cols as usize + 2);
        let mut grid = Self {
            rows,
            cols,
            data: vec![0.0; padded],
            food,
            alpha,
            beta,
        };
        grid.set_level(food, 1.0);
        grid
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    #[inline(always)]
    fn padded_index(&self, row: i32, col: i32) -> usize {
        (row + 1) as usize * (self.cols as usize + 2) + (col + 1) as usize
    }

    /// Overwrites the level of an in-maze cell.
    pub fn set_level(&mut self, pos: GridPos, value: f64) {
        let i = self.padded_index(pos.row as i32, pos.col as i32);
        self.data[i] = value;
    }

    /// Scales every cell by `beta`; the food cell is kept at full strength.
    pub fn evaporate(&mut self) {
        let beta = self.beta;
        self.data.iter_mut().for_each(|v| *v *= beta);
        self.set_level(self.food, 1.0);
    }

    /// Row-major copy of the maze cells, padding excluded.
    pub fn interior(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.rows as usize * self.cols as usize);
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                out.push(self.data[self.padded_index(row, col)] as f32);
            }
        }
        out
    }

    /// Largest level over the maze cells.
    pub fn max_level(&self) -> f64 {
        let mut max = 0.0f64;
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                max = max.max(self.data[self.padded_index(row, col)]);
            }
        }
        max
    }
}

impl PheromoneField for PheromoneGrid {
    fn shape(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    #[inline(always)]
    fn level(&self, row: i32, col: i32) -> f64 {
        debug_assert!(row >= -1 && row <= self.rows as i32);
        debug_assert!(col >= -1 && col <= self.cols as i32);
        self.data[self.padded_index(row, col)]
    }

    fn deposit(&mut self, pos: GridPos, exits: Exits) {
        let (row, col) = (pos.row as i32, pos.col as i32);
        let read = |open: bool, r: i32, c: i32| {
            if open {
                self.level(r, c).max(0.0)
            } else {
                0.0
            }
        };
        let neighbours = [
            read(exits.west, row, col - 1),
            read(exits.east, row, col + 1),
            read(exits.south, row + 1, col),
            read(exits.north, row - 1, col),
        ];
        let max = neighbours.iter().copied().fold(0.0, f64::max);
        let sum: f64 = neighbours.iter().sum();
        let value = self.alpha * max + (1.0 - self.alpha) * 0.25 * sum;
        self.set_level(pos, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_open() -> Exits {
        Exits {
            north: true,
            east: true,
            south: true,
            west: true,
        }
    }

    #[test]
    fn test_new_marks_only_food() {
        let grid = PheromoneGrid::new(3, 4, GridPos::new(2, 3), 0.9, 0.99);
        assert_eq!(grid.level(2, 3), 1.0);
        assert_eq!(grid.interior().iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_padding_reads_zero() {
        let mut grid = PheromoneGrid::new(2, 2, GridPos::new(1, 1), 0.9, 0.99);
        for row in 0..2 {
            for col in 0..2 {
                grid.set_level(GridPos::new(row, col), 5.0);
            }
        }
        for i in -1..=2 {
            assert_eq!(grid.level(-1, i), 0.0);
            assert_eq!(grid.level(2, i), 0.0);
            assert_eq!(grid.level(i, -1), 0.0);
            assert_eq!(grid.level(i, 2), 0.0);
        }
    }

    #[test]
    fn test_deposit_blends_max_and_mean() {
        let mut grid = PheromoneGrid::new(3, 3, GridPos::new(0, 0), 0.9, 0.99);
        grid.set_level(GridPos::new(0, 1), 0.0);
        grid.set_level(GridPos::new(1, 2), 0.4);
        grid.set_level(GridPos::new(2, 1), 0.2);
        grid.set_level(GridPos::new(1, 0), 0.2);
        grid.deposit(GridPos::new(1, 1), all_open());
        let expected = 0.9 * 0.4 + 0.1 * 0.25 * (0.4 + 0.2 + 0.2);
        assert!((grid.level(1, 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_deposit_ignores_closed_exits() {
        let mut grid = PheromoneGrid::new(3, 3, GridPos::new(1, 2), 0.9, 0.99);
        let walled_east = Exits {
            east: false,
            ..all_open()
        };
        grid.deposit(GridPos::new(1, 1), walled_east);
        assert_eq!(grid.level(1, 1), 0.0);
    }

    #[test]
    fn test_evaporation_keeps_food_at_full_strength() {
        let mut grid = PheromoneGrid::new(2, 2, GridPos::new(1, 1), 0.9, 0.5);
        grid.set_level(GridPos::new(0, 0), 0.8);
        grid.evaporate();
        assert!((grid.level(0, 0) - 0.4).abs() < 1e-12);
        assert_eq!(grid.level(1, 1), 1.0);
        assert_eq!(grid.max_level(), 1.0);
    }

    #[test]
    fn test_max_level_skips_padding() {
        let mut grid = PheromoneGrid::new(2, 2, GridPos::new(1, 1), 0.9, 0.99);
        grid.set_level(GridPos::new(1, 1), 0.3);
        grid.set_level(GridPos::new(0, 1), 0.6);
        let corner = grid.padded_index(-1, -1);
        grid.data[corner] = 9.0;
        assert_eq!(grid.max_level(), 0.6);
    }
}
