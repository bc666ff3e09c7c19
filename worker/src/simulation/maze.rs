use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shared::{Direction, GridPos, MazeLayout, EXIT_EAST, EXIT_NORTH, EXIT_SOUTH, EXIT_WEST};
use std::collections::VecDeque;
use thiserror::Error;

/// Open sides of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Exits {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl Exits {
    pub fn from_flags(flags: u8) -> Self {
        Self {
            north: flags & EXIT_NORTH != 0,
            east: flags & EXIT_EAST != 0,
            south: flags & EXIT_SOUTH != 0,
            west: flags & EXIT_WEST != 0,
        }
    }

    #[inline(always)]
    pub fn has(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::West => self.west,
            Direction::South => self.south,
        }
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.north as usize + self.east as usize + self.south as usize + self.west as usize
    }
}

#[inline(always)]
fn exit_flag(dir: Direction) -> u8 {
    match dir {
        Direction::North => EXIT_NORTH,
        Direction::East => EXIT_EAST,
        Direction::West => EXIT_WEST,
        Direction::South => EXIT_SOUTH,
    }
}

/// Read-only view of a maze as the colony sees it.
pub trait Maze {
    fn rows(&self) -> u16;
    fn cols(&self) -> u16;

    /// Exits of an in-bounds cell.
    fn exits(&self, pos: GridPos) -> Exits;

    fn contains(&self, pos: GridPos) -> bool {
        pos.row < self.rows() && pos.col < self.cols()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze needs at least one row and one column, got {rows}x{cols}")]
    Empty { rows: u16, cols: u16 },
    #[error("expected {expected} cells, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("cell {pos:?} opens {dir:?} through the border")]
    ExitThroughBorder { pos: GridPos, dir: Direction },
    #[error("passage from {pos:?} heading {dir:?} is walled on the other side")]
    OneSidedPassage { pos: GridPos, dir: Direction },
}

/// Rectangular maze stored as one byte of exit flags per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMaze {
    rows: u16,
    cols: u16,
    cells: Vec<u8>,
}

impl GridMaze {
    /// Carves a maze with a randomized depth-first walk, then knocks down each
    /// remaining interior wall with `braid_probability` to add loops.
    pub fn generate(
        rows: u16,
        cols: u16,
        seed: u64,
        braid_probability: f64,
    ) -> Result<Self, MazeError> {
        if rows == 0 || cols == 0 {
            return Err(MazeError::Empty { rows, cols });
        }
        let mut maze = Self {
            rows,
            cols,
            cells: vec![0; rows as usize * cols as usize],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut visited = vec![false; maze.cells.len()];
        let mut stack = vec![GridPos::new(0, 0)];
        visited[0] = true;

        while let Some(&current) = stack.last() {
            let unvisited: Vec<(Direction, GridPos)> = Direction::ALL
                .iter()
                .filter_map(|&dir| maze.neighbour(current, dir).map(|n| (dir, n)))
                .filter(|(_, n)| !visited[maze.index(*n)])
                .collect();

            if unvisited.is_empty() {
                stack.pop();
                continue;
            }

            let (dir, next) = unvisited[rng.random_range(0..unvisited.len())];
            maze.open(current, dir);
            visited[maze.index(next)] = true;
            stack.push(next);
        }

        let braid_probability = braid_probability.clamp(0.0, 1.0);
        if braid_probability > 0.0 {
            for row in 0..rows {
                for col in 0..cols {
                    let pos = GridPos::new(row, col);
                    for dir in [Direction::East, Direction::South] {
                        if maze.neighbour(pos, dir).is_some()
                            && !maze.exits(pos).has(dir)
                            && rng.random_bool(braid_probability)
                        {
                            maze.open(pos, dir);
                        }
                    }
                }
            }
        }

        Ok(maze)
    }

    /// Builds a maze from row-major exit flags, checking that passages are consistent.
    pub fn from_cells(rows: u16, cols: u16, cells: Vec<u8>) -> Result<Self, MazeError> {
        if rows == 0 || cols == 0 {
            return Err(MazeError::Empty { rows, cols });
        }
        let expected = rows as usize * cols as usize;
        if cells.len() != expected {
            return Err(MazeError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        let maze = Self { rows, cols, cells };
        for row in 0..rows {
            for col in 0..cols {
                let pos = GridPos::new(row, col);
                let exits = maze.exits(pos);
                for dir in Direction::ALL {
                    if !exits.has(dir) {
                        continue;
                    }
                    match maze.neighbour(pos, dir) {
                        None => return Err(MazeError::ExitThroughBorder { pos, dir }),
                        Some(n) if !maze.exits(n).has(dir.reverse()) => {
                            return Err(MazeError::OneSidedPassage { pos, dir });
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        Ok(maze)
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// In-bounds neighbour of `pos`, ignoring walls.
    pub fn neighbour(&self, pos: GridPos, dir: Direction) -> Option<GridPos> {
        pos.step(dir).filter(|n| self.contains(*n))
    }

    /// Cells connected to `start` through open exits, row-major.
    pub fn reachable_from(&self, start: GridPos) -> Vec<bool> {
        let mut seen = vec![false; self.cells.len()];
        if !self.contains(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen[self.index(start)] = true;
        while let Some(pos) = queue.pop_front() {
            let exits = self.exits(pos);
            for dir in Direction::ALL {
                if !exits.has(dir) {
                    continue;
                }
                if let Some(next) = self.neighbour(pos, dir) {
                    let i = self.index(next);
                    if !seen[i] {
                        seen[i] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    pub fn layout(&self, nest: GridPos, food: GridPos) -> MazeLayout {
        MazeLayout {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.clone(),
            nest,
            food,
        }
    }

    #[inline(always)]
    pub fn index(&self, pos: GridPos) -> usize {
        pos.row as usize * self.cols as usize + pos.col as usize
    }

    fn open(&mut self, pos: GridPos, dir: Direction) {
        if let Some(next) = self.neighbour(pos, dir) {
            let (a, b) = (self.index(pos), self.index(next));
            self.cells[a] |= exit_flag(dir);
            self.cells[b] |= exit_flag(dir.reverse());
        }
    }
}

impl Maze for GridMaze {
    fn rows(&self) -> u16 {
        self.rows
    }

    fn cols(&self) -> u16 {
        self.cols
    }

    #[inline(always)]
    fn exits(&self, pos: GridPos) -> Exits {
        Exits::from_flags(self.cells[self.index(pos)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage_count(maze: &GridMaze) -> usize {
        maze.cells()
            .iter()
            .map(|&c| Exits::from_flags(c).count())
            .sum::<usize>()
            / 2
    }

    #[test]
    fn test_generated_maze_is_perfect() {
        let maze = GridMaze::generate(12, 17, 12345, 0.0).unwrap();
        let reachable = maze.reachable_from(GridPos::new(0, 0));
        assert!(reachable.iter().all(|&r| r));
        // A spanning tree over n cells has n - 1 edges.
        assert_eq!(passage_count(&maze), 12 * 17 - 1);
    }

    #[test]
    fn test_generated_maze_is_consistent() {
        let maze = GridMaze::generate(9, 9, 7, 0.3).unwrap();
        let rebuilt = GridMaze::from_cells(9, 9, maze.cells().to_vec()).unwrap();
        assert_eq!(rebuilt, maze);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = GridMaze::generate(20, 20, 99, 0.1).unwrap();
        let b = GridMaze::generate(20, 20, 99, 0.1).unwrap();
        let c = GridMaze::generate(20, 20, 100, 0.1).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_full_braid_opens_every_interior_wall() {
        let maze = GridMaze::generate(5, 6, 1, 1.0).unwrap();
        let exits = maze.exits(GridPos::new(2, 3));
        assert_eq!(exits.count(), 4);
        let corner = maze.exits(GridPos::new(0, 0));
        assert!(corner.east && corner.south && !corner.north && !corner.west);
    }

    #[test]
    fn test_empty_maze_rejected() {
        assert_eq!(
            GridMaze::generate(0, 4, 1, 0.0),
            Err(MazeError::Empty { rows: 0, cols: 4 })
        );
    }

    #[test]
    fn test_from_cells_rejects_border_exit() {
        let err = GridMaze::from_cells(1, 2, vec![EXIT_EAST | EXIT_NORTH, EXIT_WEST]).unwrap_err();
        assert_eq!(
            err,
            MazeError::ExitThroughBorder {
                pos: GridPos::new(0, 0),
                dir: Direction::North
            }
        );
    }

    #[test]
    fn test_from_cells_rejects_one_sided_passage() {
        let err = GridMaze::from_cells(1, 2, vec![EXIT_EAST, 0]).unwrap_err();
        assert!(matches!(err, MazeError::OneSidedPassage { .. }));
    }

    #[test]
    fn test_from_cells_rejects_wrong_size() {
        let err = GridMaze::from_cells(2, 2, vec![0; 3]).unwrap_err();
        assert_eq!(
            err,
            MazeError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_reachable_stops_at_walls() {
        // Two corridors side by side with no link between them.
        let maze = GridMaze::from_cells(
            2,
            2,
            vec![EXIT_SOUTH, EXIT_SOUTH, EXIT_NORTH, EXIT_NORTH],
        )
        .unwrap();
        let reachable = maze.reachable_from(GridPos::new(0, 0));
        assert_eq!(reachable, vec![true, false, true, false]);
    }

    #[test]
    fn test_exits_count() {
        let exits = Exits::from_flags(EXIT_NORTH | EXIT_WEST);
        assert_eq!(exits.count(), 2);
        assert!(exits.has(Direction::West));
        assert!(!exits.has(Direction::South));
    }
}
