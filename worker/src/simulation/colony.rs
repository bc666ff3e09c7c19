use super::maze::{Exits, Maze};
use super::pheromone::PheromoneField;
use super::seed;
use rayon::prelude::*;
use shared::{Direction, GridPos};
use thiserror::Error;

/// Broken preconditions of a tick. A tick that returns one of these has
/// not touched the colony.
#[derive(Debug, Error, PartialEq)]
pub enum ColonyError {
    #[error("maximum life must be at least one tick")]
    ZeroLifespan,
    #[error("{what} {pos:?} lies outside the {rows}x{cols} maze")]
    OutOfBounds {
        what: &'static str,
        pos: GridPos,
        rows: u16,
        cols: u16,
    },
    #[error("pheromone field covers {field:?} but the maze is {maze:?}")]
    ShapeMismatch { maze: (u16, u16), field: (u16, u16) },
    #[error("exploration probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("ant {ant} has age {age} outside its lifespan {max_life} (loaded: {loaded})")]
    CorruptAge {
        ant: usize,
        age: u32,
        max_life: u32,
        loaded: bool,
    },
    #[error("ant {ant} has seed {seed} outside the recurrence range")]
    DegenerateSeed { ant: usize, seed: u64 },
    #[error("nest and food share cell {0:?}")]
    NestOnFood(GridPos),
    #[error("cell {pos:?} of ant {ant} opens {dir:?} out of the maze")]
    ExitOutOfBounds {
        ant: usize,
        pos: GridPos,
        dir: Direction,
    },
    #[error("ant {ant} at {pos:?} is walled in")]
    NoExit { ant: usize, pos: GridPos },
    #[error("ant {ant} following the trail from {from:?} would leave the maze")]
    StrayMove { ant: usize, from: GridPos },
}

/// Per-tick inputs that are not part of the colony state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickParams {
    pub nest: GridPos,
    pub food: GridPos,
    pub exploration_probability: f64,
}

/// Owned copy of the state the display needs, taken between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct ColonySnapshot {
    pub directions: Vec<Option<Direction>>,
    pub path_history: Vec<Vec<GridPos>>,
    pub ages: Vec<u32>,
}

impl ColonySnapshot {
    pub fn position(&self, ant: usize) -> GridPos {
        self.path_history[ant][self.ages[ant] as usize]
    }
}

/// What an unloaded ant perceives from its current cell.
#[derive(Debug, Clone, Copy)]
struct Sense {
    exits: Exits,
    /// Neighbour levels by direction code, 0 behind closed exits.
    levels: [f64; 4],
    max: f64,
}

#[derive(Debug, Clone, Copy)]
struct Move {
    ant: usize,
    to: GridPos,
    /// Set for exploring ants only; following ants keep their last heading.
    heading: Option<Direction>,
}

/// Every decision of the explore/follow pass, computed without touching the colony.
struct MovePlan {
    seeds: Vec<u64>,
    moves: Vec<Move>,
}

/// All ants of the colony as parallel arrays indexed by ant id.
///
/// Ants are never created or destroyed after construction: death resets an
/// ant to the nest. `path_history[i][ages[i]]` is the current cell of ant `i`,
/// so a loaded ant walks home by decrementing its age.
#[derive(Debug, Clone)]
pub struct Colony {
    seeds: Vec<u64>,
    is_loaded: Vec<bool>,
    ages: Vec<u32>,
    max_life: Vec<u32>,
    directions: Vec<Option<Direction>>,
    /// Capacity `max_life[i] + 1` per ant.
    path_history: Vec<Box<[GridPos]>>,
}

impl Colony {
    /// Places `population` ants on the nest. Ant `i` starts from seed `i + 1`
    /// advanced once, and lives 75% to 100% of `max_life` ticks.
    pub fn new(population: usize, nest: GridPos, max_life: u32) -> Result<Self, ColonyError> {
        if max_life == 0 {
            return Err(ColonyError::ZeroLifespan);
        }

        let seeds: Vec<u64> = (1..=population as u64).map(seed::advance).collect();
        let lifespans: Vec<u32> = seeds
            .iter()
            .map(|&s| seed::life_from_seed(max_life, s))
            .collect();
        let path_history = lifespans
            .iter()
            .map(|&life| {
                let mut path = vec![GridPos::default(); life as usize + 1].into_boxed_slice();
                path[0] = nest;
                path
            })
            .collect();

        Ok(Self {
            seeds,
            is_loaded: vec![false; population],
            ages: vec![0; population],
            max_life: lifespans,
            directions: vec![None; population],
            path_history,
        })
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    pub fn ages(&self) -> &[u32] {
        &self.ages
    }

    pub fn max_life(&self) -> &[u32] {
        &self.max_life
    }

    pub fn is_loaded(&self) -> &[bool] {
        &self.is_loaded
    }

    pub fn directions(&self) -> &[Option<Direction>] {
        &self.directions
    }

    pub fn loaded_count(&self) -> usize {
        self.is_loaded.iter().filter(|&&l| l).count()
    }

    #[inline(always)]
    pub fn position(&self, ant: usize) -> GridPos {
        self.path_history[ant][self.ages[ant] as usize]
    }

    pub fn positions(&self) -> Vec<GridPos> {
        (0..self.len()).map(|i| self.position(i)).collect()
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            directions: self.directions.clone(),
            path_history: self.path_history.iter().map(|p| p.to_vec()).collect(),
            ages: self.ages.clone(),
        }
    }

    /// Advances every ant by one tick and lays pheromone on the cells they end
    /// on. Returns `food_counter` plus the ants that dropped food at the nest.
    pub fn tick<M, P>(
        &mut self,
        maze: &M,
        field: &mut P,
        params: &TickParams,
        food_counter: u64,
    ) -> Result<u64, ColonyError>
    where
        M: Maze + Sync,
        P: PheromoneField + Sync,
    {
        self.check_preconditions(maze, &*field, params)?;

        let (loaded, unloaded): (Vec<usize>, Vec<usize>) =
            (0..self.len()).partition(|&i| self.is_loaded[i]);

        let plan = self.plan_moves(maze, &*field, params, &unloaded)?;

        let food_counter = self.return_to_nest(&loaded, params.nest, food_counter);
        self.apply_moves(plan, &unloaded, params);

        for ant in 0..self.len() {
            let pos = self.position(ant);
            field.deposit(pos, maze.exits(pos));
        }

        Ok(food_counter)
    }

    fn check_preconditions<M: Maze, P: PheromoneField>(
        &self,
        maze: &M,
        field: &P,
        params: &TickParams,
    ) -> Result<(), ColonyError> {
        let (rows, cols) = (maze.rows(), maze.cols());
        if field.shape() != (rows, cols) {
            return Err(ColonyError::ShapeMismatch {
                maze: (rows, cols),
                field: field.shape(),
            });
        }
        if !(0.0..=1.0).contains(&params.exploration_probability) {
            return Err(ColonyError::InvalidProbability(
                params.exploration_probability,
            ));
        }

        let in_maze = |what: &'static str, pos: GridPos| {
            if maze.contains(pos) {
                Ok(())
            } else {
                Err(ColonyError::OutOfBounds {
                    what,
                    pos,
                    rows,
                    cols,
                })
            }
        };
        in_maze("nest", params.nest)?;
        in_maze("food", params.food)?;
        // A reset ant would be picked up again on the same tick.
        if params.nest == params.food {
            return Err(ColonyError::NestOnFood(params.food));
        }

        for ant in 0..self.len() {
            let (age, max_life, loaded) = (self.ages[ant], self.max_life[ant], self.is_loaded[ant]);
            // Loaded ants step back before reading their path, unloaded ones write one ahead.
            let age_ok = if loaded { age > 0 } else { age < max_life };
            if !age_ok {
                return Err(ColonyError::CorruptAge {
                    ant,
                    age,
                    max_life,
                    loaded,
                });
            }
            let seed = self.seeds[ant];
            if seed == 0 || seed >= seed::SEED_MODULUS {
                return Err(ColonyError::DegenerateSeed { ant, seed });
            }
            in_maze("ant", self.position(ant))?;
        }
        Ok(())
    }

    /// Loaded ants retrace their path one step; those back on the nest drop their food.
    fn return_to_nest(&mut self, loaded: &[usize], nest: GridPos, food_counter: u64) -> u64 {
        for &ant in loaded {
            self.ages[ant] -= 1;
        }
        let arrived: Vec<usize> = loaded
            .iter()
            .copied()
            .filter(|&ant| self.position(ant) == nest)
            .collect();
        for &ant in &arrived {
            self.is_loaded[ant] = false;
            self.ages[ant] = 0;
        }
        food_counter + arrived.len() as u64
    }

    fn sense<M: Maze, P: PheromoneField>(&self, ant: usize, maze: &M, field: &P) -> Sense {
        let pos = self.position(ant);
        let exits = maze.exits(pos);
        let mut levels = [0.0; 4];
        for dir in Direction::ALL {
            if exits.has(dir) {
                let (d_row, d_col) = dir.offset();
                levels[dir as usize] =
                    field.level(pos.row as i32 + d_row as i32, pos.col as i32 + d_col as i32);
            }
        }
        let max = levels.iter().copied().fold(0.0, f64::max);
        Sense { exits, levels, max }
    }

    fn plan_moves<M, P>(
        &self,
        maze: &M,
        field: &P,
        params: &TickParams,
        unloaded: &[usize],
    ) -> Result<MovePlan, ColonyError>
    where
        M: Maze + Sync,
        P: PheromoneField + Sync,
    {
        // Every seed moves, loaded or not, so an ant's draws do not depend on its load history.
        let mut seeds: Vec<u64> = self.seeds.iter().map(|&s| seed::advance(s)).collect();

        let senses: Vec<Sense> = unloaded
            .par_iter()
            .map(|&ant| self.sense(ant, maze, field))
            .collect();

        let mut moves = Vec::with_capacity(unloaded.len());
        let mut exploring = Vec::new();
        for (&ant, sense) in unloaded.iter().zip(&senses) {
            let choice = seed::unit(seeds[ant]);
            if choice <= params.exploration_probability || sense.max == 0.0 {
                exploring.push((ant, sense.exits));
            } else {
                moves.push(self.follow(ant, sense, maze)?);
            }
        }

        moves.extend(self.explore(maze, &mut seeds, exploring)?);
        Ok(MovePlan { seeds, moves })
    }

    /// Steps toward every neighbour holding the maximum level at once, so a
    /// two-way tie moves diagonally and an opposite tie stays put.
    fn follow<M: Maze>(&self, ant: usize, sense: &Sense, maze: &M) -> Result<Move, ColonyError> {
        let from = self.position(ant);
        let (mut d_row, mut d_col) = (0i16, 0i16);
        for dir in Direction::ALL {
            if sense.levels[dir as usize] == sense.max {
                let (r, c) = dir.offset();
                d_row += r;
                d_col += c;
            }
        }
        let to = from
            .offset_by(d_row, d_col)
            .filter(|p| maze.contains(*p))
            .ok_or(ColonyError::StrayMove { ant, from })?;
        Ok(Move {
            ant,
            to,
            heading: None,
        })
    }

    /// Draws random headings until every exploring ant has a legal one. Only
    /// ants still without a move draw again.
    fn explore<M: Maze>(
        &self,
        maze: &M,
        seeds: &mut [u64],
        exploring: Vec<(usize, Exits)>,
    ) -> Result<Vec<Move>, ColonyError> {
        if let Some(&(ant, _)) = exploring.iter().find(|(_, exits)| exits.count() == 0) {
            return Err(ColonyError::NoExit {
                ant,
                pos: self.position(ant),
            });
        }
        // Every open exit must lead somewhere, or the draws below never settle.
        for &(ant, exits) in &exploring {
            let pos = self.position(ant);
            let leak = Direction::ALL.into_iter().find(|&dir| {
                exits.has(dir) && !pos.step(dir).is_some_and(|p| maze.contains(p))
            });
            if let Some(dir) = leak {
                return Err(ColonyError::ExitOutOfBounds { ant, pos, dir });
            }
        }

        let mut moves = Vec::with_capacity(exploring.len());
        let mut pending = exploring;
        let mut rounds = 0u32;
        while !pending.is_empty() {
            rounds += 1;
            pending.retain(|&(ant, exits)| {
                seeds[ant] = seed::advance(seeds[ant]);
                let dir = seed::direction_from_seed(seeds[ant]);
                let from = self.position(ant);
                // Backing out is only allowed from a dead end.
                let reversing = self.directions[ant] == Some(dir.reverse());
                let legal = exits.has(dir) && (!reversing || exits.count() == 1);
                let to = if legal {
                    from.step(dir).filter(|p| maze.contains(*p))
                } else {
                    None
                };
                match to {
                    Some(to) if to != from => {
                        moves.push(Move {
                            ant,
                            to,
                            heading: Some(dir),
                        });
                        false
                    }
                    _ => true,
                }
            });
        }
        log::trace!(
            "{} exploring ants resolved in {} rounds",
            moves.len(),
            rounds
        );
        Ok(moves)
    }

    fn apply_moves(&mut self, plan: MovePlan, unloaded: &[usize], params: &TickParams) {
        self.seeds = plan.seeds;
        for mv in plan.moves {
            let next = self.ages[mv.ant] as usize + 1;
            self.path_history[mv.ant][next] = mv.to;
            if mv.heading.is_some() {
                self.directions[mv.ant] = mv.heading;
            }
        }

        for &ant in unloaded {
            self.ages[ant] += 1;
        }

        for ant in 0..self.len() {
            if self.ages[ant] == self.max_life[ant] {
                self.ages[ant] = 0;
                self.path_history[ant][0] = params.nest;
                self.directions[ant] = None;
            }
        }

        for &ant in unloaded {
            if self.position(ant) == params.food {
                self.is_loaded[ant] = true;
            }
        }
    }
}
