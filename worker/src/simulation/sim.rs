use shared::{direction_code, FrameUpdate, MazeLayout, SimulationSetup};

use crate::config::{validate_setup, SetupError};

use super::{Colony, ColonyError, GridMaze, PheromoneGrid, TickParams};

/// A running maze: the colony plus the maze and pheromone field it lives in.
pub struct Simulation {
    pub tick: u64,
    pub food_counter: u64,
    pub maze: GridMaze,
    pub pheromones: PheromoneGrid,
    pub colony: Colony,
    params: TickParams,
    first_food_tick: Option<u64>,
}

impl Simulation {
    pub fn new(setup: &SimulationSetup) -> Result<Self, SetupError> {
        validate_setup(setup)?;
        let maze = GridMaze::generate(
            setup.rows,
            setup.cols,
            setup.maze_seed,
            setup.braid_probability,
        )?;

        let params = TickParams {
            nest: setup.nest,
            food: setup.food(),
            exploration_probability: setup.exploration_probability,
        };
        if !maze.reachable_from(params.nest)[maze.index(params.food)] {
            return Err(SetupError::FoodUnreachable {
                nest: params.nest,
                food: params.food,
            });
        }

        let pheromones =
            PheromoneGrid::new(setup.rows, setup.cols, params.food, setup.alpha, setup.beta);
        let colony = Colony::new(setup.population() as usize, params.nest, setup.max_life)?;

        log::info!(
            "Simulation ready: {}x{} maze (seed {}), {} ants, max life {}, nest {:?}, food {:?}",
            setup.rows,
            setup.cols,
            setup.maze_seed,
            colony.len(),
            setup.max_life,
            params.nest,
            params.food
        );

        Ok(Self {
            tick: 0,
            food_counter: 0,
            maze,
            pheromones,
            colony,
            params,
            first_food_tick: None,
        })
    }

    pub fn params(&self) -> &TickParams {
        &self.params
    }

    pub fn first_food_tick(&self) -> Option<u64> {
        self.first_food_tick
    }

    /// Moves the colony one tick, then lets the trails evaporate.
    pub fn step(&mut self) -> Result<(), ColonyError> {
        self.food_counter = self.colony.tick(
            &self.maze,
            &mut self.pheromones,
            &self.params,
            self.food_counter,
        )?;
        self.pheromones.evaporate();
        self.tick += 1;

        if self.first_food_tick.is_none() && self.food_counter > 0 {
            self.first_food_tick = Some(self.tick);
            log::info!("First food reached the nest at tick {}", self.tick);
        }
        Ok(())
    }

    pub fn run(&mut self, ticks: u64) -> Result<(), ColonyError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    pub fn layout(&self) -> MazeLayout {
        self.maze.layout(self.params.nest, self.params.food)
    }

    pub fn frame(&self) -> FrameUpdate {
        FrameUpdate {
            tick: self.tick,
            food_counter: self.food_counter,
            positions: self.colony.positions(),
            directions: self
                .colony
                .directions()
                .iter()
                .map(|&d| direction_code(d))
                .collect(),
            loaded: self.colony.is_loaded().to_vec(),
            ages: self.colony.ages().to_vec(),
            pheromone: self.pheromones.interior(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "tick {:>7} | food {:>6} | loaded {:>5}/{} | peak trail {:.3}",
            self.tick,
            self.food_counter,
            self.colony.loaded_count(),
            self.colony.len(),
            self.pheromones.max_level()
        )
    }
}
