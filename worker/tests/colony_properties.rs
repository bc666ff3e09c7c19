//! Whole-colony properties checked over longer runs.

use ant_worker::simulation::{Colony, GridMaze, Maze, PheromoneGrid, Simulation, TickParams};
use shared::{GridPos, SimulationSetup, EXIT_EAST, EXIT_WEST};

fn setup(rows: u16, cols: u16, max_life: u32, exploration_probability: f64) -> SimulationSetup {
    SimulationSetup {
        rows,
        cols,
        max_life,
        exploration_probability,
        braid_probability: 0.1,
        ..SimulationSetup::default()
    }
}

#[test]
fn test_ages_stay_within_lifespan() {
    let mut sim = Simulation::new(&setup(15, 15, 40, 0.2)).unwrap();
    for _ in 0..600 {
        sim.step().unwrap();
        let colony = &sim.colony;
        for (ant, (&age, &life)) in colony.ages().iter().zip(colony.max_life()).enumerate() {
            assert!(age < life, "ant {} has age {} with lifespan {}", ant, age, life);
        }
    }
}

#[test]
fn test_ants_stay_in_the_nest_component() {
    let mut sim = Simulation::new(&setup(12, 18, 120, 0.1)).unwrap();
    let reachable = sim.maze.reachable_from(sim.params().nest);
    for _ in 0..400 {
        sim.step().unwrap();
        let snapshot = sim.colony.snapshot();
        for (ant, path) in snapshot.path_history.iter().enumerate() {
            for &pos in &path[..=snapshot.ages[ant] as usize] {
                assert!(sim.maze.contains(pos), "ant {} left the maze at {:?}", ant, pos);
                assert!(reachable[sim.maze.index(pos)]);
            }
        }
    }
}

#[test]
fn test_seeds_never_hit_zero() {
    let mut sim = Simulation::new(&setup(10, 10, 80, 0.5)).unwrap();
    for _ in 0..80 {
        sim.step().unwrap();
        assert!(sim.colony.seeds().iter().all(|&s| s > 0));
    }
}

#[test]
fn test_replay_is_deterministic() {
    let cfg = setup(20, 20, 150, 0.05);
    let mut a = Simulation::new(&cfg).unwrap();
    let mut b = Simulation::new(&cfg).unwrap();
    for _ in 0..300 {
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(a.colony.snapshot(), b.colony.snapshot());
    }
    assert_eq!(a.food_counter, b.food_counter);
    assert_eq!(a.frame(), b.frame());
}

#[test]
fn test_colony_finds_food_in_open_corridor() {
    // Straight corridor of 8 cells, nest at the west end, food at the east end.
    let mut cells = vec![EXIT_EAST | EXIT_WEST; 8];
    cells[0] = EXIT_EAST;
    cells[7] = EXIT_WEST;
    let maze = GridMaze::from_cells(1, 8, cells).unwrap();
    let nest = GridPos::new(0, 0);
    let food = GridPos::new(0, 7);
    let mut field = PheromoneGrid::new(1, 8, food, 0.9, 0.99);
    let mut colony = Colony::new(10, nest, 100).unwrap();
    let params = TickParams {
        nest,
        food,
        exploration_probability: 0.0,
    };

    // Seven steps out, seven back: every ant has delivered by tick 14.
    let mut food_counter = 0;
    for _ in 0..14 {
        food_counter = colony.tick(&maze, &mut field, &params, food_counter).unwrap();
        field.evaporate();
    }

    assert_eq!(food_counter, 10);
    assert_eq!(colony.loaded_count(), 0);
    assert!(colony.ages().iter().all(|&a| a == 0));
    assert!(colony.positions().iter().all(|&p| p == nest));
}

#[test]
fn test_padding_keeps_edge_ants_inside() {
    let mut sim = Simulation::new(&setup(6, 30, 90, 0.0)).unwrap();
    for _ in 0..300 {
        sim.step().unwrap();
        for pos in sim.colony.positions() {
            assert!(pos.row < 6 && pos.col < 30);
        }
    }
}
