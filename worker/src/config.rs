use serde::Deserialize;
use shared::{GridPos, SimulationSetup};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::simulation::{ColonyError, MazeError};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("population must be at least 1")]
    EmptyColony,
    #[error("{name} = {value} is outside [0, 1]")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("{what} {pos:?} is outside the {rows}x{cols} maze")]
    OutOfMaze {
        what: &'static str,
        pos: GridPos,
        rows: u16,
        cols: u16,
    },
    #[error("nest and food share cell {0:?}")]
    NestOnFood(GridPos),
    #[error("food {food:?} cannot be reached from the nest {nest:?}")]
    FoodUnreachable { nest: GridPos, food: GridPos },
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error(transparent)]
    Colony(#[from] ColonyError),
}

/// Layout of the TOML file shared with the display; other tables are ignored here.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    simulation: SimulationSetup,
}

/// Reads the `[simulation]` table of a TOML file, or the defaults without one.
pub fn load_setup(path: Option<&Path>) -> Result<SimulationSetup, SetupError> {
    let Some(path) = path else {
        log::info!("No config file provided, using defaults.");
        return Ok(SimulationSetup::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| SetupError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let setup = parse_setup(&content)?;
    log::info!("Loaded config from '{}'", path.display());
    log::debug!("Setup: {:?}", setup);
    Ok(setup)
}

pub fn parse_setup(content: &str) -> Result<SimulationSetup, SetupError> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(file.simulation)
}

/// Checks everything about a setup that can be known before building the maze.
pub fn validate_setup(setup: &SimulationSetup) -> Result<(), SetupError> {
    if setup.rows == 0 || setup.cols == 0 {
        return Err(MazeError::Empty {
            rows: setup.rows,
            cols: setup.cols,
        }
        .into());
    }
    if setup.population() == 0 {
        return Err(SetupError::EmptyColony);
    }
    if setup.max_life == 0 {
        return Err(ColonyError::ZeroLifespan.into());
    }

    for (name, value) in [
        ("braid_probability", setup.braid_probability),
        ("exploration_probability", setup.exploration_probability),
        ("alpha", setup.alpha),
        ("beta", setup.beta),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SetupError::OutOfUnitRange { name, value });
        }
    }

    let food = setup.food();
    for (what, pos) in [("nest", setup.nest), ("food", food)] {
        if pos.row >= setup.rows || pos.col >= setup.cols {
            return Err(SetupError::OutOfMaze {
                what,
                pos,
                rows: setup.rows,
                cols: setup.cols,
            });
        }
    }
    if setup.nest == food {
        return Err(SetupError::NestOnFood(food));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_setup(&SimulationSetup::default()).is_ok());
    }

    #[test]
    fn test_parse_partial_table() {
        let setup = parse_setup(
            r#"
            worker_path = "ignored by the worker"

            [simulation]
            rows = 10
            cols = 12
            exploration_probability = 0.1
            food = { row = 9, col = 0 }
            "#,
        )
        .unwrap();
        assert_eq!(setup.rows, 10);
        assert_eq!(setup.cols, 12);
        assert_eq!(setup.population(), 30);
        assert_eq!(setup.food(), GridPos::new(9, 0));
        assert_eq!(setup.max_life, 500);
        assert_eq!(setup.exploration_probability, 0.1);
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(parse_setup("").unwrap(), SimulationSetup::default());
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(matches!(
            parse_setup("[simulation]\nrows = \"many\""),
            Err(SetupError::Parse(_))
        ));
    }

    #[test]
    fn test_nest_on_food_rejected() {
        let setup = SimulationSetup {
            food: Some(GridPos::new(0, 0)),
            ..SimulationSetup::default()
        };
        assert!(matches!(
            validate_setup(&setup),
            Err(SetupError::NestOnFood(_))
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let setup = SimulationSetup {
            beta: 1.5,
            ..SimulationSetup::default()
        };
        assert!(matches!(
            validate_setup(&setup),
            Err(SetupError::OutOfUnitRange { name: "beta", .. })
        ));

        let setup = SimulationSetup {
            nest: GridPos::new(30, 0),
            ..SimulationSetup::default()
        };
        assert!(matches!(
            validate_setup(&setup),
            Err(SetupError::OutOfMaze { what: "nest", .. })
        ));

        let setup = SimulationSetup {
            population: Some(0),
            ..SimulationSetup::default()
        };
        assert!(matches!(validate_setup(&setup), Err(SetupError::EmptyColony)));

        let setup = SimulationSetup {
            max_life: 0,
            ..SimulationSetup::default()
        };
        assert!(matches!(
            validate_setup(&setup),
            Err(SetupError::Colony(ColonyError::ZeroLifespan))
        ));
    }

    #[test]
    fn test_missing_file_reported() {
        let err = load_setup(Some(Path::new("/nonexistent/antmaze.toml"))).unwrap_err();
        assert!(matches!(err, SetupError::Read { .. }));
    }
}
