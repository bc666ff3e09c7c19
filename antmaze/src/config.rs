use anyhow::{Context, Result};
use macroquad::prelude::Conf;
use serde::Deserialize;
use shared::SimulationSetup;
use std::path::{Path, PathBuf};

// Window constants
pub const DEFAULT_WINDOW_WIDTH: f32 = 1280.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 960.0;

pub const DEFAULT_SOCKET_DIR: &str = "/tmp/antmaze";
pub const DEFAULT_FIRST_FOOD_SCREENSHOT: &str = "MyFirstFood.png";
const WORKER_BINARY: &str = "ant_worker";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Forwarded to the worker as-is.
    pub simulation: SimulationSetup,
    pub worker_path: Option<PathBuf>,
    pub socket_dir: PathBuf,
    /// Saved once, on the first frame with a non-zero food counter.
    pub first_food_screenshot: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSetup::default(),
            worker_path: None,
            socket_dir: PathBuf::from(DEFAULT_SOCKET_DIR),
            first_food_screenshot: PathBuf::from(DEFAULT_FIRST_FOOD_SCREENSHOT),
        }
    }
}

impl DisplayConfig {
    /// Explicit `worker_path`, otherwise `ant_worker` next to this executable.
    pub fn resolve_worker_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.worker_path {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe().context("cannot locate the display executable")?;
        let dir = exe
            .parent()
            .context("display executable has no parent directory")?;
        Ok(dir.join(WORKER_BINARY))
    }
}

/// Loads the display configuration from a TOML file or uses defaults.
pub fn load_config(path: Option<&Path>) -> Result<DisplayConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            let config: DisplayConfig =
                toml::from_str(&content).context("failed to parse config file")?;
            log::info!("Loaded config from '{}'", path.display());
            log::debug!("Config: {:?}", config);
            Ok(config)
        }
        None => {
            log::info!("No config file provided, using defaults.");
            Ok(DisplayConfig::default())
        }
    }
}

pub fn window_conf() -> Conf {
    Conf {
        window_title: "Ant Maze".to_owned(),
        window_width: DEFAULT_WINDOW_WIDTH as i32,
        window_height: DEFAULT_WINDOW_HEIGHT as i32,
        high_dpi: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: DisplayConfig = toml::from_str(
            r#"
            worker_path = "target/release/ant_worker"

            [simulation]
            rows = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.rows, 40);
        assert_eq!(config.simulation.cols, 25);
        assert_eq!(config.socket_dir, PathBuf::from(DEFAULT_SOCKET_DIR));
        assert_eq!(
            config.resolve_worker_path().unwrap(),
            PathBuf::from("target/release/ant_worker")
        );
    }

    #[test]
    fn test_default_worker_sits_next_to_executable() {
        let path = DisplayConfig::default().resolve_worker_path().unwrap();
        assert!(path.ends_with(WORKER_BINARY));
    }
}
