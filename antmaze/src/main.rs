mod app;
mod config;
mod engine;
mod ui;
mod worker;

use std::path::PathBuf;

use app::AntMazeApp;
use clap::Parser;
use config::{load_config, window_conf};

/// Command-line arguments for the maze display.
#[derive(Parser)]
#[command(name = "antmaze", version, about = "Ant colony foraging in a maze")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker binary, overriding `worker_path` from the config.
    #[arg(short, long)]
    worker: Option<PathBuf>,
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Error loading config: {:#}", e);
            return;
        }
    };
    if let Some(worker) = cli.worker {
        config.worker_path = Some(worker);
    }

    match AntMazeApp::new(&config) {
        Ok(mut app) => app.run().await,
        Err(e) => log::error!("Failed to start: {:#}", e),
    }
}
