use ant_worker::config::load_setup;
use ant_worker::server;
use ant_worker::simulation::{Simulation, DEFAULT_REPORT_INTERVAL};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

/// Command-line arguments for the simulation worker.
#[derive(Parser)]
#[command(name = "ant_worker", version, about = "Ant colony simulation worker")]
struct Cli {
    /// Unix socket to serve the display on.
    #[arg(short, long, required_unless_present = "headless")]
    socket: Option<PathBuf>,

    /// Run without a display for a fixed number of ticks.
    #[arg(long, conflicts_with = "socket")]
    headless: bool,

    /// Number of ticks in headless mode.
    #[arg(short, long, default_value_t = 5000)]
    ticks: u64,

    /// Path to the TOML configuration file (headless mode).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticks between progress lines in headless mode, 0 to disable.
    #[arg(long, default_value_t = DEFAULT_REPORT_INTERVAL)]
    report_every: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.socket {
        Some(socket) if !cli.headless => {
            let ticks = server::serve(&socket)?;
            log::info!("Worker exiting after {} ticks.", ticks);
            Ok(())
        }
        _ => run_headless(cli.config, cli.ticks, cli.report_every),
    }
}

fn run_headless(config: Option<PathBuf>, ticks: u64, report_every: u64) -> Result<()> {
    let setup = load_setup(config.as_deref())?;
    let mut sim = Simulation::new(&setup)?;

    let start = Instant::now();
    for _ in 0..ticks {
        sim.step()?;
        if report_every > 0 && sim.tick % report_every == 0 {
            log::info!("{}", sim.summary());
        }
    }
    let elapsed = start.elapsed();

    log::info!("=== Simulation Complete ===");
    log::info!("{}", sim.summary());
    match sim.first_food_tick() {
        Some(tick) => log::info!("First food at tick {}", tick),
        None => log::warn!("No food reached the nest in {} ticks", ticks),
    }
    log::info!(
        "Elapsed {:.2}s, {:.0} ticks/s",
        elapsed.as_secs_f64(),
        sim.tick as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}
