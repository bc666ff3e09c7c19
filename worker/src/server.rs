use anyhow::{anyhow, Context, Result};
use rkyv::{from_bytes, rancor::Error, to_bytes};
use shared::util::{recv_frame, send_frame};
use shared::SimulationSetup;
use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::Path;

use crate::simulation::Simulation;

/// Binds `socket_path`, waits for the display and streams frames until it hangs up.
pub fn serve(socket_path: &Path) -> Result<u64> {
    if socket_path.exists() {
        fs::remove_file(socket_path)
            .with_context(|| format!("failed to remove stale socket {}", socket_path.display()))?;
    }
    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("failed to bind {}", socket_path.display()))?;
    log::info!("Waiting for display on {}...", socket_path.display());

    let (mut stream, _) = listener.accept().context("failed to accept display")?;
    log::info!("Display connected.");

    let outcome = run_session(&mut stream);
    if let Err(e) = fs::remove_file(socket_path) {
        log::warn!("Failed to remove socket {}: {}", socket_path.display(), e);
    }
    outcome
}

/// Setup in, layout out, then one frame per tick. Returns the last tick
/// reached once the peer disconnects.
pub fn run_session<S: Read + Write>(stream: &mut S) -> Result<u64> {
    let buf = recv_frame(stream).context("no setup received")?;
    let setup = from_bytes::<SimulationSetup, Error>(&buf)
        .map_err(|e| anyhow!("invalid SimulationSetup: {e}"))?;
    log::debug!("Received setup: {:?}", setup);

    let mut sim = Simulation::new(&setup).context("setup rejected")?;
    send_frame(stream, &to_bytes::<Error>(&sim.layout())?)?;

    loop {
        let bytes = to_bytes::<Error>(&sim.frame())?;
        match send_frame(stream, &bytes) {
            Ok(()) => {}
            Err(e) if e.is_disconnect() => {
                log::info!("Display left at tick {}.", sim.tick);
                break;
            }
            Err(e) => return Err(e.into()),
        }
        sim.step()?;
    }
    Ok(sim.tick)
}
