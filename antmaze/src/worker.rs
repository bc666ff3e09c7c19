use anyhow::{Context, Result, anyhow, bail};
use rkyv::{from_bytes, rancor::Error, to_bytes};
use shared::util::{recv_frame, send_frame};
use shared::{FrameUpdate, MazeLayout, SimulationSetup};
use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;

const CONNECT_RETRIES: u32 = 50;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// A worker process running the simulation, and the socket it streams frames on.
pub struct WorkerConnection {
    child: Child,
    stream: UnixStream,
    socket_path: PathBuf,
    pub layout: MazeLayout,
}

impl Drop for WorkerConnection {
    /// Stops the worker and removes its socket file.
    fn drop(&mut self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
        stop_child(&mut self.child);
        if self.socket_path.exists() {
            if let Err(e) = fs::remove_file(&self.socket_path) {
                log::warn!("Failed to remove socket file {:?}: {}", self.socket_path, e);
            }
        }
        log::info!("Worker stopped.");
    }
}

impl WorkerConnection {
    /// Spawns the worker, connects to its socket and exchanges setup for layout.
    pub fn start(worker_path: &Path, socket_dir: &Path, setup: &SimulationSetup) -> Result<Self> {
        fs::create_dir_all(socket_dir)
            .with_context(|| format!("failed to create socket dir {}", socket_dir.display()))?;
        let socket_path = socket_dir.join(format!("antmaze-{}.sock", std::process::id()));
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }

        log::info!(
            "Starting worker {} on {}",
            worker_path.display(),
            socket_path.display()
        );
        let mut child = Command::new(worker_path)
            .arg("--socket")
            .arg(&socket_path)
            .spawn()
            .with_context(|| format!("failed to start worker {}", worker_path.display()))?;

        let mut stream = match connect_with_retries(&mut child, &socket_path) {
            Ok(stream) => stream,
            Err(e) => {
                stop_child(&mut child);
                return Err(e);
            }
        };
        log::info!("Connected to worker.");

        let layout = match handshake(&mut stream, setup) {
            Ok(layout) => layout,
            Err(e) => {
                stop_child(&mut child);
                let _ = fs::remove_file(&socket_path);
                return Err(e);
            }
        };
        log::info!("Maze is {}x{}", layout.rows, layout.cols);

        Ok(Self {
            child,
            stream,
            socket_path,
            layout,
        })
    }

    /// Blocks until the worker sends its next frame; `None` once it has gone away.
    pub fn next_frame(&mut self) -> Result<Option<FrameUpdate>> {
        read_frame(&mut self.stream)
    }
}

fn stop_child(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Worker already gone: {}", e);
    }
    let _ = child.wait();
}

fn connect_with_retries(child: &mut Child, socket_path: &Path) -> Result<UnixStream> {
    let mut retries = CONNECT_RETRIES;
    loop {
        if let Some(status) = child.try_wait()? {
            bail!("worker exited before accepting a connection ({})", status);
        }
        match UnixStream::connect(socket_path) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                retries -= 1;
                if retries == 0 {
                    return Err(anyhow!("failed to connect to worker socket: {}", e));
                }
                log::debug!("Worker socket not ready ({}), retrying", e);
            }
        }
        thread::sleep(CONNECT_RETRY_DELAY);
    }
}

/// Sends the setup and waits for the maze the worker built from it.
pub fn handshake<S: Read + Write>(stream: &mut S, setup: &SimulationSetup) -> Result<MazeLayout> {
    send_frame(stream, &to_bytes::<Error>(setup)?)?;
    let buf = match recv_frame(stream) {
        Ok(buf) => buf,
        Err(e) if e.is_disconnect() => {
            bail!("worker rejected the setup, see its log for details")
        }
        Err(e) => return Err(e.into()),
    };
    let layout = from_bytes::<MazeLayout, Error>(&buf)
        .map_err(|e| anyhow!("invalid MazeLayout: {e}"))?;
    if layout.cells.len() != layout.rows as usize * layout.cols as usize {
        bail!(
            "layout has {} cells for a {}x{} maze",
            layout.cells.len(),
            layout.rows,
            layout.cols
        );
    }
    Ok(layout)
}

pub fn read_frame<R: Read>(stream: &mut R) -> Result<Option<FrameUpdate>> {
    let buf = match recv_frame(stream) {
        Ok(buf) => buf,
        Err(e) if e.is_disconnect() => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let frame = from_bytes::<FrameUpdate, Error>(&buf)
        .map_err(|e| anyhow!("invalid FrameUpdate: {e}"))?;
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ant_worker::server::run_session;

    fn small_setup() -> SimulationSetup {
        SimulationSetup {
            rows: 8,
            cols: 8,
            ..SimulationSetup::default()
        }
    }

    #[test]
    fn test_handshake_then_frames() {
        let (mut display, mut worker) = UnixStream::pair().unwrap();
        let handle = thread::spawn(move || run_session(&mut worker));

        let layout = handshake(&mut display, &small_setup()).unwrap();
        assert_eq!((layout.rows, layout.cols), (8, 8));
        assert_eq!(layout.food, shared::GridPos::new(7, 7));

        for expected in 0..3 {
            let frame = read_frame(&mut display).unwrap().unwrap();
            assert_eq!(frame.tick, expected);
            assert_eq!(frame.positions.len(), 16);
            assert_eq!(frame.pheromone.len(), 64);
        }

        drop(display);
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_rejected_setup_reported() {
        let (mut display, mut worker) = UnixStream::pair().unwrap();
        let handle = thread::spawn(move || run_session(&mut worker));

        let setup = SimulationSetup {
            max_life: 0,
            ..small_setup()
        };
        let err = handshake(&mut display, &setup).unwrap_err();
        assert!(err.to_string().contains("rejected"));
        assert!(handle.join().unwrap().is_err());
    }

    #[test]
    fn test_closed_stream_ends_frames() {
        let (mut display, worker) = UnixStream::pair().unwrap();
        drop(worker);
        assert!(read_frame(&mut display).unwrap().is_none());
    }
}
