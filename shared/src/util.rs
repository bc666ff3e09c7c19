use rkyv::util::AlignedVec;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Largest message either side accepts.
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Failure while moving a length-prefixed message over a stream.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("peer sent oversized frame ({0} bytes)")]
    Oversized(usize),
}

impl FrameError {
    /// True when the peer hung up between messages.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, FrameError::Io(e) if matches!(
            e.kind(),
            io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset
        ))
    }
}

/// Writes `bytes` preceded by its length as a little-endian u32.
pub fn send_frame<W: Write>(stream: &mut W, bytes: &[u8]) -> Result<(), FrameError> {
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(FrameError::Oversized(bytes.len()));
    }
    stream.write_all(&(bytes.len() as u32).to_le_bytes())?;
    stream.write_all(bytes)?;
    stream.flush()?;
    Ok(())
}

/// Reads one length-prefixed message into an rkyv-aligned buffer.
pub fn recv_frame<R: Read>(stream: &mut R) -> Result<AlignedVec, FrameError> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(FrameError::Oversized(len));
    }
    let mut buf: AlignedVec = AlignedVec::new();
    buf.resize(len, 0);
    stream.read_exact(&mut buf)?;
    Ok(buf)
}
