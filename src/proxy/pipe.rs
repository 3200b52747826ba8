//! Byte pipe
//!
//! Copies one direction of a relayed connection.

use bytes::BytesMut;
use log::{debug, trace};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest chunk moved per read
pub const PIPE_BUFFER_SIZE: usize = 64 * 1024;

/// How a pipe stopped
#[derive(Debug)]
pub enum PipeEnd {
    /// Source reached end-of-stream
    Eof,
    /// A peer went away (reset, broken pipe, aborted, truncated TLS)
    PeerClosed(io::ErrorKind),
    /// Any other I/O failure
    Failed(io::Error),
}

/// Result of a finished pipe
#[derive(Debug)]
pub struct PipeOutcome {
    /// Bytes written to the destination
    pub bytes: u64,
    /// Why copying stopped
    pub end: PipeEnd,
}

impl PipeOutcome {
    /// True if the source ended cleanly
    pub fn is_eof(&self) -> bool {
        matches!(self.end, PipeEnd::Eof)
    }
}

fn classify(err: io::Error) -> PipeEnd {
    match err.kind() {
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::NotConnected => PipeEnd::PeerClosed(err.kind()),
        _ => PipeEnd::Failed(err),
    }
}

/// Copy `src` into `dst` until end-of-stream or the first error
///
/// Bytes are forwarded unchanged and in order, at most [`PIPE_BUFFER_SIZE`]
/// at a time. Whatever ends the copy, the write side of `dst` is then shut
/// down exactly once so the peer sees end-of-stream while the opposite
/// direction keeps flowing. Errors never escape; they are only reported in
/// the returned outcome.
pub async fn pipe<R, W>(src: &mut R, dst: &mut W) -> PipeOutcome
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = BytesMut::zeroed(PIPE_BUFFER_SIZE);
    let mut bytes = 0u64;

    let end = loop {
        let n = match src.read(&mut buffer[..]).await {
            Ok(0) => break PipeEnd::Eof,
            Ok(n) => n,
            Err(e) => break classify(e),
        };

        if let Err(e) = dst.write_all(&buffer[..n]).await {
            break classify(e);
        }
        bytes += n as u64;
    };

    // Half-close; the destination may already be gone.
    if let Err(e) = dst.shutdown().await {
        trace!("Half-close after {} bytes failed: {}", bytes, e);
    }

    match &end {
        PipeEnd::Eof => trace!("Pipe reached EOF after {} bytes", bytes),
        PipeEnd::PeerClosed(kind) => trace!("Pipe peer closed ({:?}) after {} bytes", kind, bytes),
        PipeEnd::Failed(e) => debug!("Pipe failed after {} bytes: {}", bytes, e),
    }

    PipeOutcome { bytes, end }
}
