use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::datastream::Datastream;
use crate::deadline::DeadlineClock;
use crate::error::{Result, SessionError};
use crate::handshake::ConfigurableRequest;
use crate::sink::OutputTarget;

/// How many frames a session reads before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLimit {
    /// Stop after this many frames.
    Count(u64),
    /// Read until the session is cancelled or fails.
    Unbounded,
}

impl FrameLimit {
    fn allows(self, read: u64) -> bool {
        match self {
            Self::Count(limit) => read < limit,
            Self::Unbounded => true,
        }
    }
}

/// Byte and timing totals for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub bytes: u64,
    pub started: Instant,
    pub finished: Option<Instant>,
}

impl SessionStats {
    /// Start counting now.
    pub fn start() -> Self {
        Self {
            frames: 0,
            bytes: 0,
            started: Instant::now(),
            finished: None,
        }
    }

    fn record(&mut self, len: usize) {
        self.frames += 1;
        self.bytes += len as u64;
    }

    fn finish(&mut self) {
        self.finished = Some(Instant::now());
    }

    /// Wall-clock time from start to finish, or to now while running.
    pub fn elapsed(&self) -> Duration {
        self.finished
            .unwrap_or_else(Instant::now)
            .saturating_duration_since(self.started)
    }
}

/// Select channels, then copy frames into the output until `limit` is hit.
///
/// The deadline is extended before each read it guards. Every payload is
/// written and flushed before the next read, so whatever was received
/// before a cancellation is already in the sink.
pub async fn read_frames<T>(
    stream: &mut Datastream<T>,
    clock: &DeadlineClock,
    request: &ConfigurableRequest,
    output: &OutputTarget,
    limit: FrameLimit,
) -> Result<SessionStats>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    stream.send_request(request).await?;
    let mut sink = output.open().await?;
    let sink_error = |source| SessionError::Sink {
        target: output.to_string(),
        source,
    };

    let mut stats = SessionStats::start();
    debug!(?limit, %output, "reading frames");

    while limit.allows(stats.frames) {
        clock.extend();

        let message = stream.read_message().await?;
        stats.record(message.len());
        trace!(frame = stats.frames, len = message.len(), "frame received");

        sink.write_all(&message).await.map_err(sink_error)?;
        sink.flush().await.map_err(sink_error)?;
    }

    stats.finish();
    Ok(stats)
}
