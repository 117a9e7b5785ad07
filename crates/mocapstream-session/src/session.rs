use std::fmt;
use std::time::Duration;

use mocapstream_transport::{resolve, DEFAULT_ADDRESS, DEFAULT_PORT};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::datastream::Datastream;
use crate::deadline::{watchdog, DeadlineClock, DEFAULT_TIMEOUT};
use crate::error::{Result, SessionError};
use crate::handshake::ConfigurableRequest;
use crate::reader::{read_frames, FrameLimit, SessionStats};
use crate::sink::OutputTarget;

/// Frames read by a session when no limit is configured.
pub const DEFAULT_FRAME_COUNT: u64 = 100;

/// Everything a session needs to connect, select channels and store frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub address: String,
    pub port: u16,
    pub output: OutputTarget,
    pub frame_limit: FrameLimit,
    /// Deadline window granted to each frame read.
    pub timeout: Duration,
    pub request: ConfigurableRequest,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            output: OutputTarget::default(),
            frame_limit: FrameLimit::Count(DEFAULT_FRAME_COUNT),
            timeout: DEFAULT_TIMEOUT,
            request: ConfigurableRequest::default(),
        }
    }
}

/// Throughput summary of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub stats: SessionStats,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {} samples ({} bytes) in {}",
            self.stats.frames,
            self.stats.bytes,
            format_seconds(self.stats.elapsed().as_secs_f64())
        )
    }
}

/// Six significant digits in `%g` style: fixed notation for exponents in
/// `-4..6`, scientific otherwise, trailing zeros dropped.
fn format_seconds(secs: f64) -> String {
    const PRECISION: i32 = 6;

    if secs == 0.0 || !secs.is_finite() {
        return secs.to_string();
    }

    // The exponent is taken after rounding so 999999.5 becomes 1e+06.
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, secs);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..PRECISION).contains(&exponent) {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{secs:.decimals$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Resolve, connect and stream one session.
pub async fn run_session(config: &SessionConfig) -> Result<SessionReport> {
    let addr = resolve(&config.address, config.port).await?;
    let stream = Datastream::open_connection(addr).await?;
    stream_frames(stream, config).await
}

/// Race the frame reader against the watchdog on an open datastream.
///
/// Whichever finishes first decides the outcome; the other is dropped at
/// its current suspension point. A watchdog win is reported as
/// [`SessionError::Cancelled`].
pub async fn stream_frames<T>(
    mut stream: Datastream<T>,
    config: &SessionConfig,
) -> Result<SessionReport>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let clock = DeadlineClock::new(config.timeout);

    let stats = tokio::select! {
        biased;
        result = read_frames(
            &mut stream,
            &clock,
            &config.request,
            &config.output,
            config.frame_limit,
        ) => result?,
        _ = watchdog(&clock) => {
            warn!(timeout = ?config.timeout, "session aborted by watchdog");
            return Err(SessionError::Cancelled(config.timeout));
        }
    };

    info!(
        frames = stats.frames,
        bytes = stats.bytes,
        elapsed = ?stats.elapsed(),
        "session complete"
    );
    Ok(SessionReport { stats })
}
