use std::time::Duration;

/// Errors that can occur in datastream session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] mocapstream_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] mocapstream_frame::FrameError),

    /// Handshake failed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// Server closed the datastream.
    #[error("server disconnected: {0}")]
    Disconnected(String),

    /// Output sink could not be opened or written.
    #[error("output error ({target}): {source}")]
    Sink {
        target: String,
        source: std::io::Error,
    },

    /// The watchdog cancelled the session after the deadline passed.
    #[error("operation cancelled: no frame received within {0:?}")]
    Cancelled(Duration),
}

pub type Result<T> = std::result::Result<T, SessionError>;
