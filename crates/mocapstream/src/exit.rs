use std::fmt;
use std::io;

use mocapstream_frame::FrameError;
use mocapstream_session::SessionError;
use mocapstream_transport::TransportError;

// Process exit codes. A watchdog abort exits 124, like timeout(1).
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(err.kind()), format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { ref source, .. } => {
            CliError::new(io_code(source.kind()), format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::HandshakeFailed(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SessionError::Disconnected(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        SessionError::Sink { ref source, .. } => {
            CliError::new(io_code(source.kind()), format!("{context}: {err}"))
        }
        SessionError::Cancelled(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use super::*;

    #[test]
    fn cancellation_maps_to_timeout() {
        let err = session_error("session", SessionError::Cancelled(Duration::from_secs(1)));
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("session: operation cancelled"));
    }

    #[test]
    fn refused_connection_keeps_address_in_message() {
        let addr: SocketAddr = "127.0.0.1:32076".parse().unwrap();
        let err = session_error(
            "session",
            SessionError::Transport(TransportError::Connect {
                addr,
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("127.0.0.1:32076"));
    }

    #[test]
    fn resolution_failure_is_transport_error() {
        let err = transport_error(
            "session",
            TransportError::NoAddress {
                target: "nowhere:1".to_string(),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn unwritable_output_is_permission_denied() {
        let err = session_error(
            "session",
            SessionError::Sink {
                target: "/root/out.csv".to_string(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
        assert!(err.message.contains("/root/out.csv"));
    }

    #[test]
    fn bad_greeting_and_oversize_are_data_invalid() {
        let handshake = session_error(
            "session",
            SessionError::HandshakeFailed("not xml".to_string()),
        );
        assert_eq!(handshake.code, DATA_INVALID);

        let oversize = frame_error("session", FrameError::PayloadTooLarge { size: 10, max: 1 });
        assert_eq!(oversize.code, DATA_INVALID);
    }
}
