//! Deadline-supervised motion capture datastream sessions.
//!
//! This is the "just works" layer. Open a datastream, select channels with
//! the configurable handshake, then read a bounded run of frames into an
//! output sink while a watchdog aborts the session if the server stalls.

pub mod datastream;
pub mod deadline;
pub mod error;
pub mod handshake;
pub mod reader;
pub mod session;
pub mod sink;

pub use datastream::Datastream;
pub use deadline::{watchdog, DeadlineClock, DEFAULT_TIMEOUT};
pub use error::{Result, SessionError};
pub use handshake::{validate_greeting, ConfigurableRequest, DEFAULT_CHANNELS, GREETING_PREFIX};
pub use reader::{read_frames, FrameLimit, SessionStats};
pub use session::{run_session, stream_frames, SessionConfig, SessionReport, DEFAULT_FRAME_COUNT};
pub use sink::{OutputSink, OutputTarget};
