//! Stream motion capture frames from a datastream server to a file.
//!
//! mocapstream connects to a motion capture datastream service, selects
//! channels with the configurable handshake, and copies a bounded run of
//! frames into an output sink while a watchdog aborts stalled sessions.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP address resolution and connection setup
//! - [`frame`]: Big-endian length-prefixed message framing
//! - [`session`]: Handshake, deadline clock, watchdog and frame reader

/// Re-export transport types.
pub mod transport {
    pub use mocapstream_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mocapstream_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use mocapstream_session::*;
}
