//! Length-prefixed message framing for motion capture datastreams.
//!
//! Every message in either direction is framed with a 4-byte big-endian
//! payload length followed by the payload bytes. Payloads are opaque here:
//! XML for the greeting and channel selection, binary samples afterwards.

pub mod codec;
pub mod error;

pub use codec::{decode_message, encode_message, MessageCodec, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{FrameError, Result};
