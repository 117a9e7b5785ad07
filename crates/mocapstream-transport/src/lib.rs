//! TCP transport for motion capture datastreams.
//!
//! Resolves a server address and port into a socket address and opens the
//! TCP connection the datastream runs over. This is the lowest layer of
//! mocapstream. Everything else builds on the [`TcpStream`] returned here.

pub mod error;
pub mod tcp;

pub use error::{Result, TransportError};
pub use tcp::{connect, resolve, DEFAULT_ADDRESS, DEFAULT_PORT};
pub use tokio::net::TcpStream;
