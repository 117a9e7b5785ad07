use std::net::SocketAddr;

/// Errors that can occur while setting up the TCP transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Address resolution failed.
    #[error("failed to resolve {target}: {source}")]
    Resolve {
        target: String,
        source: std::io::Error,
    },

    /// Address resolution succeeded but yielded no usable address.
    #[error("no addresses found for {target}")]
    NoAddress { target: String },

    /// Failed to connect to the resolved address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
