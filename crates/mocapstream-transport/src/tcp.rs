use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Address the motion capture server listens on when none is configured.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Port of the configurable datastream service.
pub const DEFAULT_PORT: u16 = 32076;

/// Resolve `address:port` to the first matching socket address.
pub async fn resolve(address: &str, port: u16) -> Result<SocketAddr> {
    let target = format!("{address}:{port}");
    let mut addrs = tokio::net::lookup_host((address, port))
        .await
        .map_err(|source| TransportError::Resolve {
            target: target.clone(),
            source,
        })?;

    let addr = addrs
        .next()
        .ok_or_else(|| TransportError::NoAddress { target })?;
    debug!(%addr, "resolved datastream endpoint");
    Ok(addr)
}

/// Open a TCP connection to a resolved endpoint.
///
/// Nagle is disabled; frames are small and latency sensitive.
pub async fn connect(addr: SocketAddr) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| TransportError::Connect { addr, source })?;
    stream.set_nodelay(true)?;
    info!(%addr, "connected to datastream server");
    Ok(stream)
}
