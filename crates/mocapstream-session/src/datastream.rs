use std::net::SocketAddr;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use mocapstream_frame::MessageCodec;
use mocapstream_transport::TcpStream;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::handshake::{validate_greeting, ConfigurableRequest};

/// A framed connection to the datastream service.
///
/// Generic over the byte stream so sessions can run over TCP or an
/// in-memory pipe.
pub struct Datastream<T> {
    framed: Framed<T, MessageCodec>,
}

impl Datastream<TcpStream> {
    /// Connect to a datastream server and consume its greeting.
    pub async fn open_connection(addr: SocketAddr) -> Result<Self> {
        let stream = mocapstream_transport::connect(addr).await?;
        Self::open(stream).await
    }
}

impl<T> Datastream<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established byte stream without reading anything.
    pub fn new(io: T) -> Self {
        Self {
            framed: Framed::new(io, MessageCodec::new()),
        }
    }

    /// Wrap an established byte stream and read the server greeting.
    pub async fn open(io: T) -> Result<Self> {
        let mut stream = Self::new(io);
        let greeting = stream.read_message().await?;
        validate_greeting(&greeting)?;
        debug!(len = greeting.len(), "received service greeting");
        Ok(stream)
    }

    /// Send the channel selection that starts the sample stream.
    pub async fn send_request(&mut self, request: &ConfigurableRequest) -> Result<()> {
        let xml = request.to_xml();
        self.write_message(xml.as_bytes()).await?;
        info!(channels = ?request.channels(), "sent channel selection");
        Ok(())
    }

    /// Receive one message payload.
    ///
    /// Cancel-safe: dropping the future keeps any partial message buffered.
    pub async fn read_message(&mut self) -> Result<Bytes> {
        match self.framed.next().await {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(err)) => Err(err.into()),
            None => Err(SessionError::Disconnected(
                "end of stream while waiting for message".to_string(),
            )),
        }
    }

    /// Send one message payload.
    pub async fn write_message(&mut self, payload: &[u8]) -> Result<()> {
        self.framed.send(payload).await?;
        Ok(())
    }
}
