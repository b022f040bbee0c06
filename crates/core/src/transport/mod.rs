//! TCP wire channel
//!
//! Thin duplex abstraction over one `TcpStream`: connect, send one
//! length-prefixed message, receive one, close. The channel knows nothing
//! about the protocol above it; TCP provides FIFO in-order delivery, the
//! codec provides the one-send-one-receive framing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{CoreError, Result};
use crate::protocol::{MessageCodec, MAX_MESSAGE_SIZE};

/// Channel timeouts
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    /// Maximum time to establish the TCP connection
    pub connect_timeout: Duration,
    /// Maximum time to wait for one full message; a wedged peer must not
    /// hold the exchange lock forever
    pub read_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// One duplex connection to the server
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    read_timeout: Duration,
}

impl Connection {
    /// Connect to `host:port`
    pub async fn connect(host: &str, port: u16, config: ChannelConfig) -> Result<Self> {
        let addr = format!("{host}:{port}");
        let connect = TcpStream::connect(&addr);
        let stream = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| CoreError::Connect {
                addr: addr.clone(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
            })?
            .map_err(|source| CoreError::Connect {
                addr: addr.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;

        tracing::debug!("Connected to {}", addr);
        Ok(Self {
            stream,
            read_timeout: config.read_timeout,
        })
    }

    /// Wrap an already-established stream (e.g. an accepted peer in tests)
    pub fn from_stream(stream: TcpStream, read_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
        }
    }

    /// Send exactly one logical message
    pub async fn send<T: Serialize>(&mut self, msg: &T) -> Result<()> {
        let encoded = MessageCodec::encode(msg)?;
        self.stream.write_all(&encoded).await?;
        tracing::trace!("Sent {} bytes", encoded.len());
        Ok(())
    }

    /// Receive exactly one logical message.
    ///
    /// The whole read is bounded by the configured read timeout; a timeout
    /// surfaces as a transport failure like any other.
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<T> {
        let timeout = self.read_timeout;
        tokio::time::timeout(timeout, self.recv_inner())
            .await
            .map_err(|_| CoreError::Timeout(timeout.as_millis() as u64))?
    }

    async fn recv_inner<T: DeserializeOwned>(&mut self) -> Result<T> {
        // Read length prefix (4 bytes, big endian)
        let mut len_buf = [0u8; 4];
        self.stream.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;

        // Validate size before allocating
        if len > MAX_MESSAGE_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: len,
                max: MAX_MESSAGE_SIZE,
            });
        }

        let mut frame = vec![0u8; 4 + len];
        frame[..4].copy_from_slice(&len_buf);
        self.stream.read_exact(&mut frame[4..]).await?;

        MessageCodec::decode(&frame)
    }

    /// Graceful shutdown, best effort
    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientMessage, Request};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_send_recv_one_message() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut peer = Connection::from_stream(stream, Duration::from_secs(5));
            let msg: ClientMessage = peer.recv().await.unwrap();
            peer.send(&msg).await.unwrap();
        });

        let mut conn = Connection::connect("127.0.0.1", addr.port(), ChannelConfig::default())
            .await
            .unwrap();
        let msg = ClientMessage::Request(Request::sync("alice"));
        conn.send(&msg).await.unwrap();
        let echoed: ClientMessage = conn.recv().await.unwrap();
        assert_eq!(msg, echoed);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_recv_timeout_on_silent_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Peer accepts but never writes
        let server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let config = ChannelConfig {
            connect_timeout: Duration::from_secs(1),
            read_timeout: Duration::from_millis(100),
        };
        let mut conn = Connection::connect("127.0.0.1", addr.port(), config)
            .await
            .unwrap();
        let result: Result<ClientMessage> = conn.recv().await;
        assert!(matches!(result, Err(CoreError::Timeout(_))));

        server.abort();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port with no listener
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = Connection::connect("127.0.0.1", addr.port(), ChannelConfig::default()).await;
        assert!(matches!(result, Err(CoreError::Connect { .. })));
    }

    #[tokio::test]
    async fn test_recv_fails_on_peer_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let mut conn = Connection::connect("127.0.0.1", addr.port(), ChannelConfig::default())
            .await
            .unwrap();
        server.await.unwrap();
        let result: Result<ClientMessage> = conn.recv().await;
        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
