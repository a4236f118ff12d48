//! The capability set the pool expects from a raw connection.
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// A raw, transport-level connection that can be pooled.
///
/// The pool never interprets the bytes flowing through a connection: it hands it out,
/// takes it back and, eventually, closes it.
///
/// The default `close` shuts down the write half of the transport (for a socket, the peer
/// observes end-of-stream). The underlying resource is released when the value is dropped.
#[async_trait::async_trait]
pub trait Connection: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Close the connection.
    async fn close(&mut self) -> io::Result<()> {
        self.shutdown().await
    }
}

impl Connection for tokio::net::TcpStream {}

#[cfg(unix)]
impl Connection for tokio::net::UnixStream {}

impl Connection for tokio::io::DuplexStream {}
