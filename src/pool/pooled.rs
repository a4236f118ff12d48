use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::debug;

use super::conn_pool::Shared;
use super::{Connection, Error, Pool};

/// A connection borrowed from a [`Pool`].
///
/// `PooledConnection` reads and writes like the raw connection it wraps. What changes is how it
/// is let go of:
///
/// - [`close`](PooledConnection::close) hands the raw connection back to the pool, ready to be
///   acquired again;
/// - [`terminate`](PooledConnection::terminate) discards a broken connection for good and frees
///   its capacity slot.
///
/// Dropping a `PooledConnection` that still holds its raw connection returns it to the pool, if
/// the pool is still open. Otherwise the raw connection is dropped, and thus closed.
///
/// The back-reference to the pool is weak: a `PooledConnection` never keeps its pool alive.
pub struct PooledConnection<C: Connection> {
    conn: Option<C>,
    pool: Option<Weak<Shared<C>>>,
}

impl<C: Connection> PooledConnection<C> {
    pub(crate) fn new(conn: C, pool: &Pool<C>) -> Self {
        Self {
            conn: Some(conn),
            pool: Some(pool.downgrade()),
        }
    }

    /// Get access to the underlying raw connection.
    ///
    /// Returns `None` once the raw connection has been handed back to the pool or destroyed.
    pub fn raw(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    /// Get mutable access to the underlying raw connection.
    pub fn raw_mut(&mut self) -> Option<&mut C> {
        self.conn.as_mut()
    }

    /// `true` if the connection is no longer bound to a live pool, either because it has been
    /// terminated or because its pool has been dropped.
    pub fn is_orphan(&self) -> bool {
        self.owner().is_none()
    }

    /// Return the raw connection to the pool it was acquired from.
    ///
    /// It fails with [`Error::OrphanConnection`] if the connection has been terminated, and with
    /// [`Error::Released`] if it has already been handed back. Neither touches the pool.
    pub async fn close(&mut self) -> Result<(), Error> {
        let pool = self.owner().ok_or(Error::OrphanConnection)?;
        let conn = self.conn.take().ok_or(Error::Released)?;
        pool.recycle(Some(conn)).await
    }

    /// Discard the raw connection and free its slot in the pool.
    ///
    /// On success the connection is detached from its pool: any further `close` or `terminate`
    /// fails with [`Error::OrphanConnection`].
    pub async fn terminate(&mut self) -> Result<(), Error> {
        let Some(pool) = self.owner() else {
            self.pool = None;
            if let Some(mut conn) = self.conn.take() {
                if let Err(e) = conn.close().await {
                    debug!("Failed to close orphan connection: {}", e);
                }
            }
            return Err(Error::OrphanConnection);
        };
        let conn = self.conn.take().ok_or(Error::Released)?;
        pool.destroy(conn).await?;
        self.pool = None;
        Ok(())
    }

    /// Detach the raw connection from the wrapper, leaving it inert.
    pub(crate) fn take_raw(&mut self) -> Option<C> {
        self.pool = None;
        self.conn.take()
    }

    fn owner(&self) -> Option<Pool<C>> {
        self.pool.as_ref()?.upgrade().map(Pool::from_shared)
    }

    fn conn_mut(&mut self) -> io::Result<Pin<&mut C>> {
        self.conn
            .as_mut()
            .map(Pin::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, Error::Released))
    }
}

impl<C: Connection> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        let conn = self.conn.take();
        if let (Some(conn), Some(pool)) = (conn, self.owner()) {
            pool.return_on_drop(conn);
        }
    }
}

impl<C: Connection> fmt::Debug for PooledConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("holds_connection", &self.conn.is_some())
            .field("orphan", &self.is_orphan())
            .finish()
    }
}

impl<C: Connection> AsyncRead for PooledConnection<C> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut().conn_mut() {
            Ok(conn) => conn.poll_read(cx, buf),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

impl<C: Connection> AsyncWrite for PooledConnection<C> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut().conn_mut() {
            Ok(conn) => conn.poll_write(cx, buf),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut().conn_mut() {
            Ok(conn) => conn.poll_write_vectored(cx, bufs),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn is_write_vectored(&self) -> bool {
        self.conn.as_ref().map_or(false, |conn| conn.is_write_vectored())
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().conn_mut() {
            Ok(conn) => conn.poll_flush(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().conn_mut() {
            Ok(conn) => conn.poll_shutdown(cx),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

/// Closing a pooled connection returns it to its pool instead of closing the transport.
#[async_trait::async_trait]
impl<C: Connection> Connection for PooledConnection<C> {
    async fn close(&mut self) -> io::Result<()> {
        PooledConnection::close(self).await.map_err(|e| match e {
            Error::Close(e) => e,
            e => io::Error::new(io::ErrorKind::Other, e),
        })
    }
}
