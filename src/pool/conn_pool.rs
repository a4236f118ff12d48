use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::idle::IdleBuffer;
use super::{Connection, ConnectionFactory, Error, PooledConnection};

/// A fixed-capacity pool of reusable connections.
///
/// All `capacity` connections are opened upfront, when the pool is built, using the
/// [`ConnectionFactory`] provided by the caller. They are then lent out via [`Pool::acquire`] and
/// come back either through [`PooledConnection::close`] (the connection is reused) or
/// [`PooledConnection::terminate`] (the connection is discarded).
///
/// Discarded connections are **not** replaced: a pool whose connections have all been
/// terminated has nothing left to hand out.
///
/// `Pool` is a cheap handle: clones share the same underlying set of connections.
pub struct Pool<C: Connection> {
    shared: Arc<Shared<C>>,
}

pub(crate) struct Shared<C> {
    capacity: usize,
    state: Mutex<State>,
    idle: IdleBuffer<C>,
}

struct State {
    /// Connections created and not yet destroyed, idle or checked out.
    outstanding: usize,
    valid: bool,
}

/// A snapshot of the pool's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// The maximum number of connections the pool will ever open.
    pub capacity: usize,
    /// Connections opened and not yet destroyed, whether idle or checked out.
    pub outstanding: usize,
    /// Connections sitting in the pool, ready to be acquired.
    pub idle: usize,
}

impl<C: Connection> Pool<C> {
    /// Build a pool holding `capacity` connections opened with `factory`.
    ///
    /// It fails with [`Error::InvalidSize`] if `capacity` is zero, without invoking `factory`.
    /// If the factory fails, construction is aborted and its error is returned as
    /// [`Error::Factory`]; the connections opened so far are dropped.
    #[tracing::instrument(name = "netpool_create", skip(factory))]
    pub async fn new<F>(capacity: usize, factory: F) -> Result<Self, Error>
    where
        F: ConnectionFactory<Connection = C>,
    {
        if capacity < 1 {
            return Err(Error::InvalidSize(capacity));
        }

        let mut connections = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            connections.push(factory.create().await.map_err(Error::Factory)?);
        }
        debug!("Opened {} pooled connections", capacity);

        Ok(Self {
            shared: Arc::new(Shared {
                capacity,
                state: Mutex::new(State {
                    outstanding: connections.len(),
                    valid: true,
                }),
                idle: IdleBuffer::new(capacity, connections),
            }),
        })
    }

    pub(crate) fn from_shared(shared: Arc<Shared<C>>) -> Self {
        Self { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared<C>> {
        Arc::downgrade(&self.shared)
    }

    /// Borrow a connection from the pool.
    ///
    /// Waits until a connection is available: if every connection is checked out and none is
    /// ever returned, this never completes. Wrap it in [`tokio::time::timeout`] if you need
    /// a bounded wait.
    ///
    /// Fails with [`Error::PoolInvalid`] if the pool is closed, including while waiting.
    pub async fn acquire(&self) -> Result<PooledConnection<C>, Error> {
        if !self.is_valid() {
            return Err(Error::PoolInvalid);
        }
        trace!("Waiting for an idle connection");
        let conn = self.shared.idle.pop().await.ok_or(Error::PoolInvalid)?;
        Ok(PooledConnection::new(conn, self))
    }

    /// Put a connection back into the pool.
    ///
    /// `None` stands for a connection that has already been let go of: its slot is released
    /// and [`Error::ClosedConnCannotBeRecycled`] is returned.
    /// Never waits: if there is no room left for `conn`, it is closed instead.
    pub async fn recycle(&self, conn: Option<C>) -> Result<(), Error> {
        if !self.is_valid() {
            return Err(Error::PoolInvalid);
        }
        let Some(conn) = conn else {
            self.release_slot();
            return Err(Error::ClosedConnCannotBeRecycled);
        };

        debug!("Recycling connection");
        if let Err(mut conn) = self.shared.idle.try_push(conn) {
            conn.close().await?;
        }
        Ok(())
    }

    /// Close a connection for good and release its slot.
    ///
    /// The slot is released before closing, so it is accounted for even if closing fails.
    pub async fn destroy(&self, mut conn: C) -> Result<(), Error> {
        if !self.is_valid() {
            return Err(Error::PoolInvalid);
        }
        self.release_slot();
        debug!("Destroying connection");
        conn.close().await?;
        Ok(())
    }

    /// Same as [`Pool::destroy`], for a connection that is still wrapped.
    ///
    /// The raw connection is closed directly, without going through [`PooledConnection::close`].
    pub async fn destroy_pooled(&self, mut conn: PooledConnection<C>) -> Result<(), Error> {
        if !self.is_valid() {
            return Err(Error::PoolInvalid);
        }
        let raw = conn.take_raw().ok_or(Error::Released)?;
        self.destroy(raw).await
    }

    /// Close the pool.
    ///
    /// Idle connections are closed right away. Connections that are checked out are left alone:
    /// from now on, handing them back fails with [`Error::PoolInvalid`] and they are closed when
    /// dropped.
    pub async fn close(&self) -> Result<(), Error> {
        let drained = {
            let mut state = self.shared.state.lock();
            if !state.valid {
                return Err(Error::PoolInvalid);
            }
            state.valid = false;
            self.shared.idle.close()
        };

        debug!("Closing {} idle connections", drained.len());
        for mut conn in drained {
            if let Err(e) = conn.close().await {
                warn!("Failed to close idle connection: {}", e);
            }
        }
        Ok(())
    }

    /// `false` once the pool has been closed.
    pub fn is_valid(&self) -> bool {
        self.shared.state.lock().valid
    }

    /// The number of idle connections.
    pub fn len(&self) -> usize {
        self.shared.idle.len()
    }

    /// `true` if no connection is waiting to be acquired.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The maximum number of connections this pool holds.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Connections opened and not yet destroyed, whether idle or checked out.
    pub fn outstanding(&self) -> usize {
        self.shared.state.lock().outstanding
    }

    /// Get the current pool status.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            capacity: self.shared.capacity,
            outstanding: self.outstanding(),
            idle: self.len(),
        }
    }

    /// Hand a connection back from a `Drop` implementation, where we cannot wait.
    pub(crate) fn return_on_drop(&self, conn: C) {
        if !self.is_valid() {
            return;
        }
        if self.shared.idle.try_push(conn).is_err() {
            trace!("No room for dropped connection, closing it");
        }
    }

    fn release_slot(&self) {
        let mut state = self.shared.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
    }
}

impl<C: Connection> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Connection> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("status", &self.status())
            .field("valid", &self.is_valid())
            .finish()
    }
}
