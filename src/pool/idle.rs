use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

/// Bounded holding area for connections that are not checked out.
///
/// Waiters are parked on `ready`, which carries one permit per queued connection.
/// Closing the buffer closes the semaphore: pending and future `pop`s return `None`
/// and every `try_push` is refused.
pub(crate) struct IdleBuffer<C> {
    capacity: usize,
    connections: Mutex<VecDeque<C>>,
    ready: Semaphore,
}

impl<C> IdleBuffer<C> {
    pub(crate) fn new(capacity: usize, connections: Vec<C>) -> Self {
        let connections = VecDeque::from(connections);
        Self {
            capacity,
            ready: Semaphore::new(connections.len()),
            connections: Mutex::new(connections),
        }
    }

    /// Wait for a connection to become available.
    ///
    /// Returns `None` once the buffer has been closed.
    pub(crate) async fn pop(&self) -> Option<C> {
        let permit = self.ready.acquire().await.ok()?;
        permit.forget();
        // `close` may have drained the queue after our permit was granted.
        self.connections.lock().pop_front()
    }

    /// Queue a connection without waiting.
    ///
    /// The connection is handed back if the buffer is full or closed.
    pub(crate) fn try_push(&self, connection: C) -> Result<(), C> {
        let mut connections = self.connections.lock();
        if self.ready.is_closed() || connections.len() >= self.capacity {
            return Err(connection);
        }
        connections.push_back(connection);
        self.ready.add_permits(1);
        Ok(())
    }

    /// Refuse further insertions and hand out everything that is still queued.
    pub(crate) fn close(&self) -> Vec<C> {
        let mut connections = self.connections.lock();
        self.ready.close();
        connections.drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.connections.lock().len()
    }
}
