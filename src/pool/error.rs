/// Pool error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The pool was asked to hold fewer than one connection.
    #[error("Invalid pool size: the capacity must be at least 1, got {0}")]
    InvalidSize(usize),
    /// The pool has been closed and no longer hands out, recycles or destroys connections.
    #[error("The connection pool has been closed")]
    PoolInvalid,
    /// An absent connection was routed back into the pool.
    #[error("A closed connection cannot be recycled")]
    ClosedConnCannotBeRecycled,
    /// The connection factory failed while the pool was being filled.
    #[error(transparent)]
    Factory(anyhow::Error),
    /// The pooled connection is no longer bound to a pool.
    #[error("Orphan connection: it is not bound to a pool anymore")]
    OrphanConnection,
    /// The pooled connection has already handed its raw connection back.
    #[error("The connection has already been released")]
    Released,
    /// Closing the underlying raw connection failed.
    #[error(transparent)]
    Close(#[from] std::io::Error),
}

impl Error {
    /// `true` if the error was raised because the pool has been closed.
    pub fn is_pool_invalid(&self) -> bool {
        matches!(self, Self::PoolInvalid)
    }
}
