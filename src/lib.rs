//! `netpool` keeps a bounded set of network connections open to a remote endpoint and lends
//! them out, to amortize the cost of establishing connections and to cap how many of them are
//! open at any given time.
//!
//! [`Pool`](crate::pool::Pool) and [`PooledConnection`](crate::pool::PooledConnection) are the
//! best starting points to learn more about what `netpool` provides.
//! [`Pool::tcp`](crate::pool::Pool::tcp) covers the common case of pooling TCP connections.
//!
//! ## Examples
//!
//! Check the `demos` directory to see the library in action.

pub mod pool;
pub mod tcp;

pub use pool::{Error, Pool, PooledConnection};
