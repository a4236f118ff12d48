//! A bounded pool of reusable connections.
//!
//! This module provides two key guarantees:
//! - At most `capacity` connections are ever opened, all of them when the pool is built.
//! - A connection is always either handed back for reuse or discarded, never silently leaked.
//!
//! ```rust
//! use netpool::pool::{factory_fn, Pool};
//! use tokio::net::TcpStream;
//!
//! // Function for asyncness.
//! async fn example() -> Result<(), netpool::Error> {
//!     // Open 8 connections to the remote endpoint.
//!     let pool = Pool::new(8, factory_fn(|| TcpStream::connect("localhost:11211"))).await?;
//!
//!     // Borrow one of them.
//!     let mut connection = pool.acquire().await?;
//!
//!     // ... use it like any other `AsyncRead + AsyncWrite` ...
//!
//!     // Hand it back, it is ready to be acquired again.
//!     connection.close().await?;
//!     Ok(())
//! }
//! ```

mod conn_pool;
mod connection;
mod error;
mod factory;
mod idle;
mod pooled;

pub use conn_pool::{Pool, PoolStatus};
pub use connection::Connection;
pub use error::Error;
pub use factory::{factory_fn, ConnectionFactory, FnFactory};
pub use pooled::PooledConnection;
