//! The collaborator the pool uses to open its connections.
use std::future::Future;

use super::Connection;

/// `ConnectionFactory` opens new raw connections on behalf of a [`Pool`](super::Pool).
///
/// The pool invokes it exactly `capacity` times, while it is being constructed, and never
/// again afterwards: connections that get destroyed are not replaced.
#[async_trait::async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// The kind of connection produced by this factory.
    type Connection: Connection;

    /// Open a new connection.
    async fn create(&self) -> Result<Self::Connection, anyhow::Error>;
}

/// A [`ConnectionFactory`] backed by a closure. Built with [`factory_fn`].
#[derive(Clone)]
pub struct FnFactory<F>(F);

/// Turn a closure returning a future into a [`ConnectionFactory`].
///
/// ```rust
/// use netpool::pool::{factory_fn, Pool};
/// use tokio::net::TcpStream;
///
/// async fn example() -> Result<(), netpool::Error> {
///     let pool = Pool::new(4, factory_fn(|| TcpStream::connect("localhost:6379"))).await?;
///     let connection = pool.acquire().await?;
///     Ok(())
/// }
/// ```
pub fn factory_fn<F, Fut, C, E>(f: F) -> FnFactory<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<C, E>> + Send + 'static,
    C: Connection,
    E: Into<anyhow::Error> + Send + 'static,
{
    FnFactory(f)
}

#[async_trait::async_trait]
impl<F, Fut, C, E> ConnectionFactory for FnFactory<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<C, E>> + Send + 'static,
    C: Connection,
    E: Into<anyhow::Error> + Send + 'static,
{
    type Connection = C;

    async fn create(&self) -> Result<C, anyhow::Error> {
        (self.0)().await.map_err(Into::into)
    }
}
