use crate::pool::{ConnectionFactory, Error, Pool};
use crate::tcp::configuration::TcpSettings;
use anyhow::Context;
use std::time::Duration;
use tokio::net::TcpStream;

/// Used when the settings leave the connection timeout unspecified.
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
/// All the information required to open TCP connections to an endpoint.
pub struct TcpConnectionFactory {
    host: String,
    port: u16,
    /// The timeout observed when trying to connect.
    connection_timeout: Duration,
}

impl TcpConnectionFactory {
    /// Create a new connection factory dialing `host:port`, with a 10 seconds connection timeout.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// Create a new connection factory from settings.
    ///
    /// If the connection timeout is left unspecified, it will be defaulted to 10 seconds.
    pub fn new_from_config(settings: &TcpSettings) -> Self {
        Self::new(settings.host.clone(), settings.port).with_connection_timeout(
            settings
                .connection_timeout()
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT),
        )
    }

    /// Replaces the connection timeout.
    #[must_use]
    pub fn with_connection_timeout(self, connection_timeout: Duration) -> Self {
        Self {
            connection_timeout,
            ..self
        }
    }

    /// The `host:port` pair connections are dialed to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open a new TCP connection.
    #[tracing::instrument(name = "tcp_connect", skip(self), fields(address = %self.address()))]
    pub async fn new_connection(&self) -> Result<TcpStream, anyhow::Error> {
        match tokio::time::timeout(
            self.connection_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        {
            Ok(result) => result.with_context(|| format!("Failed to connect to {}.", self.address())),
            Err(_) => Err(anyhow::anyhow!(
                "Timed out while trying to connect to {}.",
                self.address()
            )),
        }
    }
}

#[async_trait::async_trait]
impl ConnectionFactory for TcpConnectionFactory {
    type Connection = TcpStream;

    async fn create(&self) -> Result<TcpStream, anyhow::Error> {
        self.new_connection().await
    }
}

impl Pool<TcpStream> {
    /// Build a pool of `capacity` TCP connections to `host:port`.
    ///
    /// ```rust
    /// use netpool::Pool;
    ///
    /// async fn example() -> Result<(), netpool::Error> {
    ///     let pool = Pool::tcp("localhost", 6379, 4).await?;
    ///     assert_eq!(pool.len(), 4);
    ///     Ok(())
    /// }
    /// ```
    pub async fn tcp(host: impl Into<String>, port: u16, capacity: usize) -> Result<Self, Error> {
        Self::new(capacity, TcpConnectionFactory::new(host, port)).await
    }

    /// Build a pool of TCP connections from settings.
    pub async fn from_settings(settings: &TcpSettings) -> Result<Self, Error> {
        Self::new(
            settings.capacity,
            TcpConnectionFactory::new_from_config(settings),
        )
        .await
    }
}
