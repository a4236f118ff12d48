//! Configuration types holding the parameters required to pool TCP connections to an endpoint.
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
/// Configuration for a pool of TCP connections to a single endpoint.
pub struct TcpSettings {
    /// The host to connect to.
    ///
    /// E.g. `localhost` or `10.0.0.12`.
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    /// The port the remote endpoint listens on.
    pub port: u16,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    /// How many connections the pool opens and keeps.
    pub capacity: usize,
    /// How long you should wait when trying to connect before giving up, in seconds.
    pub connection_timeout_seconds: Option<u64>,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 80,
            capacity: 10,
            connection_timeout_seconds: Some(10),
        }
    }
}

impl TcpSettings {
    /// The `host:port` pair connections are dialed to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Retrieve the timeout observed when trying to connect.
    /// It returns `None` if left unspecified.
    pub fn connection_timeout(&self) -> Option<std::time::Duration> {
        self.connection_timeout_seconds
            .map(std::time::Duration::from_secs)
    }
}
