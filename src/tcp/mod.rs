//! Helpers for pooling TCP connections to a single endpoint.

pub mod configuration;
mod factory;
pub use factory::TcpConnectionFactory;
pub use tokio::net::TcpStream;
