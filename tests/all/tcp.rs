use crate::helpers::EchoServer;
use fake::{Fake, Faker};
use netpool::tcp::configuration::TcpSettings;
use netpool::tcp::TcpConnectionFactory;
use netpool::{Error, Pool};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn a_recycled_connection_is_reused_without_dialing_again() {
    // Arrange
    let server = EchoServer::spawn().await;
    let pool = Pool::tcp("127.0.0.1", server.address.port(), 2)
        .await
        .unwrap();

    // Act
    let mut c1 = pool.acquire().await.unwrap();
    let _c2 = pool.acquire().await.unwrap();
    assert_eq!(pool.len(), 0);

    let payload: String = Faker.fake();
    c1.write_all(payload.as_bytes()).await.unwrap();
    let mut echoed = vec![0; payload.len()];
    c1.read_exact(&mut echoed).await.unwrap();
    assert_eq!(echoed, payload.as_bytes());

    let c1_address = c1.raw().unwrap().local_addr().unwrap();
    c1.close().await.unwrap();
    assert_eq!(pool.len(), 1);

    let c3 = pool.acquire().await.unwrap();

    // Assert
    assert_eq!(c3.raw().unwrap().local_addr().unwrap(), c1_address);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.accepted(), 2);
}

#[tokio::test]
async fn a_pool_can_be_built_from_settings() {
    let server = EchoServer::spawn().await;
    let settings: TcpSettings = serde_json::from_value(serde_json::json!({
        "host": "127.0.0.1",
        "port": server.address.port().to_string(),
        "capacity": 3,
        "connection_timeout_seconds": 1
    }))
    .unwrap();

    let pool = Pool::from_settings(&settings).await.unwrap();

    assert_eq!(pool.len(), 3);
    assert_eq!(pool.capacity(), 3);
}

#[tokio::test]
async fn a_terminated_tcp_connection_is_closed() {
    let server = EchoServer::spawn().await;
    let pool = Pool::new(
        1,
        TcpConnectionFactory::new("127.0.0.1", server.address.port())
            .with_connection_timeout(Duration::from_secs(1)),
    )
    .await
    .unwrap();

    let mut connection = pool.acquire().await.unwrap();
    connection.terminate().await.unwrap();

    assert_eq!(pool.outstanding(), 0);
    assert!(connection.write_all(b"ping").await.is_err());
}

#[tokio::test]
async fn an_unreachable_endpoint_fails_construction() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let error = Pool::tcp("127.0.0.1", port, 2).await.unwrap_err();

    assert!(matches!(error, Error::Factory(_)));
}
