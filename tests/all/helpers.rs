use async_trait::async_trait;
use netpool::pool::{factory_fn, Connection, ConnectionFactory, Pool};
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, DuplexStream, ReadBuf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Hands out in-memory connections and keeps track of how many it opened.
#[derive(Clone, Default)]
pub struct CountingFactory {
    created: Arc<AtomicUsize>,
    fail_at: Option<usize>,
}

impl CountingFactory {
    /// A factory whose `n`-th invocation (1-based) fails.
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }

    /// How many times the factory has been invoked.
    pub fn invocations(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for CountingFactory {
    type Connection = DuplexStream;

    async fn create(&self) -> Result<DuplexStream, anyhow::Error> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at == Some(n) {
            anyhow::bail!("connection #{} refused", n);
        }
        // The peer end is dropped: these connections are only ever moved around.
        let (connection, _peer) = tokio::io::duplex(64);
        Ok(connection)
    }
}

pub async fn get_pool(capacity: usize) -> (Pool<DuplexStream>, CountingFactory) {
    let factory = CountingFactory::default();
    let pool = Pool::new(capacity, factory.clone()).await.unwrap();
    (pool, factory)
}

/// A local TCP server echoing back everything it receives.
pub struct EchoServer {
    pub address: SocketAddr,
    accepted: Arc<AtomicUsize>,
}

impl EchoServer {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));

        tokio::spawn({
            let accepted = Arc::clone(&accepted);
            async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let (mut reader, mut writer) = socket.split();
                        let _ = tokio::io::copy(&mut reader, &mut writer).await;
                    });
                }
            }
        });

        Self { address, accepted }
    }

    /// How many connections the server has accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

/// Hands out in-memory connections and keeps the peer ends, so that tests can observe
/// whether the pool closed them.
#[derive(Clone, Default)]
pub struct PeerKeepingFactory {
    peers: Arc<Mutex<Vec<DuplexStream>>>,
}

impl PeerKeepingFactory {
    /// Take the peer ends of every connection opened so far.
    pub async fn take_peers(&self) -> Vec<DuplexStream> {
        std::mem::take(&mut *self.peers.lock().await)
    }
}

#[async_trait]
impl ConnectionFactory for PeerKeepingFactory {
    type Connection = DuplexStream;

    async fn create(&self) -> Result<DuplexStream, anyhow::Error> {
        let (connection, peer) = tokio::io::duplex(64);
        self.peers.lock().await.push(peer);
        Ok(connection)
    }
}

/// `true` if the other end of `peer` has been shut down.
pub async fn peer_sees_eof(peer: &mut DuplexStream) -> bool {
    let mut buffer = [0; 8];
    matches!(
        tokio::time::timeout(Duration::from_secs(1), peer.read(&mut buffer)).await,
        Ok(Ok(0))
    )
}

/// A connection whose `close` always fails.
pub struct UnclosableConnection {
    inner: DuplexStream,
}

impl UnclosableConnection {
    pub fn new() -> Self {
        let (inner, _peer) = tokio::io::duplex(64);
        Self { inner }
    }
}

impl AsyncRead for UnclosableConnection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for UnclosableConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[async_trait]
impl Connection for UnclosableConnection {
    async fn close(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "close failed"))
    }
}

pub async fn get_unclosable_pool(capacity: usize) -> Pool<UnclosableConnection> {
    Pool::new(
        capacity,
        factory_fn(|| async { Ok::<_, io::Error>(UnclosableConnection::new()) }),
    )
    .await
    .unwrap()
}
