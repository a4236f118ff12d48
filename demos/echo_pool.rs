use netpool::Pool;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A tiny echo server standing in for the remote endpoint.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = socket.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });

    // All the connections are opened upfront: 4 TCP handshakes happen here, and no more
    // will ever happen for this pool.
    let pool = Pool::tcp("127.0.0.1", port, 4).await?;
    println!("pool ready: {:?}", pool.status());

    // Borrow a connection and use it like any other socket.
    let mut connection = pool.acquire().await?;
    connection.write_all(b"hello").await?;
    let mut buffer = [0; 5];
    connection.read_exact(&mut buffer).await?;
    println!("echoed: {}", String::from_utf8_lossy(&buffer));

    // `close` hands it back to the pool, ready for the next caller.
    connection.close().await?;
    println!("after close: {:?}", pool.status());

    // `terminate` is for connections we no longer trust: the slot is gone for good.
    let mut broken = pool.acquire().await?;
    broken.terminate().await?;
    println!("after terminate: {:?}", pool.status());

    pool.close().await?;
    println!("pool valid: {}", pool.is_valid());
    Ok(())
}
