//! The transport shim over in-memory and loopback streams.

use std::sync::Arc;
use std::time::Duration;

use depot::files::{Router, Storage};
use depot::http::connection::{Connection, ConnectionLimits};
use depot::http::mime::MimeTable;
use depot::server::listener::serve;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio::net::{TcpListener, TcpStream};

fn router(dir: &TempDir) -> Arc<Router> {
    let storage = Storage::open(dir.path()).unwrap();
    Arc::new(Router::new(storage, MimeTable::default()))
}

fn limits() -> ConnectionLimits {
    ConnectionLimits {
        max_request_bytes: 1024,
        read_timeout: Duration::from_secs(5),
    }
}

async fn exchange(router: Arc<Router>, chunks: Vec<Vec<u8>>) -> String {
    let (mut client, server) = duplex(64 * 1024);
    let task = tokio::spawn(async move {
        Connection::new(server, router, limits()).run().await
    });

    for chunk in chunks {
        client.write_all(&chunk).await.unwrap();
        tokio::task::yield_now().await;
    }
    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    task.await.unwrap().unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

#[tokio::test]
async fn test_serves_one_request_and_closes() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();

    let reply = exchange(router(&dir), vec![b"GET /a.txt HTTP/1.1\r\n\r\n".to_vec()]).await;

    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(reply.contains("Connection: close\r\n"));
    assert!(reply.ends_with("\r\n\r\nhello"));
}

#[tokio::test]
async fn test_waits_for_body_split_across_reads() {
    let dir = TempDir::new().unwrap();
    let body = "--b\r\nContent-Disposition: form-data; name=\"filetoupload\"; filename=\"s.txt\"\r\n\r\nsplit\r\n--b--\r\n";
    let head = format!(
        "POST /upload HTTP/1.1\r\nContent-Type: multipart/form-data; boundary=b\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    let (first, second) = body.split_at(20);

    let reply = exchange(
        router(&dir),
        vec![head.into_bytes(), first.as_bytes().to_vec(), second.as_bytes().to_vec()],
    )
    .await;

    assert!(reply.starts_with("HTTP/1.1 303 See Other\r\n"));
    assert_eq!(std::fs::read(dir.path().join("s.txt")).unwrap(), b"split".to_vec());
}

#[tokio::test]
async fn test_oversized_request_gets_413() {
    let dir = TempDir::new().unwrap();

    let reply = exchange(
        router(&dir),
        vec![b"POST /upload HTTP/1.1\r\nContent-Length: 999999\r\n\r\n".to_vec()],
    )
    .await;

    assert!(reply.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
}

#[tokio::test]
async fn test_content_length_overflow_gets_413() {
    let dir = TempDir::new().unwrap();

    let reply = exchange(
        router(&dir),
        vec![b"POST /upload HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n".to_vec()],
    )
    .await;

    assert!(reply.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
}

#[tokio::test]
async fn test_read_deadline_covers_whole_request() {
    let dir = TempDir::new().unwrap();
    let limits = ConnectionLimits {
        max_request_bytes: 1024,
        read_timeout: Duration::from_millis(300),
    };
    let (client, server) = duplex(64 * 1024);
    let (mut reader, mut writer) = tokio::io::split(client);
    let router = router(&dir);
    let task = tokio::spawn(async move { Connection::new(server, router, limits).run().await });

    // Each byte arrives well inside the timeout, but the body never completes.
    let trickle = tokio::spawn(async move {
        if writer
            .write_all(b"POST /other HTTP/1.1\r\nContent-Length: 100\r\n\r\n")
            .await
            .is_err()
        {
            return;
        }
        for _ in 0..30 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if writer.write_all(b"x").await.is_err() {
                return;
            }
        }
    });

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("connection held past its read deadline")
        .unwrap()
        .unwrap();

    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    trickle.abort();
    assert!(String::from_utf8_lossy(&out).starts_with("HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn test_silent_client_gets_no_reply() {
    let dir = TempDir::new().unwrap();

    let reply = exchange(router(&dir), vec![]).await;

    assert!(reply.is_empty());
}

#[tokio::test]
async fn test_listener_serves_over_tcp() {
    let dir = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, router(&dir), limits()));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"DELETE /delete/missing.txt HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    server.abort();

    let reply = String::from_utf8(out).unwrap();
    assert!(reply.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(reply.ends_with("File not found for deletion"));
}
