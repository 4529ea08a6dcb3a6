//! One-shot TCP responders for exercising the HTTP paths in tests.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Bind an ephemeral port, answer the first connection with `response`
/// verbatim, then stop listening.
pub async fn serve_once(response: &'static str) -> SocketAddr {
    serve_once_owned(response.to_string()).await
}

/// An HTTP 200 response wrapping `body`.
pub fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

/// Like `serve_once` but with an owned response built at runtime.
pub async fn serve_once_owned(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    addr
}
