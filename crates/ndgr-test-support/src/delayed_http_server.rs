//! A minimal raw-socket HTTP server that accepts a connection, waits `delay`
//! before writing a fixed response, then closes. Used where a test needs a
//! request to stay in flight for a controlled duration — e.g. racing the
//! supervisor's monitor tick against a view stream that hasn't resolved yet.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub struct DelayedHttpServer {
    addr: std::net::SocketAddr,
    _task: tokio::task::JoinHandle<()>,
}

impl DelayedHttpServer {
    /// Start the server, responding to every connection with `body` after
    /// `delay`, then closing the connection.
    pub async fn start(delay: Duration, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind delayed http server");
        let addr = listener.local_addr().expect("local_addr");

        let task = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _peer)) = listener.accept().await else {
                    break;
                };
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf).await;
                    tokio::time::sleep(delay).await;
                    let header = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(header.as_bytes()).await;
                    let _ = stream.write_all(&body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, _task: task }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}
