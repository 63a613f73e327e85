//! A mock WebSocket server mimicking the niconico live "start watching"
//! handshake (spec.md §4.D): accepts a connection, waits for the client's
//! `startWatching` frame, and replies with a `messageServer` frame carrying
//! a configurable `viewUri`. Modeled directly on the timer workspace's
//! `MockWsServer`.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::Message;

pub struct MockViewWsServer {
    addr: SocketAddr,
    _task: tokio::task::JoinHandle<()>,
}

impl MockViewWsServer {
    /// Start the server, immediately replying to every connection's first
    /// text frame with a `messageServer` frame carrying `view_uri`.
    pub async fn start(view_uri: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock view ws server");
        let addr = listener.local_addr().expect("local_addr");

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _peer)) = listener.accept().await else {
                    break;
                };
                let view_uri = view_uri.clone();
                tokio::spawn(async move {
                    let _ = Self::handle_connection(stream, view_uri).await;
                });
            }
        });

        Self { addr, _task: task }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        view_uri: String,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ws_stream = tokio_tungstenite::accept_async(stream).await?;
        let (mut write, mut read) = ws_stream.split();

        while let Some(msg_result) = read.next().await {
            let msg = msg_result?;
            let text = match msg {
                Message::Text(t) => t,
                Message::Close(_) => break,
                Message::Ping(data) => {
                    write.send(Message::Pong(data)).await?;
                    continue;
                }
                _ => continue,
            };

            let value: serde_json::Value = serde_json::from_str(&text)?;
            if value.get("type").and_then(|t| t.as_str()) == Some("startWatching") {
                let reply = serde_json::json!({
                    "type": "messageServer",
                    "data": { "viewUri": view_uri },
                });
                write.send(Message::Text(reply.to_string().into())).await?;
                break;
            }
        }

        Ok(())
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }
}
