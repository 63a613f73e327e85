//! View-URI Acquirer (spec.md §4.D): a one-shot WebSocket handshake that
//! yields the View stream's entry point.

use crate::error::{NdgrError, Result};
use crate::session::{HttpSession, USER_AGENT};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Open `web_socket_url`, send the `startWatching` frame, and return the
/// `viewUri` from the first `messageServer` reply. Closes the socket
/// immediately afterward — this handshake is single-use.
pub async fn acquire_view_uri(_session: &HttpSession, web_socket_url: &str) -> Result<String> {
    if web_socket_url.is_empty() {
        return Err(NdgrError::Protocol(
            "cannot acquire view uri: webSocketUrl is empty".to_owned(),
        ));
    }

    let mut request = web_socket_url
        .into_client_request()
        .map_err(|e| NdgrError::Transport(format!("invalid websocket url: {e}")))?;
    request
        .headers_mut()
        .insert("User-Agent", USER_AGENT.parse().expect("static header value"));

    let (mut ws, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| NdgrError::Transport(format!("websocket connect failed: {e}")))?;

    let start_watching = json!({ "type": "startWatching", "data": { "reconnect": false } });
    ws.send(Message::Text(start_watching.to_string().into()))
        .await
        .map_err(|e| NdgrError::Transport(format!("websocket send failed: {e}")))?;

    loop {
        let Some(msg) = ws.next().await else {
            return Err(NdgrError::Protocol(
                "websocket closed before messageServer frame".to_owned(),
            ));
        };
        let msg = msg.map_err(|e| NdgrError::Transport(format!("websocket recv failed: {e}")))?;

        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => {
                return Err(NdgrError::Protocol(
                    "websocket closed before messageServer frame".to_owned(),
                ));
            }
            Message::Ping(data) => {
                let _ = ws.send(Message::Pong(data)).await;
                continue;
            }
            _ => continue,
        };

        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            continue;
        };
        if value.get("type").and_then(|t| t.as_str()) != Some("messageServer") {
            continue;
        }

        let view_uri = value
            .get("data")
            .and_then(|d| d.get("viewUri"))
            .and_then(|u| u.as_str())
            .ok_or_else(|| NdgrError::Protocol("messageServer frame missing data.viewUri".to_owned()))?;

        let _ = ws.close(None).await;
        return Ok(view_uri.to_owned());
    }
}
