//! WebSocket upgrade + message loop. The editor sends one `detect` per text
//! change; each client message is parsed as JSON, forwarded to core logic, and
//! answered with a single JSON message.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "sandbox_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "sandbox_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let out = reply_to_text(&txt, &state);
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "sandbox_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "sandbox_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize.
pub fn reply_to_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "sandbox_backend", "WS received: {:?}", message_kind(&incoming));
      handle_client_ws(incoming, state)
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

// Avoid dumping editor contents into logs.
fn message_kind(msg: &ClientWsMessage) -> &'static str {
  match msg {
    ClientWsMessage::Ping => "ping",
    ClientWsMessage::Detect { .. } => "detect",
    ClientWsMessage::TestRun { .. } => "test_run",
    ClientWsMessage::Recommend { .. } => "recommend",
  }
}

fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Detect { challenge_id, code } => {
      let bugs = detect_bugs(state, &challenge_id, &code);
      ServerWsMessage::Bugs { challenge_id, bugs }
    }

    ClientWsMessage::TestRun { challenge_id, code } => {
      let report = run_bug_checks(state, &challenge_id, &code);
      tracing::info!(target: "detection", id = %challenge_id, passed = report.overall.success, "WS test_run evaluated");
      ServerWsMessage::TestReport { report }
    }

    ClientWsMessage::Recommend { context } => {
      ServerWsMessage::Recommendation { recommendation: recommend_for_context(&context) }
    }
  }
}
