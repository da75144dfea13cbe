//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::AppError;
use crate::protocol::{exercise_out, ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "swipe_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "swipe_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let out = handle_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "swipe_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "swipe_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize response.
async fn handle_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "swipe_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

fn session_reply(res: Result<crate::protocol::SessionOut, AppError>) -> ServerWsMessage {
  match res {
    Ok(session) => ServerWsMessage::Session { session },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListExercises => {
      let exercises = state.list_exercises().await.iter().map(exercise_out).collect();
      ServerWsMessage::Exercises { exercises }
    }

    ClientWsMessage::StartSession { exercise_id, state: restore, card_order } => {
      let res = start_session(state, &exercise_id, restore.as_ref(), card_order.as_deref()).await;
      if let Ok(s) = &res {
        info!(target: "interaction", session_id = %s.session_id, %exercise_id, "WS session started");
      }
      session_reply(res)
    }

    ClientWsMessage::GetSession { session_id } => session_reply(get_session(state, &session_id).await),

    ClientWsMessage::Swipe { session_id, direction } =>
      session_reply(swipe(state, &session_id, direction).await),

    ClientWsMessage::TrackWrongSwipe { session_id, direction } =>
      session_reply(track_wrong_swipe(state, &session_id, direction).await),

    ClientWsMessage::Reset { session_id } => session_reply(reset_session(state, &session_id).await),

    ClientWsMessage::Review { session_id } => match review_session(state, &session_id).await {
      Ok(review) => ServerWsMessage::Review { review },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::EndSession { session_id } => match end_session(state, &session_id).await {
      Ok(()) => ServerWsMessage::SessionEnded { session_id },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
  }
}
