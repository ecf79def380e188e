//! `WebSocket` handler for live cue streaming (StartSession).
//!
//! Clients connect to `GET /ws/session` and receive one JSON-encoded
//! [`Cue`](moodsprite_types::Cue) text frame per tick. The session is
//! opened before the upgrade, so a missing snapshot or entry mood is a
//! plain HTTP 404.
//!
//! The session runs on its own task. Its token is a child of the server's
//! shutdown token and is cancelled when the client closes or disconnects.
//! When the session ends the handler sends a close frame: `1000
//! "completed"` after the last cue, `1011` with the error text on failure,
//! `1001` when the server is shutting down. A cue that cannot be encoded
//! fails the stream: the session is cancelled and the socket closes with
//! `1011`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::response::{IntoResponse, Response};
use moodsprite_core::session::{CueSession, SessionOutcome, SessionState};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::state::AppState;

/// Cues buffered between the session task and the socket writer.
const CUE_BUFFER: usize = 4;

/// Open a streaming session and upgrade the connection.
///
/// # Route
///
/// `GET /ws/session`
pub async fn ws_session(
    State(state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let session = match CueSession::open(&state.store, state.session.clone()) {
        Ok(session) => session,
        Err(e) => {
            debug!(error = %e, "Session refused");
            return ApiError::from(e).into_response();
        }
    };

    match ws {
        Ok(ws) => ws
            .on_upgrade(move |socket| stream_session(socket, session, state))
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// How the forwarding loop ended.
#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    /// The session dropped its sender after reaching a terminal state.
    Drained,
    /// The client closed, errored or stopped accepting frames.
    ClientGone,
    /// A cue could not be encoded for the wire.
    EncodeFailed(String),
}

/// Run `session` on its own task and forward its cues to the client.
async fn stream_session(mut socket: WebSocket, session: CueSession, state: Arc<AppState>) {
    let _active = state.track_session();
    let session_id = session.id();
    let token = state.shutdown.child_token();
    let (tx, mut rx) = mpsc::channel(CUE_BUFFER);
    let task = tokio::spawn(session.run(tx, token.clone()));

    debug!(%session_id, "WebSocket session client connected");

    let end = loop {
        tokio::select! {
            cue = rx.recv() => {
                let Some(cue) = cue else {
                    break StreamEnd::Drained;
                };
                let text = match encode_text(&cue) {
                    Ok(text) => text,
                    Err(e) => {
                        error!(%session_id, error = %e, "Failed to encode cue");
                        break StreamEnd::EncodeFailed(e);
                    }
                };
                if socket.send(text).await.is_err() {
                    debug!(%session_id, "WebSocket client disconnected (send failed)");
                    break StreamEnd::ClientGone;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%session_id, "WebSocket client closed session");
                        break StreamEnd::ClientGone;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break StreamEnd::ClientGone;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%session_id, "WebSocket error: {e}");
                        break StreamEnd::ClientGone;
                    }
                    _ => {
                        // Clients have nothing to say mid-stream.
                    }
                }
            }
        }
    };

    if end != StreamEnd::Drained {
        token.cancel();
    }

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(%session_id, error = %e, "Session task died");
            return;
        }
    };

    if let Some(frame) = final_frame(end, &outcome) {
        // The client may already be gone; nothing to do about it.
        let _ = socket.send(Message::Close(Some(frame))).await;
    }
}

/// Serialize `value` into a text frame.
fn encode_text<T: Serialize>(value: &T) -> Result<Message, String> {
    serde_json::to_string(value)
        .map(|json| Message::Text(json.into()))
        .map_err(|e| format!("cue encoding failed: {e}"))
}

/// The close frame to send once the loop has ended, if the client is
/// still there to receive one.
fn final_frame(end: StreamEnd, outcome: &SessionOutcome) -> Option<CloseFrame> {
    match end {
        StreamEnd::Drained => Some(close_frame(outcome)),
        StreamEnd::ClientGone => None,
        StreamEnd::EncodeFailed(reason) => Some(CloseFrame {
            code: close_code::ERROR,
            reason: reason.into(),
        }),
    }
}

/// The close frame that ends a session's socket.
fn close_frame(outcome: &SessionOutcome) -> CloseFrame {
    match outcome.state {
        SessionState::Completed => CloseFrame {
            code: close_code::NORMAL,
            reason: "completed".into(),
        },
        SessionState::Failed => CloseFrame {
            code: close_code::ERROR,
            reason: outcome
                .error
                .clone()
                .unwrap_or_else(|| "session failed".to_owned())
                .into(),
        },
        SessionState::Idle | SessionState::Streaming | SessionState::Cancelled => CloseFrame {
            code: close_code::AWAY,
            reason: outcome.state.as_str().into(),
        },
    }
}
