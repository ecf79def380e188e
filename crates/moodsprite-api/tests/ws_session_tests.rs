//! End-to-end tests for the `/ws/session` cue stream.
//!
//! Each test binds an ephemeral port, runs the real server on it and talks
//! to it with a `tokio-tungstenite` client.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use moodsprite_api::server::serve;
use moodsprite_api::state::AppState;
use moodsprite_core::session::SessionConfig;
use moodsprite_core::store::CharacterStore;
use moodsprite_types::{
    AssetBlob, CharacterSnapshot, CharacterVersion, Cue, Keyframe, KeyframeId, Mood, MoodId,
};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on any single wait, so a broken stream fails instead of hanging.
const WAIT: Duration = Duration::from_secs(5);

fn keyframe(description: &str) -> Keyframe {
    Keyframe {
        id: KeyframeId::new(),
        description: description.to_owned(),
        image_data: AssetBlob::new(vec![0x1f, 0x8b, 8, 0, 42]),
    }
}

fn make_snapshot() -> CharacterSnapshot {
    CharacterSnapshot {
        semantic_version: String::from("1.0.0"),
        character: CharacterVersion {
            name: String::from("Sera"),
            notes: String::new(),
            changelog: String::new(),
            subject_image: keyframe("neutral reference image"),
            moods: vec![
                Mood {
                    id: MoodId::new(),
                    description: String::from("sad and deflated"),
                    notes: String::new(),
                    keyframes: vec![keyframe("looking deflated")],
                },
                Mood {
                    id: MoodId::new(),
                    description: String::from("helpful, open, warm"),
                    notes: String::new(),
                    keyframes: vec![
                        keyframe("slightly smiling"),
                        keyframe("smiling"),
                        keyframe("waving"),
                    ],
                },
            ],
            recordings: Vec::new(),
        },
    }
}

fn helpful_ids(snapshot: &CharacterSnapshot) -> Vec<KeyframeId> {
    snapshot
        .character
        .mood_by_description("helpful")
        .unwrap()
        .keyframes
        .iter()
        .map(|k| k.id)
        .collect()
}

/// Start a server over `make_snapshot()` with the given tick.
async fn start(tick: Duration) -> (Arc<AppState>, SocketAddr, Vec<KeyframeId>) {
    let snapshot = make_snapshot();
    let ids = helpful_ids(&snapshot);
    let store = Arc::new(CharacterStore::with_snapshot(snapshot));
    let state = Arc::new(AppState::new(store).with_session(SessionConfig {
        tick_interval: tick,
        duration_valid_ms: 1000,
        entry_mood_keyword: String::from("helpful"),
    }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, Arc::clone(&state)));

    (state, addr, ids)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws/session"))
        .await
        .unwrap();
    client
}

async fn next_message(client: &mut Client) -> Message {
    tokio::time::timeout(WAIT, client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap()
}

async fn next_cue(client: &mut Client) -> Cue {
    let text = next_message(client).await.into_text().unwrap();
    serde_json::from_str(text.as_str()).unwrap()
}

async fn next_close(client: &mut Client) -> Option<CloseFrame> {
    loop {
        if let Message::Close(frame) = next_message(client).await {
            return frame;
        }
    }
}

async fn wait_for_no_sessions(state: &AppState) {
    tokio::time::timeout(WAIT, async {
        while state.active_sessions() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_session_streams_cues_in_keyframe_order() {
    let (state, addr, ids) = start(Duration::from_millis(50)).await;
    let mut client = connect(addr).await;

    let mut received = Vec::new();
    for _ in 0..ids.len() {
        let cue = next_cue(&mut client).await;
        assert_eq!(cue.duration_valid_ms, 1000);
        received.push(cue.keyframe_id);
    }
    assert_eq!(received, ids);

    let frame = next_close(&mut client).await.unwrap();
    assert_eq!(frame.code, CloseCode::Normal);
    assert_eq!(frame.reason.as_str(), "completed");

    wait_for_no_sessions(&state).await;
    state.shutdown.cancel();
}

#[tokio::test]
async fn test_client_close_ends_session() {
    let (state, addr, ids) = start(Duration::from_millis(200)).await;
    let mut client = connect(addr).await;

    let first = next_cue(&mut client).await;
    let second = next_cue(&mut client).await;
    assert_eq!(
        [first.keyframe_id, second.keyframe_id].as_slice(),
        ids.get(..2).unwrap()
    );
    assert_eq!(state.active_sessions(), 1);

    client.close(None).await.unwrap();

    wait_for_no_sessions(&state).await;
    state.shutdown.cancel();
}

#[tokio::test]
async fn test_client_disconnect_ends_session() {
    let (state, addr, _) = start(Duration::from_millis(200)).await;
    let mut client = connect(addr).await;

    next_cue(&mut client).await;
    drop(client);

    wait_for_no_sessions(&state).await;
    state.shutdown.cancel();
}

#[tokio::test]
async fn test_shutdown_closes_stream_as_going_away() {
    let (state, addr, _) = start(Duration::from_secs(30)).await;
    let mut client = connect(addr).await;

    next_cue(&mut client).await;
    state.shutdown.cancel();

    let frame = next_close(&mut client).await.unwrap();
    assert_eq!(frame.code, CloseCode::Away);
    assert_eq!(frame.reason.as_str(), "cancelled");

    wait_for_no_sessions(&state).await;
}

#[tokio::test]
async fn test_each_connection_gets_its_own_session() {
    let (state, addr, ids) = start(Duration::from_millis(50)).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    for client in [&mut a, &mut b] {
        let mut received = Vec::new();
        for _ in 0..ids.len() {
            received.push(next_cue(client).await.keyframe_id);
        }
        assert_eq!(received, ids);
        let frame = next_close(client).await.unwrap();
        assert_eq!(frame.code, CloseCode::Normal);
    }

    wait_for_no_sessions(&state).await;
    state.shutdown.cancel();
}
