//! WebSocket transport: one session loop per connection.
//!
//! Each accepted socket mounts its own [`BranchView`] and then multiplexes
//! three things in one select loop: keepalive pings, `branches` topic
//! notices, and inbound client events. Every handled event or notice is
//! answered with a full `Render` frame of this connection's view.

use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::events::BranchEvent;
use crate::notify::Notice;
use crate::render;
use crate::server::SharedState;
use crate::view::BranchView;

/// How often to send WebSocket Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a Pong response before considering the connection dead.
const PONG_TIMEOUT: Duration = Duration::from_secs(60);

// ── Outbound frames ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Frame {
    Render { html: String },
}

// ── WebSocket handler ────────────────────────────────────────────────

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (sender, receiver) = socket.split();
    let (view, rx) = BranchView::mount(state.store.clone(), state.notifier.clone()).await;
    run_session_loop(sender, receiver, view, rx).await;
}

/// Core session loop with ping/pong keepalive.
///
/// Combines notice-driven refreshes, inbound event handling, and periodic
/// ping/pong health checking into a single select loop. If no Pong is
/// received within [`PONG_TIMEOUT`] after a Ping is sent, the connection
/// is considered dead and the loop exits.
async fn run_session_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    mut view: BranchView,
    mut rx: broadcast::Receiver<Notice>,
) {
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    // The first tick completes immediately; consume it so the first real
    // ping fires after PING_INTERVAL has elapsed.
    ping_interval.tick().await;

    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    // Opening frame aligns the client with this session's view state.
    if send_render(&mut sender, &view).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            // ── Periodic ping ───────────────────────────────────────
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > PONG_TIMEOUT {
                    // No pong in time, connection is dead
                    break;
                }
                if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }

            // ── Branch list notices ─────────────────────────────────
            result = rx.recv() => {
                match result {
                    Ok(notice) => {
                        view.handle_notice(notice).await;
                        if send_render(&mut sender, &view).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Missed notices all collapse into one resync.
                        warn!(missed, "viewer lagged behind updates, resyncing");
                        view.refresh().await;
                        if send_render(&mut sender, &view).await.is_err() {
                            break;
                        }
                    }
                }
            }

            // ── Client messages ─────────────────────────────────────
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<BranchEvent>(text.as_str()) {
                            Ok(event) => {
                                debug!(event = event.name(), "handling client event");
                                view.handle_event(event).await;
                                if send_render(&mut sender, &view).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                warn!(%err, "dropping malformed client frame");
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // Ignore Binary and client Pings
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }

    // Best-effort close frame
    let _ = sender.send(Message::Close(None)).await;
}

async fn send_render(
    sender: &mut SplitSink<WebSocket, Message>,
    view: &BranchView,
) -> Result<(), axum::Error> {
    let frame = Frame::Render {
        html: render::view_html(view),
    };
    match serde_json::to_string(&frame) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(err) => {
            warn!(%err, "failed to serialize render frame");
            Ok(())
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
