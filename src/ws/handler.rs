//! WebSocket handler: one single-player game per connection

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{GameConfig, DEFAULT_BOARD_SIZE, DEFAULT_TICK_MS};
use crate::protocol::ClientMessage;
use crate::session::{spawn_session, Session};
use crate::state::{AppState, SessionInfo};
use crate::throttle::{Admit, InputThrottle};

/// Query parameters selecting board size and speed
#[derive(Debug, Deserialize)]
pub struct GameOptions {
    size: Option<u16>,
    tick: Option<u64>,
}

/// WebSocket upgrade handler; invalid game parameters fail before upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(options): Query<GameOptions>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let config = match GameConfig::new(
        options.size.unwrap_or(DEFAULT_BOARD_SIZE),
        options.tick.unwrap_or(DEFAULT_TICK_MS),
    ) {
        Ok(config) => config,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, config))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, config: GameConfig) {
    let session_id = Uuid::new_v4();

    state.sessions.insert(
        session_id,
        SessionInfo {
            board_size: config.board.size(),
            started: Instant::now(),
            final_score: None,
        },
    );

    info!(
        %session_id,
        size = config.board.size(),
        tick_ms = config.tick_ms,
        "player connected ({} online)",
        state.player_count()
    );

    let Session {
        commands,
        mut updates,
    } = spawn_session(
        session_id,
        config,
        state.event_logger.clone(),
        state.clone(),
    );

    let (mut sender, mut receiver) = socket.split();

    // Task to forward session snapshots to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(msg) => {
                    if sender.send(Message::Text(msg.to_json().into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(%session_id, "client lagged by {} snapshots", n);
                }
                Err(RecvError::Closed) => {
                    break;
                }
            }
        }
    });

    // Task to route client input into the session
    let mut recv_task = {
        let state = state.clone();

        tokio::spawn(async move {
            let mut throttle = InputThrottle::new();

            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => match ClientMessage::parse(&text) {
                        Some(ClientMessage::Direction(direction)) => match throttle.admit() {
                            Admit::Kick => {
                                warn!(%session_id, "input flood, closing connection");
                                state
                                    .event_logger
                                    .log_client_throttled(session_id, throttle.violations());
                                break;
                            }
                            Admit::Dropped => {
                                debug!(%session_id, "direction command dropped (throttled)");
                            }
                            Admit::Allowed => {
                                debug!(%session_id, ?direction, "direction requested");
                                // Err means the game ended and the session is gone
                                if commands.send(direction).await.is_err() {
                                    break;
                                }
                            }
                        },
                        Some(ClientMessage::Ping) => {
                            debug!(%session_id, "ping");
                        }
                        None => {
                            // Unrecognized keyboard input is silently ignored
                        }
                    },
                    Ok(Message::Close(_)) => {
                        info!(%session_id, "client sent close frame");
                        break;
                    }
                    Ok(_) => {
                        // Ignore binary, ping, pong frames
                    }
                    Err(e) => {
                        error!(%session_id, "websocket error: {}", e);
                        break;
                    }
                }
            }
        })
    };

    // Whichever side finishes first, tear the other down
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.event_logger.log_session_closed(session_id);

    if let Some((_, session_info)) = state.sessions.remove(&session_id) {
        info!(
            %session_id,
            size = session_info.board_size,
            final_score = ?session_info.final_score,
            "player disconnected after {:?} ({} online)",
            session_info.started.elapsed(),
            state.player_count()
        );
    }
}
