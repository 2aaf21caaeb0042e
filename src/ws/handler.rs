//! WebSocket upgrade handler (session gateway)

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::runner::GameClosed;
use crate::util::time::unix_millis;
use crate::ws::hub::Frame;
use crate::ws::protocol::{ClientMsg, ServerMsg, Welcome};

/// Session gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    Socket(#[from] axum::Error),

    #[error(transparent)]
    GameClosed(#[from] GameClosed),
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection: one connection is one player.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = Uuid::new_v4();
    info!(player_id = %player_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();

    // Attach before joining so the join snapshot lands in this queue.
    let outbound = state.hub.attach(player_id);
    state.hub.send_to(
        &player_id,
        &ServerMsg::Welcome(Welcome {
            id: player_id,
            server_time: unix_millis(),
        }),
    );

    let writer = tokio::spawn(write_loop(player_id, ws_sink, outbound));

    match state.game.join(player_id).await {
        Ok(()) => {
            if let Err(e) = read_loop(player_id, ws_stream, &state).await {
                debug!(player_id = %player_id, error = %e, "Session ended with error");
            }
        }
        Err(e) => error!(player_id = %player_id, error = %e, "Could not join game"),
    }

    // Disconnect is a normal leave, whatever ended the session.
    if let Err(e) = state.game.leave(player_id).await {
        debug!(player_id = %player_id, error = %e, "Leave not delivered");
    }
    state.hub.detach(&player_id);
    writer.abort();

    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Outbound queue -> WebSocket
async fn write_loop(
    player_id: Uuid,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Frame>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = ws_sink.send(Message::Text(frame.to_string())).await {
            debug!(player_id = %player_id, error = %e, "WebSocket send failed");
            break;
        }
    }
    let _ = ws_sink.close().await;
}

/// WebSocket -> game loop. Returns when the client goes away.
async fn read_loop(
    player_id: Uuid,
    mut ws_stream: SplitStream<WebSocket>,
    state: &AppState,
) -> Result<(), GatewayError> {
    while let Some(result) = ws_stream.next().await {
        match result? {
            Message::Text(text) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(ClientMsg::PlayerInput(input)) => {
                    state.game.input(player_id, input).await?;
                }
                Err(e) => {
                    // Previous input stays in effect.
                    warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                }
            },
            Message::Binary(_) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
        }
    }
    Ok(())
}
