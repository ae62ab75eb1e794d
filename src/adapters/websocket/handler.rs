//! WebSocket upgrade handler for live room connections.
//!
//! Handles the HTTP → WebSocket upgrade and the connection lifecycle:
//! 1. Verify the `token` query credential and that it names this room
//! 2. Upgrade to WebSocket
//! 3. Join the room channel
//! 4. Forward pushes and answer pings until disconnect
//! 5. Leave the channel

use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};

use crate::application::handlers::notification::channel_for_room;
use crate::domain::foundation::{RoomId, Timestamp};
use crate::ports::CredentialService;

use super::channels::{ClientId, RoomChannels};
use super::messages::{ClientMessage, ConnectedMessage, ServerMessage};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct LiveState {
    pub channels: Arc<RoomChannels>,
    pub credentials: Arc<dyn CredentialService>,
}

impl LiveState {
    pub fn new(channels: Arc<RoomChannels>, credentials: Arc<dyn CredentialService>) -> Self {
        Self {
            channels,
            credentials,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests for a room's live channel.
///
/// Route: `GET /rooms/:room_id/live?token=<credential>`
///
/// Browsers cannot set headers on a WebSocket handshake, so the credential
/// travels in the query string. A missing or unverifiable token is 401; a
/// valid token for another room is 403. Credentials are checked before the
/// upgrade headers.
pub async fn live_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Path(room_id): Path<String>,
    Query(query): Query<LiveQuery>,
    State(state): State<LiveState>,
) -> Response {
    let Some(token) = query.token else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let claims = match state.credentials.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "live connection credential rejected");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };
    if claims.room_id.as_str() != room_id {
        tracing::warn!(
            path_room = %room_id,
            credential_room = %claims.room_id,
            participant = %claims.name,
            "live connection for another room"
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };
    let room_id = claims.room_id;
    ws.on_upgrade(move |socket| handle_socket(socket, room_id, state.channels))
}

/// Run an established connection until either side goes away.
async fn handle_socket(socket: WebSocket, room_id: RoomId, channels: Arc<RoomChannels>) {
    let (mut sender, mut receiver) = socket.split();
    let client_id = ClientId::new();
    let channel = channel_for_room(&room_id);

    let mut room_rx = channels.join(&channel, client_id.clone()).await;

    let connected = ServerMessage::Connected(ConnectedMessage {
        channel: channel.clone(),
        client_id: client_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });
    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!(client_id = %client_id, error = %e, "client gone before connect");
        drop(room_rx);
        channels.leave(&client_id).await;
        return;
    }

    // Direct replies (pong, errors) from the receive side
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(8);

    let mut send_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    update = room_rx.recv() => match update {
                        Ok(update) => update.to_server_message(),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::debug!(client_id = %client_id, missed, "slow client skipped pushes");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    reply = reply_rx.recv() => match reply {
                        Some(reply) => reply,
                        None => break,
                    },
                };
                if let Err(e) = send_message(&mut sender, &msg).await {
                    tracing::debug!(client_id = %client_id, error = %e, "send failed, closing");
                    break;
                }
            }
        })
    };

    let mut recv_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Ping) => ServerMessage::pong(),
                            Err(_) => ServerMessage::error("BAD_MESSAGE", "unsupported message"),
                        };
                        if reply_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::debug!(client_id = %client_id, "client sent close frame");
                        break;
                    }
                    // Protocol pings are answered by axum
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(client_id = %client_id, error = %e, "receive error");
                        break;
                    }
                }
            }
        })
    };

    // Whichever side finishes first takes the other down; both tasks own
    // their halves, so the receiver is dropped before leaving.
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
    }

    channels.leave(&client_id).await;
    tracing::debug!(client_id = %client_id, channel = %channel, "live connection closed");
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the live endpoint.
pub fn live_router(state: LiveState) -> Router {
    Router::new()
        .route("/rooms/:room_id/live", get(live_handler))
        .with_state(state)
}
