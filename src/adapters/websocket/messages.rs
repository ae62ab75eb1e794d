//! WebSocket message types for live room updates.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, room pushes, errors, pongs
//! - Client → Server: pings

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::Timestamp;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established and subscribed to the room channel.
    Connected(ConnectedMessage),

    /// A room event, e.g. `participant-voted`.
    Push(PushMessage),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectedMessage {
    pub channel: String,
    pub client_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub event: String,
    pub data: JsonValue,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl ServerMessage {
    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorMessage {
            code: code.into(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,
}

// ============================================
// Internal Types
// ============================================

/// What a room channel carries between the relay and each connection.
#[derive(Debug, Clone, PartialEq)]
pub struct PushUpdate {
    pub event: String,
    pub data: JsonValue,
    pub timestamp: Timestamp,
}

impl PushUpdate {
    pub fn new(event: impl Into<String>, data: JsonValue) -> Self {
        Self {
            event: event.into(),
            data,
            timestamp: Timestamp::now(),
        }
    }

    /// Convert to a server message for sending to clients.
    pub fn to_server_message(self) -> ServerMessage {
        ServerMessage::Push(PushMessage {
            event: self.event,
            data: self.data,
            timestamp: self.timestamp.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_serializes_with_type_tag() {
        let msg = PushUpdate::new("reveal-votes", json!({"room_id": "aB3xY9"})).to_server_message();

        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["type"], "push");
        assert_eq!(value["event"], "reveal-votes");
        assert_eq!(value["data"]["room_id"], "aB3xY9");
    }

    #[test]
    fn client_ping_deserializes() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn unknown_client_message_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "vote"}"#).is_err());
    }

    #[test]
    fn error_message_serializes_correctly() {
        let value = serde_json::to_value(ServerMessage::error("BAD_MESSAGE", "unsupported")).unwrap();

        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "BAD_MESSAGE");
    }
}
