//! Wire protocol between clients and the relay server.
//!
//! Messages are JSON, multiplexed by event name over one WebSocket per
//! client:
//! ```json
//! { "type": "user-joined", "roomId": "r1", "userId": "...", "userName": "ada", "host": true, "presenter": true }
//! { "type": "drawing", "snapshotBlob": "<base64-encoded-png>" }
//! { "type": "canvasImage", "snapshotBlob": "<base64-encoded-png>" }
//! ```

use serde::{Deserialize, Serialize};

/// Messages sent by clients to the relay server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Join a room.
    #[serde(rename = "user-joined", rename_all = "camelCase")]
    UserJoined {
        room_id: String,
        user_id: String,
        user_name: String,
        host: bool,
        presenter: bool,
    },
    /// Canvas snapshot after a local change.
    #[serde(rename = "drawing", rename_all = "camelCase")]
    Drawing { snapshot_blob: String },
    /// Chat text.
    #[serde(rename = "messageResponse")]
    Chat { text: String },
}

/// Messages sent by the relay server to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// System or chat message.
    #[serde(rename = "message")]
    Message { username: String, message: String },
    /// Join/leave notice for transient display.
    #[serde(rename = "user-status")]
    UserStatus { message: String },
    /// Full participant roster of the room.
    #[serde(rename = "users")]
    Users { users: Vec<Participant> },
    /// Latest raster snapshot to display.
    #[serde(rename = "canvasImage", rename_all = "camelCase")]
    CanvasImage { snapshot_blob: String },
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub room: String,
    pub host: bool,
    pub presenter: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_wire_names() {
        let joined = ClientEvent::UserJoined {
            room_id: "r1".to_string(),
            user_id: "u1".to_string(),
            user_name: "ada".to_string(),
            host: true,
            presenter: false,
        };
        let json = serde_json::to_string(&joined).unwrap();
        assert!(json.contains(r#""type":"user-joined""#));
        assert!(json.contains(r#""roomId":"r1""#));
        assert!(json.contains(r#""userName":"ada""#));

        let chat: ClientEvent =
            serde_json::from_str(r#"{"type":"messageResponse","text":"hello"}"#).unwrap();
        assert!(matches!(chat, ClientEvent::Chat { text } if text == "hello"));
    }

    #[test]
    fn test_server_event_roundtrip() {
        let event = ServerEvent::CanvasImage {
            snapshot_blob: "cGl4ZWxz".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"canvasImage""#));
        assert!(json.contains(r#""snapshotBlob""#));

        let back: ServerEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ServerEvent::CanvasImage { .. }));
    }
}
