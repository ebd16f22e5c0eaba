use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8000/ws";
pub const DEFAULT_ROOM: &str = "default";
pub const PROXIMITY_THRESHOLD: f64 = 100.0;
pub const MOVE_STEP: f64 = 10.0;
pub const PLAYER_SIZE: f32 = 20.0;

/// Opaque, server-assigned player identity.
///
/// Accepts either a JSON string or a JSON number; numbers keep their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => PlayerId(text),
            RawId::Number(number) => PlayerId(number.to_string()),
        })
    }
}

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub x: f64,
    pub y: f64,
}

impl PlayerRecord {
    pub fn new(id: impl Into<PlayerId>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }

    pub fn distance_to(&self, other: &PlayerRecord) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Messages pushed by the world-state server, framed as `{ "type", "payload" }`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Join {
        your_id: PlayerId,
        players: Vec<PlayerRecord>,
    },
    WorldState {
        players: Vec<PlayerRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        your_id: Option<PlayerId>,
    },
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Messages sent by the client to the world-state server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Requested absolute position; the server decides whether to commit it.
    Move { x: f64, y: f64 },
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
