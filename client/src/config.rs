//! Client configuration assembled from command-line arguments

use shared::{DEFAULT_ROOM, DEFAULT_SERVER_URL, MOVE_STEP, PROXIMITY_THRESHOLD};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("server url must not be empty")]
    EmptyServerUrl,
    #[error("room must not be empty")]
    EmptyRoom,
    #[error("proximity threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),
    #[error("movement step must be a positive finite number, got {0}")]
    InvalidStep(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub room: String,
    pub proximity_threshold: f64,
    pub proximity_enabled: bool,
    pub move_step: f64,
    pub fake_ping_ms: u64,
    pub width: usize,
    pub height: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            room: DEFAULT_ROOM.to_string(),
            proximity_threshold: PROXIMITY_THRESHOLD,
            proximity_enabled: true,
            move_step: MOVE_STEP,
            fake_ping_ms: 0,
            width: 800,
            height: 600,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::EmptyServerUrl);
        }
        if self.room.trim().is_empty() {
            return Err(ConfigError::EmptyRoom);
        }
        if !self.proximity_threshold.is_finite() || self.proximity_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.proximity_threshold));
        }
        if !self.move_step.is_finite() || self.move_step <= 0.0 {
            return Err(ConfigError::InvalidStep(self.move_step));
        }
        Ok(())
    }

    /// Connection URL with the room appended as a query parameter.
    pub fn endpoint(&self) -> String {
        let separator = if self.server_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}room={}",
            self.server_url,
            separator,
            encode_query_value(&self.room)
        )
    }
}

/// Percent-encodes every byte outside the URI unreserved set.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
