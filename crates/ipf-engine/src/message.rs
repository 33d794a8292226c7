//! Extension messages

use serde::{Deserialize, Serialize};

/// Message sent from the background context to a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// `{"type":"TOGGLE_PSEUDO_FULLSCREEN"}`
    TogglePseudoFullscreen,
}

impl ControlMessage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
