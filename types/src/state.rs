//! Game state reported by the backend.

use serde::{Deserialize, Serialize};

/// Client id polled when none is configured
pub const DEFAULT_CLIENT: &str = "stand_alone";

/// The player's current location and level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub zone: String,
    pub level: u32,
}

/// One client's entry in the `/data` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    pub zone: String,
    pub level: u32,
    /// Server-rendered note HTML, if the backend produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_note: Option<String>,
}

impl ClientData {
    pub fn state(&self) -> GameState {
        GameState {
            zone: self.zone.clone(),
            level: self.level,
        }
    }

    /// The server note, treating an empty string as absent
    pub fn server_note(&self) -> Option<&str> {
        self.html_note.as_deref().filter(|note| !note.is_empty())
    }
}

/// Request body for `/data` and `/reset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRequest {
    pub poe_client: String,
}

impl ClientRequest {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            poe_client: client.into(),
        }
    }
}
