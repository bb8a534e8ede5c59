//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket, tagged by `type`
//! with camelCase event and field names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Create a new session with the sender as game master.
    CreateSession { username: String },

    /// Join an existing session.
    JoinSession { session_id: String, username: String },

    /// Game master sets the question and answer for the next round.
    SetQuestion { question: String, answer: String },

    /// Game master starts a round.
    StartGame,

    /// Player guesses the answer of the active round.
    Guess { guess: String },

    /// Chat line relayed to the whole session.
    ChatMessage { msg: String },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Connection accepted; carries the id the server knows this client by.
    ConnectionAck { connection_id: Uuid },

    /// Session created, sender is its game master.
    SessionCreated { session_id: String },

    /// Sender joined the session.
    SessionJoined { session_id: String },

    /// Public view of the session, pushed to every member.
    SessionUpdate {
        players: Vec<PlayerSummary>,
        player_count: usize,
    },

    /// A round started.
    GameStarted { question: String },

    /// The round ended. `winner` is absent when the timer expired.
    GameEnded {
        msg: String,
        answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<String>,
    },

    /// Informational notice, private or broadcast.
    Message { msg: String },

    /// Relayed chat line.
    ChatMessage { username: String, msg: String },

    /// A request was rejected.
    ErrorMsg { msg: String },
}

/// One row of the session scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub username: String,
    pub score: u32,
}

/// Longest accepted username, counted in characters after trimming.
pub const USERNAME_MAX_LENGTH: usize = 24;

/// Default server port.
pub const DEFAULT_PORT: u16 = 4040;

/// Default server host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Trims and validates a username.
///
/// Returns the trimmed name, or `Err` with an error message.
pub fn validate_username(username: &str) -> Result<&str, &'static str> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err("Username is required");
    }

    if trimmed.chars().count() > USERNAME_MAX_LENGTH {
        return Err("Username must be at most 24 characters");
    }

    Ok(trimmed)
}
