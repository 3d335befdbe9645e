//! JSON-lines wire format between the chat server bridge and the bot.

use serde::{Deserialize, Serialize};

use sl_core::{LetterStatus, ParticipantId, RoomId};

/// A chat event delivered to the bot, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// A user entered a task room.
    Join { room: RoomId, user: ParticipantId },
    /// A user sent a guess from the game view.
    Guess {
        room: RoomId,
        user: ParticipantId,
        text: String,
    },
    /// A user left a task room.
    Leave { room: RoomId, user: ParticipantId },
    /// The server closed a task room.
    Close { room: RoomId },
}

impl Inbound {
    /// Parse one line of input.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Command for the browser-side game plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PluginCommand {
    /// Reset the board.
    WordleInit,
    /// Paint an agreed guess.
    WordleGuess {
        guess: String,
        statuses: Vec<LetterStatus>,
    },
}

/// Something for the chat server to do, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// Post a chat message, to the room or to one user.
    Text {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver_id: Option<ParticipantId>,
        message: String,
        html: bool,
    },
    /// Forward a command to the game plugin.
    Command {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver_id: Option<ParticipantId>,
        command: PluginCommand,
    },
    /// Set the `current-image` element's source.
    Image {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver_id: Option<ParticipantId>,
        src: String,
    },
    /// Make the room read-only; the game there is over.
    ReadOnly { room: RoomId },
}

impl Payload {
    /// Serialize as a single JSON line (without the trailing newline).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
