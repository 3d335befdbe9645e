//! Error types for the guess synchronization engine.

use thiserror::Error;

use crate::ids::{ParticipantId, RoomId};
use crate::session::SessionStatus;

/// Result type for engine operations.
pub type SlResult<T> = Result<T, SlError>;

/// Errors raised while loading data or driving a session.
#[derive(Debug, Error)]
pub enum SlError {
    /// A catalog line could not be parsed into a word/image pair.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number in the source.
        line: usize,
        /// What was wrong with the record.
        reason: String,
    },

    /// A word appeared twice in the catalog while duplicates are rejected.
    #[error("duplicate word \"{word}\" on line {line}")]
    DuplicateWord {
        /// 1-based line number of the repeated record.
        line: usize,
        /// The repeated word.
        word: String,
    },

    /// The catalog has no pairs to select from.
    #[error("catalog is empty")]
    EmptyCatalog,

    /// A submitted guess is not a well-formed word for this game.
    #[error("invalid word \"{word}\": {reason}")]
    InvalidWord {
        /// The normalized submission.
        word: String,
        /// Human-readable explanation, e.g. "word must be 5 letters".
        reason: String,
    },

    /// A guess is not in the configured lexicon.
    #[error("\"{0}\" is not in the word list")]
    UnknownWord(String),

    /// Guess and target have different lengths.
    #[error("guess has {guess} letters but the target has {target}")]
    LengthMismatch {
        /// Length of the guess in characters.
        guess: usize,
        /// Length of the target in characters.
        target: usize,
    },

    /// The round has already resolved.
    #[error("round {0} is already resolved")]
    RoundClosed(u32),

    /// The participant already has a pending guess and resubmission is disabled.
    #[error("you already entered the guess \"{0}\", wait for your partner")]
    AlreadySubmitted(String),

    /// The session has finished.
    #[error("game already finished ({0})")]
    SessionTerminal(SessionStatus),

    /// The session is still waiting for a second participant.
    #[error("the game has not started yet")]
    NotStarted,

    /// Both participant slots are taken.
    #[error("room {0} already has two participants")]
    RoomFull(RoomId),

    /// The sender does not belong to the session.
    #[error("{0} is not playing in this room")]
    NotAParticipant(ParticipantId),

    /// No session exists for the room.
    #[error("no game in room {0}")]
    UnknownRoom(RoomId),

    /// Reading a data file failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SlError {
    /// Whether the error is a per-call rejection that leaves the session
    /// usable, as opposed to a startup failure.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SlError::MalformedRecord { .. }
                | SlError::DuplicateWord { .. }
                | SlError::EmptyCatalog
                | SlError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_fatal() {
        let err = SlError::MalformedRecord {
            line: 3,
            reason: "expected 2 fields, found 1".into(),
        };
        assert!(!err.is_recoverable());
        assert!(!SlError::EmptyCatalog.is_recoverable());
    }

    #[test]
    fn guess_errors_are_recoverable() {
        assert!(SlError::RoundClosed(2).is_recoverable());
        assert!(SlError::SessionTerminal(SessionStatus::Won).is_recoverable());
        assert!(SlError::NotStarted.is_recoverable());
    }

    #[test]
    fn messages_are_user_facing() {
        let err = SlError::InvalidWord {
            word: "cat".into(),
            reason: "word must be 5 letters".into(),
        };
        assert_eq!(err.to_string(), "invalid word \"cat\": word must be 5 letters");
        assert_eq!(
            SlError::SessionTerminal(SessionStatus::Lost).to_string(),
            "game already finished (lost)"
        );
    }
}
