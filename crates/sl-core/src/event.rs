//! Events a session emits for the messaging adapter to deliver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SlError;
use crate::feedback::LetterStatus;
use crate::ids::ParticipantId;

/// Why a session was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbortReason {
    /// A participant left the room.
    ParticipantLeft {
        /// Who left.
        participant: ParticipantId,
    },
    /// The game ran past its time limit.
    TimedOut,
    /// The chat server closed the room.
    RoomClosed,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::ParticipantLeft { participant } => write!(f, "{participant} left the game"),
            AbortReason::TimedOut => write!(f, "time is up"),
            AbortReason::RoomClosed => write!(f, "the room was closed"),
        }
    }
}

/// Something the players should see. Carries everything needed to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Both participants are present and the puzzle is set. The target word
    /// is never included.
    GameStarted {
        /// Image to show.
        image_ref: String,
        /// How many agreed guesses the players have.
        attempt_limit: u32,
        /// Letters in the target word.
        word_length: usize,
    },
    /// The recipient's guess is recorded and waits for the partner.
    GuessPending {
        /// The recorded guess.
        word: String,
    },
    /// The recipient's partner has submitted a guess.
    PartnerGuessed,
    /// The participants submitted different words; nothing was consumed.
    GuessDisagreement {
        /// Round that stays open.
        round_number: u32,
    },
    /// An agreed guess was scored.
    RoundFeedback {
        /// Round that resolved.
        round_number: u32,
        /// The agreed guess.
        guess: String,
        /// One status per letter.
        statuses: Vec<LetterStatus>,
        /// Agreed guesses left after this one.
        attempts_remaining: u32,
    },
    /// The players found the word.
    GameWon {
        /// The target word.
        word: String,
        /// Points for this puzzle.
        points: u32,
    },
    /// The attempt limit was reached without finding the word.
    GameLost {
        /// The target word.
        word: String,
    },
    /// The session ended early.
    GameAborted {
        /// Why.
        reason: AbortReason,
    },
    /// A call was refused; the session is unchanged.
    GuessRejected {
        /// User-facing explanation.
        reason: String,
    },
    /// A puzzle ended in a win or loss and its points were added to the
    /// room total.
    PuzzleFinished {
        /// 1-based number of the puzzle that ended.
        puzzle: u32,
        /// Puzzles the room plays in total.
        puzzles: u32,
        /// Points for this puzzle.
        points: u32,
        /// Points collected in the room so far.
        total_points: u32,
    },
    /// No more puzzles will be played in the room.
    RoomFinished {
        /// Puzzles that were started.
        puzzles_played: u32,
        /// Points collected across all puzzles.
        total_points: u32,
    },
}

impl SessionEvent {
    /// Rejection event for a per-call error.
    pub fn rejected(error: &SlError) -> Self {
        SessionEvent::GuessRejected {
            reason: error.to_string(),
        }
    }
}

/// Who an event is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Everyone in the room.
    Room,
    /// A single participant.
    Participant(ParticipantId),
}

/// An event addressed to an audience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    /// Recipients.
    pub audience: Audience,
    /// Payload.
    pub event: SessionEvent,
}

impl Outbound {
    /// Address an event to the whole room.
    pub fn room(event: SessionEvent) -> Self {
        Self {
            audience: Audience::Room,
            event,
        }
    }

    /// Address an event to one participant.
    pub fn to(participant: &ParticipantId, event: SessionEvent) -> Self {
        Self {
            audience: Audience::Participant(participant.clone()),
            event,
        }
    }
}
