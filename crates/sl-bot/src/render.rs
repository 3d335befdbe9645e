//! Turn session events into chat messages and plugin commands.

use sl_core::{Audience, LetterStatus, Outbound, ParticipantId, RoomId, SessionEvent, SlError};

use crate::protocol::{Payload, PluginCommand};

const STANDARD_COLOR: &str = "Purple";
const WARNING_COLOR: &str = "FireBrick";

/// Closing line after every finished game.
pub const GAME_OVER: &str = "The game is over! Thank you for participating!";

/// Shown when a guess message carries no text.
pub const EMPTY_GUESS: &str = "**You need to provide a guess!**";

/// Wrap a message in the chat's coloured HTML anchor.
pub fn color_message(color: &str, message: &str) -> String {
    format!("<a style=\"color:{color};\">{}</a>", escape_html(message))
}

/// Escape text for inclusion in an HTML fragment.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// One coloured square per letter.
pub fn squares(statuses: &[LetterStatus]) -> String {
    statuses
        .iter()
        .map(|s| match s {
            LetterStatus::Correct => '🟩',
            LetterStatus::Present => '🟨',
            LetterStatus::Absent => '⬛',
        })
        .collect()
}

/// Plain-text line for an event.
pub fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::GameStarted {
            attempt_limit,
            word_length,
            ..
        } => format!(
            "Let's start! Find the {word_length}-letter word that fits the image. \
             You have {attempt_limit} guesses, and a guess only counts when you both enter it."
        ),
        SessionEvent::GuessPending { .. } => {
            "Let's wait for your partner to also enter a guess.".into()
        }
        SessionEvent::PartnerGuessed => {
            "Your partner thinks that you have found the right word. Enter your guess.".into()
        }
        SessionEvent::GuessDisagreement { .. } => {
            "You and your partner sent a different word, please discuss and enter the same guess."
                .into()
        }
        SessionEvent::RoundFeedback {
            round_number,
            guess,
            statuses,
            attempts_remaining,
        } => format!(
            "Guess {round_number}: {} {} ({attempts_remaining} left)",
            guess.to_uppercase(),
            squares(statuses)
        ),
        SessionEvent::GameWon { word, points } => format!(
            "**YOU WON! The word was {}. You get {points} points.**",
            word.to_uppercase()
        ),
        SessionEvent::GameLost { word } => format!(
            "**YOU LOST! The word was {}. You get 0 points.**",
            word.to_uppercase()
        ),
        SessionEvent::GameAborted { reason } => format!("The game was stopped: {reason}."),
        SessionEvent::GuessRejected { reason } => reason.clone(),
        SessionEvent::PuzzleFinished {
            puzzle,
            puzzles,
            total_points,
            ..
        } => {
            let total = format!("Your total score is: {total_points}.");
            match puzzles.checked_sub(*puzzle) {
                Some(left) if left > 0 => format!(
                    "{total} Ok, let's get both of you the next image. {left} to go!"
                ),
                _ => total,
            }
        }
        SessionEvent::RoomFinished {
            puzzles_played,
            total_points,
        } => format!("Together you got {total_points} points for {puzzles_played} puzzle(s)."),
    }
}

/// Rejection event for a failed call, worded for players.
pub fn rejection(error: &SlError) -> SessionEvent {
    let reason = match error {
        SlError::UnknownWord(_) => {
            "**Unfortunately this word is not valid. Make sure that there aren't any typos**"
                .to_string()
        }
        SlError::InvalidWord { reason, .. } => {
            format!("Unfortunately this word is not valid: {reason}.")
        }
        SlError::LengthMismatch { target, .. } => format!(
            "Unfortunately this word is not valid. Your guess needs to have {target} letters."
        ),
        _ => return SessionEvent::rejected(error),
    };
    SessionEvent::GuessRejected { reason }
}

/// A private or room-wide chat message.
pub fn text(
    room: &RoomId,
    receiver: Option<&ParticipantId>,
    color: &str,
    message: &str,
) -> Payload {
    Payload::Text {
        room: room.clone(),
        receiver_id: receiver.cloned(),
        message: color_message(color, message),
        html: true,
    }
}

/// A standard-coloured notice.
pub fn notice(room: &RoomId, receiver: Option<&ParticipantId>, message: &str) -> Payload {
    text(room, receiver, STANDARD_COLOR, message)
}

/// A warning-coloured notice.
pub fn warning(room: &RoomId, receiver: Option<&ParticipantId>, message: &str) -> Payload {
    text(room, receiver, WARNING_COLOR, message)
}

/// Payloads that deliver one outbound event in `room`.
pub fn render(room: &RoomId, outbound: &Outbound) -> Vec<Payload> {
    let receiver = match &outbound.audience {
        Audience::Room => None,
        Audience::Participant(id) => Some(id),
    };
    let event = &outbound.event;
    let line = describe(event);

    match event {
        SessionEvent::GameStarted { image_ref, .. } => vec![
            Payload::Command {
                room: room.clone(),
                receiver_id: receiver.cloned(),
                command: PluginCommand::WordleInit,
            },
            Payload::Image {
                room: room.clone(),
                receiver_id: receiver.cloned(),
                src: image_ref.clone(),
            },
            notice(room, receiver, &line),
        ],
        SessionEvent::RoundFeedback {
            guess, statuses, ..
        } => vec![
            Payload::Command {
                room: room.clone(),
                receiver_id: receiver.cloned(),
                command: PluginCommand::WordleGuess {
                    guess: guess.clone(),
                    statuses: statuses.clone(),
                },
            },
            notice(room, receiver, &line),
        ],
        SessionEvent::RoomFinished { .. } => vec![
            notice(room, receiver, &line),
            notice(room, receiver, GAME_OVER),
            Payload::ReadOnly { room: room.clone() },
        ],
        SessionEvent::GuessRejected { .. } => vec![warning(room, receiver, &line)],
        SessionEvent::GameWon { .. }
        | SessionEvent::GameLost { .. }
        | SessionEvent::GameAborted { .. }
        | SessionEvent::PuzzleFinished { .. }
        | SessionEvent::GuessPending { .. }
        | SessionEvent::PartnerGuessed
        | SessionEvent::GuessDisagreement { .. } => vec![notice(room, receiver, &line)],
    }
}
