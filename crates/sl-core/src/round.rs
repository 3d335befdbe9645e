//! Round synchronization between the two participants.
//!
//! A round only counts once both participants have submitted the same word.
//! Different words reset the round without consuming an attempt.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ResubmitPolicy;
use crate::error::{SlError, SlResult};
use crate::feedback::{self, LetterStatus};
use crate::ids::ParticipantId;
use crate::word;

/// One participant's proposed guess for a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Who submitted.
    pub participant: ParticipantId,
    /// Round the submission belongs to.
    pub round_number: u32,
    /// Normalized guess.
    pub word: String,
    /// When it was received.
    pub submitted_at: DateTime<Utc>,
}

/// The agreed guess of a resolved round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGuess {
    /// The word both participants agreed on.
    pub word: String,
    /// Feedback against the target.
    pub statuses: Vec<LetterStatus>,
    /// When the second matching submission arrived.
    pub resolved_at: DateTime<Utc>,
}

/// Where a round stands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum RoundState {
    /// No live submissions.
    #[default]
    Empty,
    /// One participant has submitted; waiting on the other.
    OnePending(Submission),
    /// Both agreed; the round is part of the session history.
    Resolved(ResolvedGuess),
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Recorded; the partner has not answered yet.
    Pending,
    /// The partner answered with a different word. Both submissions are
    /// cleared and the round stays open.
    Mismatch {
        /// The earlier submission.
        first: Submission,
        /// The submission that triggered resolution.
        second: Submission,
    },
    /// Both submitted the same word.
    Match {
        /// The agreed word.
        word: String,
        /// Feedback against the target.
        statuses: Vec<LetterStatus>,
    },
}

/// One attempt cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    number: u32,
    state: RoundState,
}

impl Round {
    /// Open an empty round.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            state: RoundState::Empty,
        }
    }

    /// Round number, starting at 1.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Current state.
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Whether the round has resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RoundState::Resolved(_))
    }

    /// The live submission, if exactly one exists.
    pub fn pending(&self) -> Option<&Submission> {
        match &self.state {
            RoundState::OnePending(s) => Some(s),
            _ => None,
        }
    }

    /// The agreed guess, once resolved.
    pub fn resolved(&self) -> Option<&ResolvedGuess> {
        match &self.state {
            RoundState::Resolved(r) => Some(r),
            _ => None,
        }
    }

    /// Record a guess from `participant` and resolve the round when the
    /// partner's submission is already waiting.
    ///
    /// Fails without touching the round if the word is malformed, the round
    /// is closed, or a resubmission is refused by `policy`.
    pub fn submit(
        &mut self,
        participant: &ParticipantId,
        raw: &str,
        target: &str,
        policy: ResubmitPolicy,
    ) -> SlResult<SubmitOutcome> {
        if self.is_resolved() {
            return Err(SlError::RoundClosed(self.number));
        }

        let guess = word::normalize(raw);
        word::validate(&guess, Some(word::letter_count(target)))?;

        let submission = Submission {
            participant: participant.clone(),
            round_number: self.number,
            word: guess,
            submitted_at: Utc::now(),
        };

        let first = match &self.state {
            RoundState::OnePending(existing) if existing.participant == *participant => {
                if policy == ResubmitPolicy::Reject {
                    return Err(SlError::AlreadySubmitted(existing.word.clone()));
                }
                debug!(
                    "Round {}: {participant} replaced \"{}\" with \"{}\"",
                    self.number, existing.word, submission.word
                );
                None
            }
            RoundState::OnePending(existing) => Some(existing.clone()),
            _ => None,
        };

        match first {
            Some(first) => self.try_resolve(first, submission, target),
            None => {
                self.state = RoundState::OnePending(submission);
                Ok(SubmitOutcome::Pending)
            }
        }
    }

    fn try_resolve(
        &mut self,
        first: Submission,
        second: Submission,
        target: &str,
    ) -> SlResult<SubmitOutcome> {
        if first.word != second.word {
            debug!(
                "Round {}: \"{}\" vs \"{}\", submissions cleared",
                self.number, first.word, second.word
            );
            self.state = RoundState::Empty;
            return Ok(SubmitOutcome::Mismatch { first, second });
        }

        let statuses = feedback::evaluate(&second.word, target)?;
        let word = second.word;
        self.state = RoundState::Resolved(ResolvedGuess {
            word: word.clone(),
            statuses: statuses.clone(),
            resolved_at: Utc::now(),
        });

        Ok(SubmitOutcome::Match { word, statuses })
    }
}
