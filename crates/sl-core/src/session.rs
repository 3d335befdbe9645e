//! Per-room game session.
//!
//! `Session` owns the participants, the target pair and the round history
//! of one room. It performs no I/O: every side effect is returned as a list
//! of [`Outbound`] events for the adapter to deliver.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Pair, Selection};
use crate::config::GameConfig;
use crate::error::{SlError, SlResult};
use crate::event::{AbortReason, Outbound, SessionEvent};
use crate::feedback;
use crate::ids::{ParticipantId, RoomId};
use crate::lexicon::Lexicon;
use crate::round::{Round, SubmitOutcome};
use crate::scoring::points_for_attempt;
use crate::word;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Fewer than two participants.
    Waiting,
    /// Both participants present, puzzle running.
    InProgress,
    /// The word was found.
    Won,
    /// The attempt limit was reached.
    Lost,
    /// Ended early.
    Aborted,
}

impl SessionStatus {
    /// Whether no further rounds can happen.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Won | SessionStatus::Lost | SessionStatus::Aborted
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Waiting => write!(f, "waiting"),
            SessionStatus::InProgress => write!(f, "in progress"),
            SessionStatus::Won => write!(f, "won"),
            SessionStatus::Lost => write!(f, "lost"),
            SessionStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// The full state of one room's game.
#[derive(Debug)]
pub struct Session {
    room: RoomId,
    config: GameConfig,
    lexicon: Option<Arc<Lexicon>>,
    participants: Vec<ParticipantId>,
    target: Option<Pair>,
    rounds: Vec<Round>,
    status: SessionStatus,
    points: u32,
    started_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a waiting session for `room`.
    pub fn new(room: RoomId, config: GameConfig) -> Self {
        Self {
            room,
            config,
            lexicon: None,
            participants: Vec::with_capacity(2),
            target: None,
            rounds: Vec::new(),
            status: SessionStatus::Waiting,
            points: 0,
            started_at: None,
        }
    }

    /// Only accept guesses found in `lexicon`.
    pub fn with_lexicon(mut self, lexicon: Arc<Lexicon>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Room this session belongs to.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Participants in join order.
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    /// Target pair, once the game has started.
    pub fn target(&self) -> Option<&Pair> {
        self.target.as_ref()
    }

    /// All rounds, resolved ones first and the open round (if any) last.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Rounds that resolved into an agreed guess.
    pub fn resolved_rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter().filter(|r| r.is_resolved())
    }

    /// The round currently accepting submissions.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last().filter(|r| !r.is_resolved())
    }

    /// Number of agreed guesses so far.
    pub fn attempts_used(&self) -> u32 {
        self.resolved_rounds().count() as u32
    }

    /// Agreed guesses left.
    pub fn attempts_remaining(&self) -> u32 {
        self.config.attempt_limit.saturating_sub(self.attempts_used())
    }

    /// Points earned (non-zero only after a win).
    pub fn points(&self) -> u32 {
        self.points
    }

    /// When the second participant joined.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Whether `participant` plays in this session.
    pub fn has_participant(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    /// The other participant.
    pub fn partner_of(&self, participant: &ParticipantId) -> Option<&ParticipantId> {
        if !self.has_participant(participant) {
            return None;
        }
        self.participants.iter().find(|p| *p != participant)
    }

    /// Add a participant. The second join selects a pair and starts the game.
    ///
    /// A participant who is already present gets the current game state
    /// replayed to them instead. A third participant is refused.
    pub fn join(
        &mut self,
        participant: &ParticipantId,
        catalog: &Catalog,
        selection: &mut Selection,
    ) -> SlResult<Vec<Outbound>> {
        if self.status.is_terminal() {
            return Err(SlError::SessionTerminal(self.status));
        }
        if self.has_participant(participant) {
            debug!("Room {}: {participant} rejoined", self.room);
            return Ok(self.replay_for(participant));
        }
        if self.participants.len() >= 2 {
            return Err(SlError::RoomFull(self.room.clone()));
        }

        if self.participants.is_empty() {
            self.participants.push(participant.clone());
            debug!("Room {}: {participant} is waiting for a partner", self.room);
            return Ok(Vec::new());
        }

        let pair = catalog.select_pair(selection)?.clone();
        self.participants.push(participant.clone());
        Ok(self.start(pair))
    }

    fn start(&mut self, pair: Pair) -> Vec<Outbound> {
        info!(
            "Room {}: game started for {} with a {}-letter word",
            self.room,
            self.participants
                .iter()
                .map(ParticipantId::as_str)
                .collect::<Vec<_>>()
                .join(" and "),
            pair.word_length()
        );
        let event = SessionEvent::GameStarted {
            image_ref: pair.image_ref.clone(),
            attempt_limit: self.config.attempt_limit,
            word_length: pair.word_length(),
        };
        self.target = Some(pair);
        self.rounds.push(Round::new(1));
        self.status = SessionStatus::InProgress;
        self.started_at = Some(Utc::now());
        vec![Outbound::room(event)]
    }

    /// Events that bring a reconnecting participant's view up to date.
    pub fn replay_for(&self, participant: &ParticipantId) -> Vec<Outbound> {
        let Some(target) = &self.target else {
            return Vec::new();
        };

        let mut events = vec![Outbound::to(
            participant,
            SessionEvent::GameStarted {
                image_ref: target.image_ref.clone(),
                attempt_limit: self.config.attempt_limit,
                word_length: target.word_length(),
            },
        )];

        let limit = self.config.attempt_limit;
        for (used, round) in self.resolved_rounds().enumerate() {
            if let Some(resolved) = round.resolved() {
                events.push(Outbound::to(
                    participant,
                    SessionEvent::RoundFeedback {
                        round_number: round.number(),
                        guess: resolved.word.clone(),
                        statuses: resolved.statuses.clone(),
                        attempts_remaining: limit.saturating_sub(used as u32 + 1),
                    },
                ));
            }
        }

        if let Some(pending) = self.current_round().and_then(Round::pending) {
            let event = if pending.participant == *participant {
                SessionEvent::GuessPending {
                    word: pending.word.clone(),
                }
            } else {
                SessionEvent::PartnerGuessed
            };
            events.push(Outbound::to(participant, event));
        }

        events
    }

    /// Submit a guess for the current round.
    pub fn submit_guess(
        &mut self,
        participant: &ParticipantId,
        raw: &str,
    ) -> SlResult<Vec<Outbound>> {
        if self.status.is_terminal() {
            return Err(SlError::SessionTerminal(self.status));
        }
        if !self.has_participant(participant) {
            return Err(SlError::NotAParticipant(participant.clone()));
        }
        let (Some(target), Some(round)) = (self.target.as_ref(), self.rounds.last_mut()) else {
            return Err(SlError::NotStarted);
        };

        let target_len = target.word_length();
        let guess = word::normalize(raw);
        word::validate(&guess, Some(target_len))?;
        if let Some(lexicon) = &self.lexicon
            && !lexicon.contains(&guess)
        {
            return Err(SlError::UnknownWord(guess));
        }

        let round_number = round.number();
        let outcome = round.submit(participant, &guess, &target.word, self.config.resubmit)?;

        let events = match outcome {
            SubmitOutcome::Pending => {
                let mut events = vec![Outbound::to(
                    participant,
                    SessionEvent::GuessPending { word: guess },
                )];
                if let Some(partner) = self.partner_of(participant) {
                    events.push(Outbound::to(partner, SessionEvent::PartnerGuessed));
                }
                events
            }
            SubmitOutcome::Mismatch { .. } => {
                vec![Outbound::room(SessionEvent::GuessDisagreement { round_number })]
            }
            SubmitOutcome::Match { word, statuses } => self.record_match(round_number, word, statuses),
        };

        Ok(events)
    }

    fn record_match(
        &mut self,
        round_number: u32,
        guess: String,
        statuses: Vec<feedback::LetterStatus>,
    ) -> Vec<Outbound> {
        let used = self.attempts_used();
        let remaining = self.attempts_remaining();
        let target_word = self
            .target
            .as_ref()
            .map(|t| t.word.clone())
            .unwrap_or_default();
        let won = feedback::is_win(&guess, &target_word);

        info!(
            "Room {}: round {round_number} agreed on \"{guess}\" ({remaining} left)",
            self.room
        );

        let mut events = vec![Outbound::room(SessionEvent::RoundFeedback {
            round_number,
            guess,
            statuses,
            attempts_remaining: remaining,
        })];

        if won {
            self.status = SessionStatus::Won;
            self.points = points_for_attempt(used);
            info!(
                "Room {}: won on attempt {used} for {} points",
                self.room, self.points
            );
            events.push(Outbound::room(SessionEvent::GameWon {
                word: target_word,
                points: self.points,
            }));
        } else if remaining == 0 {
            self.status = SessionStatus::Lost;
            info!("Room {}: lost, the word was \"{target_word}\"", self.room);
            events.push(Outbound::room(SessionEvent::GameLost { word: target_word }));
        } else {
            self.rounds.push(Round::new(round_number + 1));
        }

        events
    }

    /// A participant left. Aborts a running or waiting session; no-op once
    /// terminal or for someone who is not playing here.
    pub fn leave(&mut self, participant: &ParticipantId) -> Vec<Outbound> {
        if !self.has_participant(participant) {
            return Vec::new();
        }
        self.abort(AbortReason::ParticipantLeft {
            participant: participant.clone(),
        })
    }

    /// End the session early. Idempotent once terminal.
    pub fn abort(&mut self, reason: AbortReason) -> Vec<Outbound> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        info!("Room {}: aborted, {reason}", self.room);
        self.status = SessionStatus::Aborted;
        vec![Outbound::room(SessionEvent::GameAborted { reason })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CatalogOptions, ResubmitPolicy};
    use crate::event::Audience;
    use crate::feedback::LetterStatus;

    fn catalog() -> Catalog {
        Catalog::parse("crane\thttps://img.example/crane.jpg\n", &CatalogOptions::default()).unwrap()
    }

    fn alice() -> ParticipantId {
        ParticipantId::from("alice")
    }

    fn bob() -> ParticipantId {
        ParticipantId::from("bob")
    }

    fn started(config: GameConfig) -> Session {
        let catalog = catalog();
        let mut sel = Selection::Sequential { next: 0 };
        let mut s = Session::new(RoomId::from("room-1"), config);
        s.join(&alice(), &catalog, &mut sel).unwrap();
        s.join(&bob(), &catalog, &mut sel).unwrap();
        s
    }

    fn agree(s: &mut Session, word: &str) -> Vec<Outbound> {
        s.submit_guess(&alice(), word).unwrap();
        s.submit_guess(&bob(), word).unwrap()
    }

    #[test]
    fn first_join_waits() {
        let catalog = catalog();
        let mut sel = Selection::Sequential { next: 0 };
        let mut s = Session::new(RoomId::from("r"), GameConfig::default());
        let events = s.join(&alice(), &catalog, &mut sel).unwrap();
        assert!(events.is_empty());
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert!(s.target().is_none());
        assert!(matches!(
            s.submit_guess(&alice(), "crane"),
            Err(SlError::NotStarted)
        ));
    }

    #[test]
    fn second_join_starts_without_revealing_word() {
        let catalog = catalog();
        let mut sel = Selection::Sequential { next: 0 };
        let mut s = Session::new(RoomId::from("r"), GameConfig::default());
        s.join(&alice(), &catalog, &mut sel).unwrap();
        let events = s.join(&bob(), &catalog, &mut sel).unwrap();

        assert_eq!(s.status(), SessionStatus::InProgress);
        assert_eq!(s.current_round().unwrap().number(), 1);
        assert_eq!(
            events,
            vec![Outbound::room(SessionEvent::GameStarted {
                image_ref: "https://img.example/crane.jpg".into(),
                attempt_limit: 5,
                word_length: 5,
            })]
        );
        assert!(s.started_at().is_some());
    }

    #[test]
    fn empty_catalog_leaves_session_waiting() {
        let mut sel = Selection::Sequential { next: 0 };
        let empty = Catalog::default();
        let mut s = Session::new(RoomId::from("r"), GameConfig::default());
        s.join(&alice(), &empty, &mut sel).unwrap();
        assert!(matches!(
            s.join(&bob(), &empty, &mut sel),
            Err(SlError::EmptyCatalog)
        ));
        assert_eq!(s.participants().len(), 1);
        assert_eq!(s.status(), SessionStatus::Waiting);
    }

    #[test]
    fn third_participant_rejected() {
        let mut s = started(GameConfig::default());
        let mut sel = Selection::Sequential { next: 0 };
        let err = s
            .join(&ParticipantId::from("carol"), &catalog(), &mut sel)
            .unwrap_err();
        assert!(matches!(err, SlError::RoomFull(_)));
        assert_eq!(s.participants().len(), 2);
    }

    #[test]
    fn pending_guess_prompts_partner() {
        let mut s = started(GameConfig::default());
        let events = s.submit_guess(&alice(), "Plant").unwrap();
        assert_eq!(
            events,
            vec![
                Outbound::to(&alice(), SessionEvent::GuessPending { word: "plant".into() }),
                Outbound::to(&bob(), SessionEvent::PartnerGuessed),
            ]
        );
    }

    #[test]
    fn disagreement_consumes_nothing() {
        let mut s = started(GameConfig::default());
        s.submit_guess(&alice(), "plant").unwrap();
        let events = s.submit_guess(&bob(), "ghost").unwrap();
        assert_eq!(
            events,
            vec![Outbound::room(SessionEvent::GuessDisagreement { round_number: 1 })]
        );
        assert_eq!(s.attempts_used(), 0);
        assert_eq!(s.current_round().unwrap().number(), 1);
        assert!(s.current_round().unwrap().pending().is_none());
    }

    #[test]
    fn agreed_wrong_guess_opens_next_round() {
        let mut s = started(GameConfig::default());
        let events = agree(&mut s, "crate");
        assert_eq!(events.len(), 1);
        match &events[0].event {
            SessionEvent::RoundFeedback {
                round_number,
                guess,
                statuses,
                attempts_remaining,
            } => {
                assert_eq!(*round_number, 1);
                assert_eq!(guess, "crate");
                assert_eq!(statuses[3], LetterStatus::Absent);
                assert_eq!(*attempts_remaining, 4);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(events[0].audience, Audience::Room);
        assert_eq!(s.current_round().unwrap().number(), 2);
    }

    #[test]
    fn win_on_first_round() {
        let mut s = started(GameConfig::default());
        let events = agree(&mut s, "CRANE");
        assert_eq!(s.status(), SessionStatus::Won);
        assert_eq!(s.points(), 100);
        assert_eq!(
            events.last().unwrap().event,
            SessionEvent::GameWon {
                word: "crane".into(),
                points: 100
            }
        );
        assert_eq!(s.rounds().len(), 1);
        assert!(s.current_round().is_none());
    }

    #[test]
    fn lost_only_after_limit() {
        let mut s = started(GameConfig::default());
        for (i, word) in ["crate", "plant", "ghost", "bloom", "shard"].iter().enumerate() {
            assert_eq!(s.status(), SessionStatus::InProgress, "lost before round {}", i + 1);
            agree(&mut s, word);
        }
        assert_eq!(s.status(), SessionStatus::Lost);
        assert_eq!(s.attempts_used(), 5);
        assert_eq!(s.rounds().len(), 5);
    }

    #[test]
    fn terminal_session_refuses_guesses() {
        let mut s = started(GameConfig::default());
        agree(&mut s, "crane");
        for _ in 0..3 {
            let err = s.submit_guess(&alice(), "plant").unwrap_err();
            assert!(matches!(err, SlError::SessionTerminal(SessionStatus::Won)));
        }
        assert_eq!(s.rounds().len(), 1);
    }

    #[test]
    fn unknown_word_rejected_with_lexicon() {
        let lexicon = Arc::new(Lexicon::parse("crane\nplant\n"));
        let catalog = catalog();
        let mut sel = Selection::Sequential { next: 0 };
        let mut s = Session::new(RoomId::from("r"), GameConfig::default()).with_lexicon(lexicon);
        s.join(&alice(), &catalog, &mut sel).unwrap();
        s.join(&bob(), &catalog, &mut sel).unwrap();

        let err = s.submit_guess(&alice(), "qwert").unwrap_err();
        assert!(matches!(err, SlError::UnknownWord(ref w) if w == "qwert"));
        assert!(s.current_round().unwrap().pending().is_none());
        assert!(s.submit_guess(&alice(), "plant").is_ok());
    }

    #[test]
    fn outsider_cannot_guess() {
        let mut s = started(GameConfig::default());
        let err = s.submit_guess(&ParticipantId::from("mallory"), "crane").unwrap_err();
        assert!(matches!(err, SlError::NotAParticipant(_)));
    }

    #[test]
    fn resubmit_policy_is_passed_through() {
        let mut s = started(GameConfig::default().with_resubmit(ResubmitPolicy::Reject));
        s.submit_guess(&alice(), "plant").unwrap();
        assert!(matches!(
            s.submit_guess(&alice(), "ghost"),
            Err(SlError::AlreadySubmitted(_))
        ));
    }

    #[test]
    fn leave_aborts_once() {
        let mut s = started(GameConfig::default());
        let events = s.leave(&bob());
        assert_eq!(s.status(), SessionStatus::Aborted);
        assert_eq!(
            events,
            vec![Outbound::room(SessionEvent::GameAborted {
                reason: AbortReason::ParticipantLeft { participant: bob() }
            })]
        );
        assert!(s.leave(&alice()).is_empty());
        assert!(s.abort(AbortReason::TimedOut).is_empty());
    }

    #[test]
    fn leave_by_outsider_is_ignored() {
        let mut s = started(GameConfig::default());
        assert!(s.leave(&ParticipantId::from("observer")).is_empty());
        assert_eq!(s.status(), SessionStatus::InProgress);
    }

    #[test]
    fn rejoin_replays_history() {
        let mut s = started(GameConfig::default());
        agree(&mut s, "crate");
        s.submit_guess(&bob(), "plant").unwrap();

        let mut sel = Selection::Sequential { next: 0 };
        let events = s.join(&bob(), &catalog(), &mut sel).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.audience == Audience::Participant(bob())));
        assert!(matches!(events[0].event, SessionEvent::GameStarted { .. }));
        assert!(matches!(
            events[1].event,
            SessionEvent::RoundFeedback { round_number: 1, attempts_remaining: 4, .. }
        ));
        assert_eq!(events[2].event, SessionEvent::GuessPending { word: "plant".into() });
        assert_eq!(s.current_round().unwrap().number(), 2);
    }

    #[test]
    fn rejoin_while_partner_waits_prompts_rejoiner() {
        let mut s = started(GameConfig::default());
        s.submit_guess(&bob(), "plant").unwrap();

        let mut sel = Selection::Sequential { next: 0 };
        let events = s.join(&alice(), &catalog(), &mut sel).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Outbound::to(&alice(), SessionEvent::PartnerGuessed)
        );
    }

    #[test]
    fn finished_session_refuses_join() {
        let mut s = started(GameConfig::default());
        agree(&mut s, "crane");
        let mut sel = Selection::Sequential { next: 0 };
        let err = s.join(&alice(), &catalog(), &mut sel).unwrap_err();
        assert!(matches!(err, SlError::SessionTerminal(SessionStatus::Won)));
    }

    #[test]
    fn partner_lookup() {
        let s = started(GameConfig::default());
        assert_eq!(s.partner_of(&alice()), Some(&bob()));
        assert_eq!(s.partner_of(&ParticipantId::from("x")), None);
    }
}
