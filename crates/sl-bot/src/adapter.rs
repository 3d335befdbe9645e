//! Maps chat events onto the session registry and renders the results.
//!
//! The adapter is synchronous and does no I/O. Each handler returns a
//! [`Reaction`]: payloads to write out and timers the caller must start.
//! When a timer fires, the caller passes its [`TimerKind`] back through
//! [`Adapter::on_timer`]. Stale timers are recognized by their generation
//! and ignored.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};

use sl_core::{
    AbortReason, Audience, Outbound, ParticipantId, RoomId, SessionEvent, SessionRegistry,
    SessionStatus, SlError,
};

use crate::protocol::{Inbound, Payload};
use crate::render;

/// Timer settings for the adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timing {
    /// How long a departed participant may take to come back before the
    /// game is aborted. `None` aborts immediately.
    pub leave_grace: Option<Duration>,
    /// Maximum running time of a game. `None` never times out.
    pub game_timeout: Option<Duration>,
}

impl Timing {
    /// Set the leave grace period; zero disables it.
    pub fn with_leave_grace(mut self, grace: Duration) -> Self {
        self.leave_grace = (!grace.is_zero()).then_some(grace);
        self
    }

    /// Set the game time-out; zero disables it.
    pub fn with_game_timeout(mut self, timeout: Duration) -> Self {
        self.game_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }
}

/// What a timer does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// A participant's leave grace period ran out.
    LeaveGrace {
        room: RoomId,
        participant: ParticipantId,
        generation: u64,
    },
    /// A game ran out of time.
    GameTimeout { room: RoomId, generation: u64 },
}

/// A timer to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    /// Delay before firing.
    pub after: Duration,
    /// Event to feed back when it fires.
    pub kind: TimerKind,
}

/// Output of one adapter call.
#[derive(Debug, Default)]
pub struct Reaction {
    /// Payloads for the chat server, in order.
    pub payloads: Vec<Payload>,
    /// Timers to start.
    pub timers: Vec<Timer>,
}

/// Chat-server facing front of a [`SessionRegistry`].
#[derive(Debug)]
pub struct Adapter {
    registry: SessionRegistry,
    timing: Timing,
    away: HashMap<(RoomId, ParticipantId), u64>,
    clocks: HashMap<RoomId, u64>,
    next_generation: u64,
}

impl Adapter {
    /// Wrap a registry.
    pub fn new(registry: SessionRegistry, timing: Timing) -> Self {
        Self {
            registry,
            timing,
            away: HashMap::new(),
            clocks: HashMap::new(),
            next_generation: 0,
        }
    }

    /// The wrapped registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Dispatch one inbound event.
    pub fn handle(&mut self, inbound: Inbound) -> Reaction {
        match inbound {
            Inbound::Join { room, user } => self.on_participant_join(&room, &user),
            Inbound::Guess { room, user, text } => self.on_guess_message(&room, &user, &text),
            Inbound::Leave { room, user } => self.on_participant_leave(&room, &user),
            Inbound::Close { room } => self.on_room_closed(&room),
        }
    }

    /// A user entered `room`.
    pub fn on_participant_join(&mut self, room: &RoomId, user: &ParticipantId) -> Reaction {
        let mut reaction = Reaction::default();
        let returning = self
            .away
            .remove(&(room.clone(), user.clone()))
            .is_some();

        match self.registry.join(room, user) {
            Ok(events) => {
                if returning {
                    info!("Room {room}: {user} rejoined within the grace period");
                    if let Some(partner) = self.partner_of(room, user) {
                        reaction.payloads.push(render::notice(
                            room,
                            Some(&partner),
                            &format!("{user} has joined the game."),
                        ));
                    }
                }
                self.deliver(room, &events, &mut reaction);
            }
            Err(e) => self.reject(room, user, &e, &mut reaction),
        }
        reaction
    }

    /// A user sent a guess.
    pub fn on_guess_message(
        &mut self,
        room: &RoomId,
        user: &ParticipantId,
        text: &str,
    ) -> Reaction {
        let mut reaction = Reaction::default();
        if text.trim().is_empty() {
            reaction
                .payloads
                .push(render::warning(room, Some(user), render::EMPTY_GUESS));
            return reaction;
        }

        match self.registry.submit_guess(room, user, text) {
            Ok(events) => self.deliver(room, &events, &mut reaction),
            Err(e) => self.reject(room, user, &e, &mut reaction),
        }
        reaction
    }

    /// A user left `room`.
    pub fn on_participant_leave(&mut self, room: &RoomId, user: &ParticipantId) -> Reaction {
        let mut reaction = Reaction::default();
        let partner = self.partner_of(room, user);

        if let (Some(after), Some(partner), true) =
            (self.timing.leave_grace, partner, self.is_running(room))
        {
            let generation = self.next_generation();
            self.away.insert((room.clone(), user.clone()), generation);
            info!(
                "Room {room}: {user} left, waiting {}s for them to return",
                after.as_secs()
            );
            reaction.payloads.push(render::notice(
                room,
                Some(&partner),
                &format!("{user} has left the game. Please wait a bit, your partner may rejoin."),
            ));
            reaction.timers.push(Timer {
                after,
                kind: TimerKind::LeaveGrace {
                    room: room.clone(),
                    participant: user.clone(),
                    generation,
                },
            });
            return reaction;
        }

        let events = self.registry.leave(room, user);
        self.deliver(room, &events, &mut reaction);
        reaction
    }

    /// The chat server closed `room`.
    pub fn on_room_closed(&mut self, room: &RoomId) -> Reaction {
        let mut reaction = Reaction::default();
        let events = self.registry.close(room);
        self.deliver(room, &events, &mut reaction);
        self.forget(room);
        reaction
    }

    /// A timer started by an earlier reaction fired.
    pub fn on_timer(&mut self, kind: TimerKind) -> Reaction {
        let mut reaction = Reaction::default();
        match kind {
            TimerKind::LeaveGrace {
                room,
                participant,
                generation,
            } => {
                let key = (room, participant);
                if self.away.get(&key) != Some(&generation) {
                    debug!("Room {}: stale grace timer for {}", key.0, key.1);
                    return reaction;
                }
                self.away.remove(&key);
                let (room, participant) = key;
                info!("Room {room}: {participant} did not come back");
                let events = self.registry.leave(&room, &participant);
                self.deliver(&room, &events, &mut reaction);
            }
            TimerKind::GameTimeout { room, generation } => {
                if self.clocks.get(&room) != Some(&generation) {
                    debug!("Room {room}: stale game timer");
                    return reaction;
                }
                let events = self.registry.abort(&room, AbortReason::TimedOut);
                self.deliver(&room, &events, &mut reaction);
            }
        }
        reaction
    }

    /// Render `events` and keep the room's timers in step with them: every
    /// room-wide `GameStarted` starts a fresh game clock, `RoomFinished`
    /// drops all timers of the room.
    fn deliver(&mut self, room: &RoomId, events: &[Outbound], reaction: &mut Reaction) {
        for outbound in events {
            reaction.payloads.extend(render::render(room, outbound));
            match (&outbound.audience, &outbound.event) {
                (Audience::Room, SessionEvent::GameStarted { .. }) => {
                    self.start_clock(room, reaction);
                }
                (_, SessionEvent::RoomFinished { .. }) => self.forget(room),
                _ => {}
            }
        }
    }

    fn reject(
        &self,
        room: &RoomId,
        user: &ParticipantId,
        error: &SlError,
        reaction: &mut Reaction,
    ) {
        warn!("Room {room}: rejected input from {user}: {error}");
        let outbound = Outbound::to(user, render::rejection(error));
        reaction.payloads.extend(render::render(room, &outbound));
    }

    fn start_clock(&mut self, room: &RoomId, reaction: &mut Reaction) {
        let Some(after) = self.timing.game_timeout else {
            return;
        };
        let generation = self.next_generation();
        self.clocks.insert(room.clone(), generation);
        reaction.timers.push(Timer {
            after,
            kind: TimerKind::GameTimeout {
                room: room.clone(),
                generation,
            },
        });
    }

    fn forget(&mut self, room: &RoomId) {
        self.clocks.remove(room);
        self.away.retain(|(r, _), _| r != room);
    }

    fn is_running(&self, room: &RoomId) -> bool {
        self.registry
            .get(room)
            .is_some_and(|s| s.status() == SessionStatus::InProgress)
    }

    fn partner_of(&self, room: &RoomId, user: &ParticipantId) -> Option<ParticipantId> {
        self.registry
            .get(room)
            .and_then(|s| s.partner_of(user))
            .cloned()
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PluginCommand;
    use sl_core::{Catalog, CatalogOptions, GameConfig, SelectionPolicy};

    fn adapter(timing: Timing) -> Adapter {
        adapter_with_puzzles(timing, 1)
    }

    fn adapter_with_puzzles(timing: Timing, puzzles: u32) -> Adapter {
        let catalog = Catalog::parse(
            "crane\thttps://img.example/crane.jpg\nplant\thttps://img.example/plant.jpg\n",
            &CatalogOptions::default(),
        )
        .unwrap();
        let config = GameConfig::default()
            .with_selection(SelectionPolicy::Sequential)
            .with_puzzles(puzzles);
        Adapter::new(SessionRegistry::new(config, catalog), timing)
    }

    fn room() -> RoomId {
        RoomId::from("r1")
    }

    fn alice() -> ParticipantId {
        ParticipantId::from("alice")
    }

    fn bob() -> ParticipantId {
        ParticipantId::from("bob")
    }

    fn started(timing: Timing) -> Adapter {
        let mut a = adapter(timing);
        assert!(a.on_participant_join(&room(), &alice()).payloads.is_empty());
        let r = a.on_participant_join(&room(), &bob());
        assert!(matches!(
            r.payloads[0],
            Payload::Command {
                command: PluginCommand::WordleInit,
                ..
            }
        ));
        a
    }

    fn messages(reaction: &Reaction) -> Vec<String> {
        reaction
            .payloads
            .iter()
            .filter_map(|p| match p {
                Payload::Text { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_guess_is_warned_about() {
        let mut a = started(Timing::default());
        let r = a.on_guess_message(&room(), &alice(), "   ");
        assert_eq!(r.payloads.len(), 1);
        assert!(messages(&r)[0].contains("You need to provide a guess!"));
        assert!(messages(&r)[0].contains("FireBrick"));
    }

    #[test]
    fn pending_guess_prompts_both() {
        let mut a = started(Timing::default());
        let r = a.on_guess_message(&room(), &alice(), "plant");
        let receivers: Vec<_> = r
            .payloads
            .iter()
            .filter_map(|p| match p {
                Payload::Text { receiver_id, .. } => receiver_id.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(receivers, vec![alice(), bob()]);
    }

    #[test]
    fn agreement_paints_board_and_closes_room() {
        let mut a = started(Timing::default());
        a.on_guess_message(&room(), &alice(), "crane");
        let r = a.on_guess_message(&room(), &bob(), "CRANE");
        assert!(r.payloads.iter().any(|p| matches!(
            p,
            Payload::Command {
                command: PluginCommand::WordleGuess { .. },
                ..
            }
        )));
        assert_eq!(r.payloads.last(), Some(&Payload::ReadOnly { room: room() }));
        assert_eq!(
            a.registry().get(&room()).unwrap().status(),
            SessionStatus::Won
        );
    }

    #[test]
    fn errors_go_privately_to_the_sender() {
        let mut a = adapter(Timing::default());
        let r = a.on_guess_message(&room(), &alice(), "crane");
        match &r.payloads[..] {
            [Payload::Text {
                receiver_id,
                message,
                ..
            }] => {
                assert_eq!(receiver_id.as_ref(), Some(&alice()));
                assert!(message.contains("no game in room r1"));
            }
            other => panic!("unexpected payloads: {other:?}"),
        }
    }

    #[test]
    fn finished_room_refuses_more_input() {
        let mut a = started(Timing::default());
        a.on_guess_message(&room(), &alice(), "crane");
        a.on_guess_message(&room(), &bob(), "crane");

        let r = a.on_guess_message(&room(), &alice(), "crane");
        match &r.payloads[..] {
            [Payload::Text {
                receiver_id,
                message,
                ..
            }] => {
                assert_eq!(receiver_id.as_ref(), Some(&alice()));
                assert!(message.contains("game already finished (won)"));
            }
            other => panic!("unexpected payloads: {other:?}"),
        }

        // A stray join must not start a new game in the read-only room.
        let r = a.on_participant_join(&room(), &ParticipantId::from("carol"));
        assert_eq!(r.payloads.len(), 1);
        assert!(messages(&r)[0].contains("game already finished (won)"));
        assert!(r.timers.is_empty());
        assert_eq!(
            a.registry().get(&room()).unwrap().status(),
            SessionStatus::Won
        );
    }

    #[test]
    fn leave_without_grace_aborts() {
        let mut a = started(Timing::default());
        let r = a.on_participant_leave(&room(), &alice());
        assert!(messages(&r)[0].contains("alice left the game"));
        assert_eq!(r.payloads.last(), Some(&Payload::ReadOnly { room: room() }));
        assert!(r.timers.is_empty());
    }

    #[test]
    fn rejoin_within_grace_cancels_abort() {
        let mut a = started(Timing::default().with_leave_grace(Duration::from_secs(300)));
        a.on_guess_message(&room(), &alice(), "plant");

        let r = a.on_participant_leave(&room(), &alice());
        assert_eq!(r.timers.len(), 1);
        assert!(messages(&r)[0].contains("your partner may rejoin"));
        let timer = r.timers[0].kind.clone();

        let r = a.on_participant_join(&room(), &alice());
        assert!(messages(&r)[0].contains("alice has joined the game."));
        // Replay: board reset, image, greeting and the pending guess.
        assert!(r.payloads.iter().any(|p| matches!(p, Payload::Image { .. })));

        assert!(a.on_timer(timer).payloads.is_empty());
        assert_eq!(
            a.registry().get(&room()).unwrap().status(),
            SessionStatus::InProgress
        );
    }

    #[test]
    fn grace_expiry_aborts() {
        let mut a = started(Timing::default().with_leave_grace(Duration::from_secs(300)));
        let r = a.on_participant_leave(&room(), &bob());
        let r = a.on_timer(r.timers[0].kind.clone());
        assert!(messages(&r)[0].contains("bob left the game"));
        assert_eq!(
            a.registry().get(&room()).unwrap().status(),
            SessionStatus::Aborted
        );
    }

    #[test]
    fn game_timeout_aborts_only_current_game() {
        let mut a = adapter(Timing::default().with_game_timeout(Duration::from_secs(900)));
        a.on_participant_join(&room(), &alice());
        let r = a.on_participant_join(&room(), &bob());
        assert_eq!(r.timers.len(), 1);
        let timer = r.timers[0].kind.clone();

        let r = a.on_timer(timer.clone());
        assert!(messages(&r)[0].contains("time is up"));
        assert_eq!(r.payloads.last(), Some(&Payload::ReadOnly { room: room() }));
        assert_eq!(
            a.registry().get(&room()).unwrap().status(),
            SessionStatus::Aborted
        );

        // The timed-out room stays finished.
        let r = a.on_participant_join(&room(), &alice());
        assert!(messages(&r)[0].contains("game already finished (aborted)"));

        // Once closed and reopened, the old timer no longer applies.
        a.on_room_closed(&room());
        a.on_participant_join(&room(), &alice());
        let r = a.on_participant_join(&room(), &bob());
        assert_eq!(r.timers.len(), 1);
        assert!(a.on_timer(timer).payloads.is_empty());
        assert_eq!(
            a.registry().get(&room()).unwrap().status(),
            SessionStatus::InProgress
        );
    }

    #[test]
    fn next_puzzle_follows_a_win_and_restarts_the_clock() {
        let mut a = adapter_with_puzzles(
            Timing::default().with_game_timeout(Duration::from_secs(900)),
            2,
        );
        a.on_participant_join(&room(), &alice());
        let first = a.on_participant_join(&room(), &bob()).timers[0].kind.clone();

        a.on_guess_message(&room(), &alice(), "crane");
        let r = a.on_guess_message(&room(), &bob(), "crane");
        assert!(!r.payloads.contains(&Payload::ReadOnly { room: room() }));
        assert!(messages(&r).iter().any(|m| m.contains("YOU WON")));
        let summary = "Your total score is: 100. Ok, let's get both of you the next image. 1 to go!";
        assert!(messages(&r).iter().any(|m| m.contains(summary)));
        assert!(r.payloads.contains(&Payload::Image {
            room: room(),
            receiver_id: None,
            src: "https://img.example/plant.jpg".into(),
        }));
        assert_eq!(r.timers.len(), 1);
        let second = r.timers[0].kind.clone();

        // The first puzzle's clock no longer applies.
        assert!(a.on_timer(first).payloads.is_empty());

        a.on_guess_message(&room(), &alice(), "plant");
        let r = a.on_guess_message(&room(), &bob(), "plant");
        assert!(messages(&r)
            .iter()
            .any(|m| m.contains("Together you got 200 points for 2 puzzle(s).")));
        assert_eq!(r.payloads.last(), Some(&Payload::ReadOnly { room: room() }));
        assert!(a.on_timer(second).payloads.is_empty());
    }

    #[test]
    fn close_marks_room_read_only() {
        let mut a = started(Timing::default());
        let r = a.on_room_closed(&room());
        assert!(messages(&r)[0].contains("the room was closed"));
        assert_eq!(r.payloads.last(), Some(&Payload::ReadOnly { room: room() }));
        assert!(a.on_room_closed(&room()).payloads.is_empty());
    }
}
