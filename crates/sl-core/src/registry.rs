//! Room id → session mapping, owned by whoever dispatches chat events.

use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};

use crate::catalog::{Catalog, Selection};
use crate::config::GameConfig;
use crate::error::{SlError, SlResult};
use crate::event::{AbortReason, Outbound, SessionEvent};
use crate::ids::{ParticipantId, RoomId};
use crate::lexicon::Lexicon;
use crate::session::{Session, SessionStatus};

/// A room's current puzzle plus the score carried across puzzles.
#[derive(Debug)]
struct Room {
    session: Session,
    puzzle: u32,
    total_points: u32,
}

/// All rooms plus the shared, read-only game data.
///
/// A room is created on the first join and plays `config.puzzles` puzzles,
/// each in its own [`Session`]. Once the last puzzle ends, or any puzzle is
/// aborted, the room's final session stays terminal until [`close`] drops it.
///
/// [`close`]: SessionRegistry::close
#[derive(Debug)]
pub struct SessionRegistry {
    config: GameConfig,
    catalog: Catalog,
    lexicon: Option<Arc<Lexicon>>,
    selection: Selection,
    rooms: HashMap<RoomId, Room>,
    finished: usize,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new(config: GameConfig, catalog: Catalog) -> Self {
        let selection = Selection::from_config(&config);
        Self {
            config,
            catalog,
            lexicon: None,
            selection,
            rooms: HashMap::new(),
            finished: 0,
        }
    }

    /// Restrict guesses to `lexicon`. Catalog words are added to it.
    pub fn with_lexicon(mut self, mut lexicon: Lexicon) -> Self {
        lexicon.extend_from_catalog(&self.catalog);
        self.lexicon = Some(Arc::new(lexicon));
        self
    }

    /// Shared game configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The loaded catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current session of a room, terminal or not, until the room is closed.
    pub fn get(&self, room: &RoomId) -> Option<&Session> {
        self.rooms.get(room).map(|r| &r.session)
    }

    /// 1-based number of the puzzle the room is on.
    pub fn puzzle(&self, room: &RoomId) -> Option<u32> {
        self.rooms.get(room).map(|r| r.puzzle)
    }

    /// Points the room has collected so far.
    pub fn total_points(&self, room: &RoomId) -> Option<u32> {
        self.rooms.get(room).map(|r| r.total_points)
    }

    /// Number of rooms held, finished or not.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is held.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Number of rooms that played their last puzzle or were aborted.
    pub fn finished_count(&self) -> usize {
        self.finished
    }

    /// A participant was assigned to `room`.
    ///
    /// Fails with `SessionTerminal` once the room has finished.
    pub fn join(&mut self, room: &RoomId, participant: &ParticipantId) -> SlResult<Vec<Outbound>> {
        if !self.rooms.contains_key(room) {
            let session = self.new_session(room);
            self.rooms.insert(
                room.clone(),
                Room {
                    session,
                    puzzle: 1,
                    total_points: 0,
                },
            );
        }
        let state = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| SlError::UnknownRoom(room.clone()))?;
        state
            .session
            .join(participant, &self.catalog, &mut self.selection)
    }

    /// A participant sent a guess.
    pub fn submit_guess(
        &mut self,
        room: &RoomId,
        participant: &ParticipantId,
        text: &str,
    ) -> SlResult<Vec<Outbound>> {
        let state = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| SlError::UnknownRoom(room.clone()))?;
        let mut events = state.session.submit_guess(participant, text)?;
        self.settle(room, &mut events);
        Ok(events)
    }

    /// A participant left `room`.
    pub fn leave(&mut self, room: &RoomId, participant: &ParticipantId) -> Vec<Outbound> {
        let mut events = match self.rooms.get_mut(room) {
            Some(state) => state.session.leave(participant),
            None => return Vec::new(),
        };
        self.finish_if_terminal(room, &mut events);
        events
    }

    /// End the room's current puzzle early, e.g. on a time-out. No further
    /// puzzles are played.
    pub fn abort(&mut self, room: &RoomId, reason: AbortReason) -> Vec<Outbound> {
        let mut events = match self.rooms.get_mut(room) {
            Some(state) => state.session.abort(reason),
            None => return Vec::new(),
        };
        self.finish_if_terminal(room, &mut events);
        events
    }

    /// The chat server closed `room`. Aborts any running game and forgets it.
    pub fn close(&mut self, room: &RoomId) -> Vec<Outbound> {
        let events = self.abort(room, AbortReason::RoomClosed);
        self.rooms.remove(room);
        events
    }

    fn new_session(&self, room: &RoomId) -> Session {
        let session = Session::new(room.clone(), self.config.clone());
        match &self.lexicon {
            Some(lexicon) => session.with_lexicon(Arc::clone(lexicon)),
            None => session,
        }
    }

    /// After a guess: score a finished puzzle and either start the next one
    /// with the same pair or finish the room.
    fn settle(&mut self, room: &RoomId, events: &mut Vec<Outbound>) {
        let puzzles = self.config.puzzles;
        let Some(state) = self.rooms.get_mut(room) else {
            return;
        };
        if !matches!(
            state.session.status(),
            SessionStatus::Won | SessionStatus::Lost
        ) {
            return;
        }

        state.total_points += state.session.points();
        events.push(Outbound::room(SessionEvent::PuzzleFinished {
            puzzle: state.puzzle,
            puzzles,
            points: state.session.points(),
            total_points: state.total_points,
        }));

        if state.puzzle >= puzzles {
            self.finish(room, events);
            return;
        }

        let participants = state.session.participants().to_vec();
        let mut next = self.new_session(room);
        let mut started = Vec::new();
        let joined = participants.iter().try_for_each(|participant| {
            started.extend(next.join(participant, &self.catalog, &mut self.selection)?);
            Ok::<(), SlError>(())
        });
        if let Err(e) = joined {
            warn!("Room {room}: could not start the next puzzle: {e}");
            self.finish(room, events);
            return;
        }

        if let Some(state) = self.rooms.get_mut(room) {
            state.puzzle += 1;
            info!(
                "Room {room}: puzzle {} of {puzzles} started, {} point(s) so far",
                state.puzzle, state.total_points
            );
            state.session = next;
        }
        events.extend(started);
    }

    fn finish_if_terminal(&mut self, room: &RoomId, events: &mut Vec<Outbound>) {
        if !events.is_empty()
            && self
                .get(room)
                .is_some_and(|s| s.status().is_terminal())
        {
            self.finish(room, events);
        }
    }

    fn finish(&mut self, room: &RoomId, events: &mut Vec<Outbound>) {
        let Some(state) = self.rooms.get(room) else {
            return;
        };
        self.finished += 1;
        info!(
            "Room {room}: finished as {} after {} puzzle(s) with {} point(s)",
            state.session.status(),
            state.puzzle,
            state.total_points
        );
        events.push(Outbound::room(SessionEvent::RoomFinished {
            puzzles_played: state.puzzle,
            total_points: state.total_points,
        }));
    }
}
