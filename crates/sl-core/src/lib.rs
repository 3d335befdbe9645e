//! Collaborative guess synchronization engine for two-player image Wordle.
//!
//! Two participants share one target word and see its image. A guess only
//! counts once both have submitted the same word in the same round; the
//! agreed guess is scored letter by letter, and the game ends when the word
//! is found or the attempt limit runs out.
//!
//! The crate performs no I/O beyond loading data files. Every session
//! operation returns [`Outbound`] events for a messaging adapter to deliver.

pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod feedback;
pub mod ids;
pub mod lexicon;
pub mod registry;
pub mod round;
pub mod scoring;
pub mod session;
pub mod word;

pub use catalog::{Catalog, Pair, Selection};
pub use config::{CatalogOptions, DuplicatePolicy, GameConfig, ResubmitPolicy, SelectionPolicy};
pub use error::{SlError, SlResult};
pub use event::{AbortReason, Audience, Outbound, SessionEvent};
pub use feedback::{LetterStatus, evaluate, is_win};
pub use ids::{ParticipantId, RoomId};
pub use lexicon::Lexicon;
pub use registry::SessionRegistry;
pub use round::{Round, RoundState, SubmitOutcome, Submission};
pub use session::{Session, SessionStatus};
