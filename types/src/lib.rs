//! Shared types for actnotes.
//!
//! Kept free of I/O so both the engine and any front end can depend on it.

pub mod formatting;
pub mod notes;
pub mod state;

pub use notes::{NoteEntry, NoteKind, NoteRule, RawNote, RawNoteRule, VisibleNoteSet};
pub use state::{ClientData, ClientRequest, DEFAULT_CLIENT, GameState};
