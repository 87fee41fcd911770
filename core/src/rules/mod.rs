//! Note rules: loading and matching
//!
//! ```text
//!   GET /helper ─┐                      GameState (each poll)
//!   GET /note  ──┼─► RuleStore::load ─► RuleSet ──► match_notes ──► VisibleNoteSet
//!   per-file   ──┘
//! ```
//!
//! A `RuleSet` is immutable. Reloading builds a new one and swaps it in.

mod matcher;
mod store;

pub use matcher::match_notes;
pub use store::{RuleSet, RuleSource, RuleStore, SourceKind};
