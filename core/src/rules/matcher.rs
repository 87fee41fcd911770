use actnotes_types::{GameState, NoteRule, VisibleNoteSet};

/// Collect the notes of every rule admitting `state`, in rule order.
///
/// Each rule is checked exactly once and entries keep their declared order.
pub fn match_notes(rules: &[NoteRule], state: &GameState) -> VisibleNoteSet {
    let entries = rules
        .iter()
        .filter(|rule| rule.matches(state))
        .flat_map(|rule| rule.notes.iter().cloned())
        .collect();
    VisibleNoteSet { entries }
}
