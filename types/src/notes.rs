//! Note rules and the entries they gate.
//!
//! Rules arrive from the backend as JSON ([`RawNoteRule`]) and are turned into
//! immutable [`NoteRule`]s once every entry has its stable id.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::GameState;

/// Separator used to join visible note ids into a composite key.
///
/// Ids never contain it (see [`source_token`]).
pub const COMPOSITE_KEY_SEPARATOR: char = ';';

/// How a note entry is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Inline element that copies its text to the clipboard when clicked
    Click,
    /// Block element
    #[default]
    Text,
}

impl NoteKind {
    /// Map a declared `type` tag to a kind. Anything but `"click"` is text.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("click") => NoteKind::Click,
            _ => NoteKind::Text,
        }
    }

    pub fn is_click(self) -> bool {
        matches!(self, NoteKind::Click)
    }
}

/// A single displayable note with its stable id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    /// HTML fragment
    pub text: String,
}

/// A note entry as written in a note or helper file.
///
/// Bare strings are shorthand for `{"type": "text", "text": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawNote {
    Plain(String),
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        text: String,
    },
}

impl RawNote {
    /// Attach an id, normalizing the shorthand form.
    pub fn into_entry(self, id: String) -> NoteEntry {
        match self {
            RawNote::Plain(text) => NoteEntry {
                id,
                kind: NoteKind::Text,
                text,
            },
            RawNote::Detailed { kind, text } => NoteEntry {
                id,
                kind: NoteKind::from_tag(kind.as_deref()),
                text,
            },
        }
    }
}

/// A note rule as written in a note file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNoteRule {
    #[serde(default)]
    pub min_level: Option<u32>,
    #[serde(default)]
    pub max_level: Option<u32>,
    #[serde(default)]
    pub zones: Option<Vec<String>>,
    pub notes: Vec<RawNote>,
}

/// A loaded note rule: a level range and zone allow-list guarding notes.
///
/// Absent bounds are unbounded; absent zones match every zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRule {
    pub min_level: Option<u32>,
    pub max_level: Option<u32>,
    pub zones: Option<HashSet<String>>,
    pub notes: Vec<NoteEntry>,
}

impl NoteRule {
    /// Build a rule from its file form, assigning ids for `rule_index` within
    /// the source identified by `token`.
    pub fn from_raw(raw: RawNoteRule, token: &str, rule_index: usize) -> Self {
        Self {
            min_level: raw.min_level,
            max_level: raw.max_level,
            zones: raw.zones.map(|zones| zones.into_iter().collect()),
            notes: assign_ids(raw.notes, token, rule_index),
        }
    }

    /// A rule with no level or zone constraints (legacy helper steps).
    pub fn ungated(steps: Vec<RawNote>, token: &str, rule_index: usize) -> Self {
        Self {
            min_level: None,
            max_level: None,
            zones: None,
            notes: assign_ids(steps, token, rule_index),
        }
    }

    /// Whether the rule's level range and zone list admit `state`
    pub fn matches(&self, state: &GameState) -> bool {
        self.min_level.is_none_or(|min| state.level >= min)
            && self.max_level.is_none_or(|max| state.level <= max)
            && self
                .zones
                .as_ref()
                .is_none_or(|zones| zones.contains(&state.zone))
    }
}

fn assign_ids(notes: Vec<RawNote>, token: &str, rule_index: usize) -> Vec<NoteEntry> {
    notes
        .into_iter()
        .enumerate()
        .map(|(entry_index, raw)| raw.into_entry(note_id(token, rule_index, entry_index)))
        .collect()
}

/// Reduce a resource path to an opaque id token.
///
/// Leading `/` and `./` are dropped, the last segment's extension is
/// stripped, path separators become `-`, and anything outside
/// `[A-Za-z0-9_-]` becomes `_`. Distinct paths can share a token
/// (`act 1.json`, `act_1.json`); a rule load makes them unique.
///
/// # Examples
/// ```
/// use actnotes_types::notes::source_token;
/// assert_eq!(source_token("/notes/act1.json"), "notes-act1");
/// assert_eq!(source_token("./notes\\act 2.json"), "notes-act_2");
/// assert_eq!(source_token("v1.2/notes"), "v1_2-notes");
/// ```
pub fn source_token(path: &str) -> String {
    let mut trimmed = path;
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }

    let segment_start = trimmed.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let stem = match trimmed[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => &trimmed[..segment_start + dot],
        _ => trimmed,
    };

    stem.chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}

/// Deterministic id for an entry of a rule within a source.
pub fn note_id(token: &str, rule_index: usize, entry_index: usize) -> String {
    format!("{}-{}-{}", token, rule_index, entry_index)
}

/// The ordered notes whose rules match the current state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleNoteSet {
    pub entries: Vec<NoteEntry>,
}

impl VisibleNoteSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Composite key: entry ids in order, joined with `;`
    pub fn key(&self) -> String {
        let mut key = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                key.push(COMPOSITE_KEY_SEPARATOR);
            }
            key.push_str(&entry.id);
        }
        key
    }
}
