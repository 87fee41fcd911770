//! Render diffing
//!
//! The differ owns the composite key of what is currently displayed and the
//! set of click-to-copy entries it has already wired. A poll that produces
//! the same visible set leaves the surface untouched.

mod html;

pub use html::text_content;

use std::collections::HashMap;

use actnotes_types::{GameState, NoteEntry, VisibleNoteSet};
use tracing::{debug, warn};

use crate::error::RenderError;

/// Where the overlay draws. Implemented by the front end.
pub trait NoteSurface: Send {
    /// Zone and level, always updated together
    fn set_state(&mut self, state: &GameState);

    /// Replace the whole notes region with `nodes`, in order
    fn replace_notes(&mut self, nodes: &[RenderedNote]);

    /// Server-rendered note; `None` clears it
    fn set_server_note(&mut self, html: Option<&str>);

    fn set_timer(&mut self, text: &str);

    /// Show a persistent error (e.g. rules failed to load)
    fn show_error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLayout {
    /// Clickable, copies its text
    Inline,
    Block,
}

/// One rendered node of the notes region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNote {
    pub id: String,
    pub layout: NodeLayout,
    pub html: String,
    /// Literal text content (what a click copies)
    pub text: String,
}

impl RenderedNote {
    pub fn from_entry(entry: &NoteEntry) -> Result<Self, RenderError> {
        let text = text_content(&entry.id, &entry.text)?;
        let layout = if entry.kind.is_click() {
            NodeLayout::Inline
        } else {
            NodeLayout::Block
        };
        Ok(Self {
            id: entry.id.clone(),
            layout,
            html: entry.text.clone(),
            text,
        })
    }

    pub fn is_clickable(&self) -> bool {
        self.layout == NodeLayout::Inline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Same composite key as last time; surface untouched
    Unchanged,
    Rendered {
        nodes: usize,
        skipped: usize,
        /// Click-to-copy entries wired by this pass
        enhanced: usize,
    },
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered { .. })
    }
}

#[derive(Debug, Default)]
pub struct RenderDiffer {
    /// `None` until the first render (or after a reset)
    key: Option<String>,
    /// Enhanced entries: id -> literal text a click copies
    copy_targets: HashMap<String, String>,
    /// Clickable ids in display order
    clickable: Vec<String>,
}

impl RenderDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite key of the last render
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Render `set` unless it is what is already displayed.
    pub fn render<S: NoteSurface + ?Sized>(
        &mut self,
        set: &VisibleNoteSet,
        surface: &mut S,
    ) -> RenderOutcome {
        let key = set.key();
        if self.key.as_deref() == Some(key.as_str()) {
            return RenderOutcome::Unchanged;
        }

        let mut nodes = Vec::with_capacity(set.len());
        let mut skipped = 0;
        for entry in &set.entries {
            match RenderedNote::from_entry(entry) {
                Ok(node) => nodes.push(node),
                Err(e) => {
                    warn!(error = %e, "Skipping note");
                    skipped += 1;
                }
            }
        }

        surface.replace_notes(&nodes);
        let enhanced = self.enhance(&nodes);
        debug!(key = %key, nodes = nodes.len(), enhanced, "Notes rendered");
        self.key = Some(key);

        RenderOutcome::Rendered {
            nodes: nodes.len(),
            skipped,
            enhanced,
        }
    }

    /// Wire every clickable node not already enhanced; drop entries that left.
    fn enhance(&mut self, nodes: &[RenderedNote]) -> usize {
        self.clickable = nodes
            .iter()
            .filter(|n| n.is_clickable())
            .map(|n| n.id.clone())
            .collect();
        let clickable = &self.clickable;
        self.copy_targets.retain(|id, _| clickable.contains(id));

        let mut added = 0;
        for node in nodes.iter().filter(|n| n.is_clickable()) {
            if !self.copy_targets.contains_key(&node.id) {
                self.copy_targets.insert(node.id.clone(), node.text.clone());
                added += 1;
            }
        }
        added
    }

    /// Text a click on `id` copies, if `id` is an enhanced entry
    pub fn copy_text(&self, id: &str) -> Option<&str> {
        self.copy_targets.get(id).map(String::as_str)
    }

    /// Id of the `index`-th clickable node (0-based, display order)
    pub fn clickable_id(&self, index: usize) -> Option<&str> {
        self.clickable.get(index).map(String::as_str)
    }

    pub fn clickable_ids(&self) -> &[String] {
        &self.clickable
    }

    pub fn is_enhanced(&self, id: &str) -> bool {
        self.copy_targets.contains_key(id)
    }

    /// Forget what is displayed so the next render always draws.
    pub fn reset(&mut self) {
        self.key = None;
        self.copy_targets.clear();
        self.clickable.clear();
    }
}
