//! Plain-text surface for terminals
//!
//! Click-to-copy entries are numbered `[n]` in display order, matching the
//! `copy <n>` command.

use std::io::Write;

use actnotes_core::render::text_content;
use actnotes_core::{NoteSurface, RenderedNote};
use actnotes_types::GameState;
use tracing::debug;

pub struct TerminalSurface<W: Write + Send> {
    out: W,
    header: Option<GameState>,
    timer: Option<String>,
    /// Print every timer change, not just the first one
    follow_timer: bool,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout(follow_timer: bool) -> Self {
        Self::new(std::io::stdout(), follow_timer)
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W, follow_timer: bool) -> Self {
        Self {
            out,
            header: None,
            timer: None,
            follow_timer,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            debug!(error = %e, "Terminal write failed");
        }
    }
}

/// Terminal lines for a notes region, clickable entries numbered from 1
pub fn format_notes(nodes: &[RenderedNote]) -> Vec<String> {
    let mut clickable = 0;
    nodes
        .iter()
        .map(|node| {
            if node.is_clickable() {
                clickable += 1;
                format!("  [{clickable}] {}", node.text)
            } else {
                format!("  {}", node.text)
            }
        })
        .collect()
}

impl<W: Write + Send> NoteSurface for TerminalSurface<W> {
    /// Prints the zone/level header when either changed
    fn set_state(&mut self, state: &GameState) {
        if self.header.as_ref() == Some(state) {
            return;
        }
        self.emit(&format!("== {} (level {}) ==", state.zone, state.level));
        self.header = Some(state.clone());
    }

    fn replace_notes(&mut self, nodes: &[RenderedNote]) {
        if nodes.is_empty() {
            self.emit("-- no notes --");
            return;
        }
        self.emit("-- notes --");
        for line in format_notes(nodes) {
            self.emit(&line);
        }
    }

    fn set_server_note(&mut self, html: Option<&str>) {
        match html {
            Some(html) => {
                let text = text_content("server", html).unwrap_or_else(|_| html.to_string());
                self.emit(&format!("-- server note --\n  {}", text.trim()));
            }
            None => self.emit("-- server note cleared --"),
        }
    }

    fn set_timer(&mut self, text: &str) {
        if self.timer.as_deref() == Some(text) {
            return;
        }
        let first = self.timer.is_none();
        self.timer = Some(text.to_string());
        if first || self.follow_timer {
            self.emit(&format!("timer {text}"));
        }
    }

    fn show_error(&mut self, message: &str) {
        self.emit(&format!("error: {message}"));
    }
}
