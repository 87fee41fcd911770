pub mod backend;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
pub mod render;
pub mod rules;
pub mod ticker;
pub mod timer;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use backend::{Backend, HttpBackend};
pub use clipboard::Clipboard;
pub use config::{AppConfig, resolve_client};
pub use controller::{ControllerStatus, OverlayController, PollOutcome};
pub use error::{BackendError, ClipboardError, ConfigError, LoadError, PollError, RenderError};
pub use render::{NodeLayout, NoteSurface, RenderDiffer, RenderOutcome, RenderedNote};
pub use rules::{RuleSet, RuleStore, match_notes};
pub use ticker::{Tick, Ticker};
pub use timer::{Clock, SystemClock, TimerEngine, TimerMode, TimerState};
