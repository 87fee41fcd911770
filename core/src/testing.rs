//! In-memory collaborators for tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actnotes_types::{ClientData, GameState};
use async_trait::async_trait;

use crate::backend::Backend;
use crate::clipboard::Clipboard;
use crate::error::{BackendError, ClipboardError};
use crate::render::{NoteSurface, RenderedNote};
use crate::timer::Clock;

/// Backend serving canned resources and a queue of poll responses.
///
/// When the queue is empty, polls report "no data".
#[derive(Default)]
pub struct FakeBackend {
    resources: Mutex<HashMap<String, String>>,
    states: Mutex<VecDeque<Result<Option<ClientData>, String>>>,
    fetched: Mutex<Vec<String>>,
    pub resets: AtomicUsize,
    pub polls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(self, path: &str, body: &str) -> Self {
        self.set_resource(path, body);
        self
    }

    pub fn set_resource(&self, path: &str, body: &str) {
        self.resources
            .lock()
            .unwrap()
            .insert(path.to_string(), body.to_string());
    }

    pub fn push_state(&self, zone: &str, level: u32) {
        self.push_data(ClientData {
            zone: zone.to_string(),
            level,
            html_note: None,
        });
    }

    pub fn push_data(&self, data: ClientData) {
        self.states.lock().unwrap().push_back(Ok(Some(data)));
    }

    pub fn push_no_data(&self) {
        self.states.lock().unwrap().push_back(Ok(None));
    }

    pub fn push_failure(&self, message: &str) {
        self.states
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Paths requested through `fetch_text`, in order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_state(&self, _client: &str) -> Result<Option<ClientData>, BackendError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        match self.states.lock().unwrap().pop_front() {
            Some(Ok(data)) => Ok(data),
            Some(Err(message)) => Err(BackendError::Other(message)),
            None => Ok(None),
        }
    }

    async fn reset(&self, _client: &str) -> Result<(), BackendError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::Other("reset is not served".to_string()))
    }

    async fn fetch_text(&self, path: &str) -> Result<String, BackendError> {
        self.fetched.lock().unwrap().push(path.to_string());
        self.resources
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                url: path.to_string(),
                status: 404,
            })
    }
}

/// Surface that records what was drawn
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub zone: Option<String>,
    pub level: Option<u32>,
    pub notes: Vec<RenderedNote>,
    pub note_renders: usize,
    pub server_note: Option<String>,
    pub server_note_renders: usize,
    pub timer: Option<String>,
    pub timer_updates: usize,
    pub errors: Vec<String>,
}

impl NoteSurface for RecordingSurface {
    fn set_state(&mut self, state: &GameState) {
        self.zone = Some(state.zone.clone());
        self.level = Some(state.level);
    }

    fn replace_notes(&mut self, nodes: &[RenderedNote]) {
        self.notes = nodes.to_vec();
        self.note_renders += 1;
    }

    fn set_server_note(&mut self, html: Option<&str>) {
        self.server_note = html.map(str::to_string);
        self.server_note_renders += 1;
    }

    fn set_timer(&mut self, text: &str) {
        self.timer = Some(text.to_string());
        self.timer_updates += 1;
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Surface handle that stays inspectable after being moved into a controller
#[derive(Debug, Default, Clone)]
pub struct SharedSurface(pub Arc<Mutex<RecordingSurface>>);

impl SharedSurface {
    pub fn snapshot(&self) -> RecordingSurface {
        self.0.lock().unwrap().clone()
    }
}

impl NoteSurface for SharedSurface {
    fn set_state(&mut self, state: &GameState) {
        self.0.lock().unwrap().set_state(state);
    }

    fn replace_notes(&mut self, nodes: &[RenderedNote]) {
        self.0.lock().unwrap().replace_notes(nodes);
    }

    fn set_server_note(&mut self, html: Option<&str>) {
        self.0.lock().unwrap().set_server_note(html);
    }

    fn set_timer(&mut self, text: &str) {
        self.0.lock().unwrap().set_timer(text);
    }

    fn show_error(&mut self, message: &str) {
        self.0.lock().unwrap().show_error(message);
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard(pub Arc<Mutex<Vec<String>>>);

impl MemoryClipboard {
    pub fn copies(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ManualClock(pub Arc<AtomicI64>);

impl ManualClock {
    pub fn at(now_ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now_ms)))
    }

    pub fn advance(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}
