//! Overlay controller
//!
//! Owns every piece of runtime state (rules, render differ, timer, surface)
//! and the two periodic tasks:
//!
//! - **poll**: fetch state → match rules → render, then sleep. One cycle at a
//!   time; a failed cycle is logged and the loop carries on.
//! - **timer**: refresh the timer display every tick while the timer runs.
//!
//! Lock order: differ → surface, timer → surface. Nothing takes them the
//! other way round.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use actnotes_types::{ClientData, GameState};
use tracing::{debug, error, info, warn};

use crate::backend::Backend;
use crate::clipboard::Clipboard;
use crate::config::AppConfig;
use crate::error::{ClipboardError, LoadError, PollError};
use crate::poller::StatePoller;
use crate::render::{NoteSurface, RenderDiffer, RenderOutcome};
use crate::rules::{RuleSet, RuleStore, match_notes};
use crate::ticker::{Tick, Ticker};
use crate::timer::{Clock, TimerEngine, TimerMode, TimerState};

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The backend has nothing for this client yet; display untouched
    NoData,
    Updated {
        state: GameState,
        /// Visible note count, `None` when rules are not loaded
        visible: Option<usize>,
        render: Option<RenderOutcome>,
    },
}

/// Snapshot for status displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerStatus {
    pub client: String,
    pub state: Option<GameState>,
    /// Number of loaded rules, `None` if loading failed or never ran
    pub rules: Option<usize>,
    pub rendered_key: Option<String>,
    pub clickable: Vec<String>,
    pub timer: TimerState,
    pub timer_mode: TimerMode,
    pub timer_text: String,
    pub polling: bool,
}

struct Shared {
    config: AppConfig,
    backend: Arc<dyn Backend>,
    poller: StatePoller,
    store: RuleStore,
    rules: RwLock<Option<RuleSet>>,
    differ: Mutex<RenderDiffer>,
    timer: Mutex<TimerEngine>,
    surface: Mutex<Box<dyn NoteSurface>>,
    clipboard: Mutex<Box<dyn Clipboard>>,
    clock: Arc<dyn Clock>,
    last_data: Mutex<Option<ClientData>>,
}

impl Shared {
    async fn reload_rules(&self) -> Result<usize, LoadError> {
        match self.store.load(self.backend.as_ref()).await {
            Ok(set) => {
                let count = set.len();
                let mut differ = lock(&self.differ);
                *write(&self.rules) = Some(set);
                differ.reset();
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "Failed to load note rules");
                lock(&self.surface).show_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn poll_once(&self) -> Result<PollOutcome, PollError> {
        let Some(data) = self.poller.poll().await? else {
            return Ok(PollOutcome::NoData);
        };
        let state = data.state();

        let server_note_changed = {
            let mut last = lock(&self.last_data);
            let previous = last.as_ref().and_then(|d| d.server_note().map(str::to_string));
            let changed = previous.as_deref() != data.server_note();
            *last = Some(data.clone());
            changed
        };

        let mut differ = lock(&self.differ);
        let visible = read(&self.rules)
            .as_ref()
            .map(|set| match_notes(set.rules(), &state));

        let mut surface = lock(&self.surface);
        surface.set_state(&state);
        if server_note_changed {
            surface.set_server_note(data.server_note());
        }
        let render = visible
            .as_ref()
            .map(|visible| differ.render(visible, &mut **surface));

        Ok(PollOutcome::Updated {
            state,
            visible: visible.map(|v| v.len()),
            render,
        })
    }

    fn poll_interval(&self) -> std::time::Duration {
        self.config.poll_interval(read(&self.rules).is_some())
    }

    fn timer_tick(&self) -> Tick {
        let timer = lock(&self.timer);
        if !timer.is_running() {
            return Tick::Halt;
        }
        let text = timer.display(self.clock.now_ms());
        lock(&self.surface).set_timer(&text);
        Tick::Again(self.config.timer_tick())
    }
}

pub struct OverlayController {
    shared: Arc<Shared>,
    poll_task: Option<Ticker>,
    timer_task: Option<Ticker>,
}

impl OverlayController {
    /// Build a controller polling `config.client`. Nothing runs until [`init`].
    ///
    /// [`init`]: OverlayController::init
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn Backend>,
        surface: Box<dyn NoteSurface>,
        clipboard: Box<dyn Clipboard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let shared = Shared {
            poller: StatePoller::new(Arc::clone(&backend), config.client.clone()),
            store: RuleStore::from_config(&config),
            timer: Mutex::new(TimerEngine::new(config.countdown_lead_ms)),
            rules: RwLock::new(None),
            differ: Mutex::new(RenderDiffer::new()),
            surface: Mutex::new(surface),
            clipboard: Mutex::new(clipboard),
            last_data: Mutex::new(None),
            backend,
            clock,
            config,
        };
        Self {
            shared: Arc::new(shared),
            poll_task: None,
            timer_task: None,
        }
    }

    pub fn client(&self) -> &str {
        self.shared.poller.client()
    }

    /// Load the rules, then start polling.
    ///
    /// A failed load is shown on the surface and returned; polling still
    /// starts, without note matching.
    pub async fn init(&mut self) -> Result<usize, LoadError> {
        let loaded = self.shared.reload_rules().await;
        self.start_polling();
        loaded
    }

    /// Replace the rule set with a fresh load. On failure the current set stays.
    pub async fn reload(&self) -> Result<usize, LoadError> {
        self.shared.reload_rules().await
    }

    pub fn start_polling(&mut self) {
        if self.is_polling() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        self.poll_task = Some(Ticker::spawn("poll", move || {
            let shared = Arc::clone(&shared);
            async move {
                if let Err(e) = shared.poll_once().await {
                    warn!(error = %e, "Poll failed");
                }
                Tick::Again(shared.poll_interval())
            }
        }));
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Run a single poll cycle outside the loop
    pub async fn poll_once(&self) -> Result<PollOutcome, PollError> {
        self.shared.poll_once().await
    }

    pub fn start_timer(&mut self) {
        let now = self.shared.clock.now_ms();
        lock(&self.shared.timer).start(now);
        info!("Timer started");
        self.restart_timer_loop();
        self.send_reset();
    }

    pub fn start_countdown(&mut self) {
        let now = self.shared.clock.now_ms();
        lock(&self.shared.timer).countdown(now);
        info!(lead_ms = self.shared.config.countdown_lead_ms, "Countdown started");
        self.restart_timer_loop();
        self.send_reset();
    }

    pub fn stop_timer(&mut self) {
        lock(&self.shared.timer).stop();
        if let Some(task) = self.timer_task.take() {
            task.cancel();
        }
        info!("Timer stopped");
    }

    pub fn timer_state(&self) -> TimerState {
        lock(&self.shared.timer).state()
    }

    pub fn timer_mode(&self) -> TimerMode {
        lock(&self.shared.timer).mode(self.shared.clock.now_ms())
    }

    pub fn timer_text(&self) -> String {
        lock(&self.shared.timer).display(self.shared.clock.now_ms())
    }

    fn restart_timer_loop(&mut self) {
        if let Some(task) = self.timer_task.take() {
            task.cancel();
        }
        let shared = Arc::clone(&self.shared);
        self.timer_task = Some(Ticker::spawn("timer", move || {
            let shared = Arc::clone(&shared);
            async move { shared.timer_tick() }
        }));
    }

    /// Tell the backend the run restarted. Failures are ignored.
    fn send_reset(&self) {
        let backend = Arc::clone(&self.shared.backend);
        let client = self.client().to_string();
        tokio::spawn(async move {
            if let Err(e) = backend.reset(&client).await {
                debug!(error = %e, "Reset failed");
            }
        });
    }

    /// Click on an enhanced entry: copy its text.
    ///
    /// Returns `Ok(false)` if `id` is not a displayed click-to-copy entry.
    pub fn copy_note(&self, id: &str) -> Result<bool, ClipboardError> {
        let text = lock(&self.shared.differ).copy_text(id).map(str::to_string);
        match text {
            Some(text) => {
                lock(&self.shared.clipboard).set_text(&text)?;
                debug!(id, "Copied note");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Click on the `index`-th (0-based) click-to-copy entry on display.
    /// Returns the copied text.
    pub fn copy_clickable(&self, index: usize) -> Result<Option<String>, ClipboardError> {
        let target = {
            let differ = lock(&self.shared.differ);
            differ.clickable_id(index).and_then(|id| differ.copy_text(id).map(str::to_string))
        };
        match target {
            Some(text) => {
                lock(&self.shared.clipboard).set_text(&text)?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    pub fn status(&self) -> ControllerStatus {
        let (rendered_key, clickable) = {
            let differ = lock(&self.shared.differ);
            (
                differ.key().map(str::to_string),
                differ.clickable_ids().to_vec(),
            )
        };
        ControllerStatus {
            client: self.client().to_string(),
            state: lock(&self.shared.last_data).as_ref().map(ClientData::state),
            rules: read(&self.shared.rules).as_ref().map(RuleSet::len),
            rendered_key,
            clickable,
            timer: self.timer_state(),
            timer_mode: self.timer_mode(),
            timer_text: self.timer_text(),
            polling: self.is_polling(),
        }
    }

    /// Stop both periodic tasks
    pub fn dispose(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.cancel();
        }
        if let Some(task) = self.timer_task.take() {
            task.cancel();
        }
        info!("Overlay disposed");
    }
}
