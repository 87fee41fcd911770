//! Periodic tasks with an explicit cancel handle

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// What a tick wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Run again after this delay
    Again(Duration),
    Halt,
}

/// A self-rescheduling task. Each tick runs to completion before the delay
/// starts, so ticks never overlap. Dropping the handle cancels the task.
pub struct Ticker {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn on the current tokio runtime. The first tick runs immediately.
    pub fn spawn<F, Fut>(name: &'static str, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Tick> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            while let Tick::Again(delay) = tick().await {
                tokio::time::sleep(delay).await;
            }
            debug!(ticker = name, "Ticker halted");
        });
        Self { name, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
