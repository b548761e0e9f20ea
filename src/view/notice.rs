//! Timed confirmation notice shown after a successful submission.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long the notice stays fully visible.
pub const ENTER_DWELL: Duration = Duration::from_millis(2000);
/// How long the fade-out lasts before the notice is hidden.
pub const EXIT_DWELL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticePhase {
    #[default]
    Hidden,
    Entering,
    Exiting,
}

impl NoticePhase {
    /// CSS class carrying the visual treatment for this phase.
    pub fn class_name(&self) -> &'static str {
        match self {
            NoticePhase::Hidden => "notice-hidden",
            NoticePhase::Entering => "notice-entering",
            NoticePhase::Exiting => "notice-exiting",
        }
    }
}

/// Drives `Hidden -> Entering -> Exiting -> Hidden` on the tokio clock.
///
/// Only one cycle runs at a time: [`start`](Self::start) during a cycle aborts
/// the running timers and begins again at `Entering`. Dropping the sequencer
/// cancels any pending timers.
pub struct NoticeSequencer {
    phase: Arc<watch::Sender<NoticePhase>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for NoticeSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeSequencer {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(NoticePhase::Hidden);
        Self {
            phase: Arc::new(phase),
            task: Mutex::new(None),
        }
    }

    pub fn phase(&self) -> NoticePhase {
        *self.phase.borrow()
    }

    /// Observe phase transitions.
    #[cfg(test)]
    pub fn watch(&self) -> watch::Receiver<NoticePhase> {
        self.phase.subscribe()
    }

    /// Begin a new cycle. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }

        self.phase.send_replace(NoticePhase::Entering);

        let phase = Arc::clone(&self.phase);
        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(ENTER_DWELL).await;
            phase.send_replace(NoticePhase::Exiting);
            tokio::time::sleep(EXIT_DWELL).await;
            phase.send_replace(NoticePhase::Hidden);
        }));
    }

    /// Abort pending timers and hide the notice.
    pub fn cancel(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.phase.send_replace(NoticePhase::Hidden);
    }
}

impl Drop for NoticeSequencer {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
