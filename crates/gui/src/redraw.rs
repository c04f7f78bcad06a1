//! Redraw requests.
//!
//! Viewport state is owned by the UI thread. Other execution contexts (the
//! periodic ticker) may only raise [`RedrawSignal`]; the UI loop consumes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Thread-safe "please redraw" flag with an optional wake-up hook
#[derive(Clone, Default)]
pub struct RedrawSignal {
    pending: Arc<AtomicBool>,
    waker: Option<Waker>,
}

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that also calls `waker` on every request (e.g. to wake the UI event loop)
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            pending: Arc::new(AtomicBool::new(false)),
            waker: Some(Arc::new(waker)),
        }
    }

    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
        if let Some(waker) = &self.waker {
            waker();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume a pending request
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for RedrawSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedrawSignal")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Periodic redraw request running on a tokio runtime. Dropping it stops the task.
pub struct RedrawTicker {
    task: JoinHandle<()>,
}

impl RedrawTicker {
    pub fn spawn(runtime: &Handle, interval: Duration, signal: RedrawSignal) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let task = runtime.spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticks.tick().await;
            loop {
                ticks.tick().await;
                signal.request();
            }
        });
        tracing::debug!("Redraw ticker started ({interval:?})");
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RedrawTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
