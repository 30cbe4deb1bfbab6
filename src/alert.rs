//! Self-clearing motion alert.
//!
//! [`AlertTimer::trigger`] raises the alert flag and schedules it to drop
//! back to `false` after a fixed delay. Triggering again before the delay
//! elapses restarts the delay, so a burst of motion produces a single clear,
//! timed from the last trigger.
//!
//! ```text
//!   trigger()            expiry elapsed
//!  Clear ─────► Raised ────────────────► Clear
//!                 │  ▲
//!                 └──┘ trigger() restarts the timer
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// ---

/// Delay used when the configuration does not override it.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Pending {
    /// Bumped on every trigger; a timer only clears the flag if it still
    /// holds the latest generation.
    generation: u64,
    timer: Option<JoinHandle<()>>,
    clears: u64,
}

#[derive(Debug)]
pub struct AlertTimer {
    expiry: Duration,
    flag: Arc<watch::Sender<bool>>,
    pending: Arc<Mutex<Pending>>,
}

impl AlertTimer {
    pub fn new(expiry: Duration) -> Self {
        // ---
        let (flag, _) = watch::channel(false);
        Self {
            expiry,
            flag: Arc::new(flag),
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    pub fn is_raised(&self) -> bool {
        *self.flag.borrow()
    }

    /// Number of times the alert has expired since creation.
    pub fn clear_count(&self) -> u64 {
        self.pending.lock().clears
    }

    /// Raise the alert and (re)start the expiry timer.
    ///
    /// The timer runs on the current Tokio runtime. Outside a runtime the
    /// alert could never expire, so it is left untouched and a warning is
    /// logged instead.
    pub fn trigger(&self) {
        // ---
        let Ok(runtime) = Handle::try_current() else {
            warn!("No Tokio runtime available, motion alert not raised");
            return;
        };

        let mut pending = self.pending.lock();
        if let Some(timer) = pending.timer.take() {
            timer.abort();
            debug!("Motion alert re-triggered, restarting expiry timer");
        }
        pending.generation += 1;
        self.flag.send_replace(true);

        let generation = pending.generation;
        let expiry = self.expiry;
        let flag = Arc::clone(&self.flag);
        let shared = Arc::clone(&self.pending);

        pending.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(expiry).await;

            let mut pending = shared.lock();
            if pending.generation != generation {
                return;
            }
            pending.timer = None;
            pending.clears += 1;
            flag.send_replace(false);
            debug!("Motion alert expired after {:?}", expiry);
        }));
    }
}

impl Drop for AlertTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.lock().timer.take() {
            timer.abort();
        }
    }
}
