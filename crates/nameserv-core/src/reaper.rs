//! Background lease reaper.
//!
//! A dedicated thread wakes up every reaper interval, takes the tree lock
//! with a bounded wait and evicts bindings whose lease ran out. Nothing the
//! sweep does can take the thread down: errors and panics are caught, logged
//! at most once per throttle window, and the loop carries on.

use crate::config::NameServerConfig;
use crate::error::{NameServerError, Result};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Something the reaper can sweep.
pub trait LeaseSweep: Send + Sync + 'static {
    /// Evict expired bindings, waiting at most `lock_timeout` for the lock.
    ///
    /// Returns the full paths of the evicted bindings.
    fn sweep_with_timeout(&self, lock_timeout: Duration) -> Result<Vec<String>>;
}

/// Where the reaper thread currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaperState {
    Sleeping,
    Scanning,
    Terminated,
}

/// Rate limiter for repeated failure messages.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    next_allowed: Option<Instant>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: None,
        }
    }

    /// True if a message may be logged at `now`; arms the next window if so.
    pub fn should_log(&mut self, now: Instant) -> bool {
        match self.next_allowed {
            Some(next) if now < next => false,
            _ => {
                self.next_allowed = Some(now + self.interval);
                true
            }
        }
    }
}

/// Handle to a running reaper thread.
pub struct LeaseReaper {
    stop_tx: Option<mpsc::Sender<()>>,
    done_rx: mpsc::Receiver<()>,
    handle: Option<JoinHandle<()>>,
    state: Arc<Mutex<ReaperState>>,
    join_timeout: Duration,
}

impl LeaseReaper {
    /// Spawn the reaper thread for `target`.
    pub fn start<S: LeaseSweep>(target: Arc<S>, config: &NameServerConfig) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let state = Arc::new(Mutex::new(ReaperState::Sleeping));

        let interval = config.reaper_interval;
        let lock_timeout = config.reaper_lock_timeout;
        let throttle = LogThrottle::new(config.failure_log_throttle);
        let thread_state = Arc::clone(&state);

        let handle = std::thread::Builder::new()
            .name("nameserv-reaper".into())
            .spawn(move || {
                run(target, stop_rx, interval, lock_timeout, throttle, &thread_state);
                *thread_state.lock() = ReaperState::Terminated;
                let _ = done_tx.send(());
            })
            .map_err(|e| {
                NameServerError::Internal(format!("Failed to spawn lease reaper thread: {}", e))
            })?;

        info!("Lease reaper started (interval {:?})", interval);
        Ok(Self {
            stop_tx: Some(stop_tx),
            done_rx,
            handle: Some(handle),
            state,
            join_timeout: config.reaper_join_timeout,
        })
    }

    pub fn state(&self) -> ReaperState {
        *self.state.lock()
    }

    /// Ask the thread to exit and wait for it, up to the join timeout.
    ///
    /// Returns false if the thread did not finish in time; it is then left
    /// detached.
    pub fn stop(&mut self) -> bool {
        // Dropping the sender wakes the sleeping thread just like a send.
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let Some(handle) = self.handle.take() else {
            return true;
        };

        match self.done_rx.recv_timeout(self.join_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    warn!("Lease reaper thread panicked during shutdown");
                }
                info!("Lease reaper stopped");
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Lease reaper did not stop within {:?}, detaching it",
                    self.join_timeout
                );
                false
            }
        }
    }
}

impl Drop for LeaseReaper {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn run<S: LeaseSweep>(
    target: Arc<S>,
    stop_rx: mpsc::Receiver<()>,
    interval: Duration,
    lock_timeout: Duration,
    mut throttle: LogThrottle,
    state: &Mutex<ReaperState>,
) {
    loop {
        *state.lock() = ReaperState::Sleeping;
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                debug!("Lease reaper stopping");
                return;
            }
        }

        *state.lock() = ReaperState::Scanning;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            target.sweep_with_timeout(lock_timeout)
        }));
        let failure = match outcome {
            Ok(Ok(evicted)) => {
                debug!("Lease scan complete, {} binding(s) evicted", evicted.len());
                None
            }
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some("lease scan panicked".to_string()),
        };

        if let Some(message) = failure {
            if throttle.should_log(Instant::now()) {
                error!("Lease reaper failure: {}", message);
            }
        }
    }
}
