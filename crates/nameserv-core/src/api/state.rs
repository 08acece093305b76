//! Shared service state and the lease sweep over it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::warn;

use crate::clock::Clock;
use crate::config::NameServerConfig;
use crate::error::{NameServerError, Result};
use crate::reaper::LeaseSweep;
use crate::tree::PathTree;

/// Everything the request handlers and the reaper share.
///
/// One coarse lock guards the whole tree, serial numbers included. The
/// cookie is fixed for the life of the process and needs no lock.
pub(crate) struct ServiceState {
    pub(crate) tree: Mutex<PathTree>,
    pub(crate) cookie: u64,
    pub(crate) config: NameServerConfig,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ServiceState {
    pub(crate) fn new(config: NameServerConfig, clock: Arc<dyn Clock>, cookie: u64) -> Self {
        Self {
            tree: Mutex::new(PathTree::new()),
            cookie,
            config,
            clock,
        }
    }

    /// Evict expired bindings from an already locked tree.
    pub(crate) fn sweep_locked(&self, tree: &mut PathTree) -> Vec<String> {
        if self.config.no_lease {
            return Vec::new();
        }
        let now = self.clock.now();
        let lease = self.config.lease_duration;
        tree.sweep_bindings(|reg| reg.is_lease_expired(now, lease))
    }

    /// Must be called with the tree lock released.
    pub(crate) fn log_evictions(evicted: &[String]) {
        for path in evicted {
            warn!("Lease expired, evicted binding {}", path);
        }
    }
}

impl LeaseSweep for ServiceState {
    fn sweep_with_timeout(&self, lock_timeout: Duration) -> Result<Vec<String>> {
        let evicted = {
            let mut tree = self
                .tree
                .try_lock_for(lock_timeout)
                .ok_or(NameServerError::LockTimeout(lock_timeout))?;
            self.sweep_locked(&mut tree)
        };
        Self::log_evictions(&evicted);
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::registration::{Extras, Registration, ServiceRef};
    use crate::tree::NodeType;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;

    const LEASE: Duration = Duration::from_secs(10);

    /// State holding one binding at `/svc/a` whose lease has already run out.
    fn expired_state() -> Arc<ServiceState> {
        let clock = Arc::new(ManualClock::starting_now());
        let state = Arc::new(ServiceState::new(
            NameServerConfig::default().with_lease_duration(LEASE),
            clock.clone(),
            7,
        ));
        {
            let mut tree = state.tree.lock();
            tree.create_scope_path("/svc", "").unwrap();
            let reg = Registration::new(ServiceRef::from("R1"), Extras::default(), clock.now());
            tree.add_binding("/svc", "a", reg, "").unwrap();
        }
        clock.advance(LEASE * 2);
        state
    }

    #[test]
    fn test_sweep_gives_up_while_tree_is_locked() {
        let state = expired_state();
        let guard = state.tree.lock();

        let sweeper = Arc::clone(&state);
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let started = Instant::now();
            let result = sweeper.sweep_with_timeout(Duration::from_millis(50));
            let _ = tx.send(started.elapsed());
            result
        });

        // The sweep must report back while the lock is still held
        let waited = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(waited >= Duration::from_millis(50));
        assert!(waited < Duration::from_secs(2));
        assert_eq!(guard.exists("/svc/a"), Some(NodeType::Binding));
        drop(guard);

        match handle.join().unwrap() {
            Err(NameServerError::LockTimeout(timeout)) => {
                assert_eq!(timeout, Duration::from_millis(50))
            }
            other => panic!("expected LockTimeout, got {:?}", other),
        }
    }

    #[test]
    fn test_next_sweep_after_timeout_evicts() {
        let state = expired_state();
        {
            let _guard = state.tree.lock();
            let sweeper = Arc::clone(&state);
            let result = thread::spawn(move || sweeper.sweep_with_timeout(Duration::from_millis(20)))
                .join()
                .unwrap();
            assert!(matches!(result, Err(NameServerError::LockTimeout(_))));
        }
        assert_eq!(state.tree.lock().exists("/svc/a"), Some(NodeType::Binding));

        let evicted = state.sweep_with_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(evicted, vec!["/svc/a".to_string()]);
        assert_eq!(state.tree.lock().exists("/svc/a"), None);
    }

    #[test]
    fn test_sweep_is_noop_without_leases() {
        let clock = Arc::new(ManualClock::starting_now());
        let state = ServiceState::new(
            NameServerConfig::default().with_no_lease(true),
            clock.clone(),
            7,
        );
        {
            let mut tree = state.tree.lock();
            tree.create_scope_path("/svc", "").unwrap();
            let reg = Registration::new(ServiceRef::from("R1"), Extras::default(), clock.now());
            tree.add_binding("/svc", "a", reg, "").unwrap();
        }
        clock.advance(Duration::from_secs(3600));
        assert!(state.sweep_with_timeout(Duration::from_millis(50)).unwrap().is_empty());
    }
}
