//! Startup, shutdown and lease maintenance on RegistryService.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ServiceState;
use crate::config::WellKnownPaths;
use crate::error::{NameServerError, Result};
use crate::path;
use crate::reaper::{LeaseReaper, ReaperState};
use crate::registration::{Extras, Registration, ServiceRef};
use crate::tree::NodeType;
use crate::RegistryService;

impl RegistryService {
    /// Create the well-known scopes and the admin binding, then start the
    /// lease reaper unless leases are disabled.
    ///
    /// Calling this again refreshes the admin binding and leaves a running
    /// reaper alone.
    pub fn initialize(&self, admin_ref: ServiceRef) -> Result<()> {
        {
            let mut tree = self.shared.tree.lock();
            tree.create_scope_path(WellKnownPaths::ROOT_SCOPE, WellKnownPaths::ROOT_SCOPE_DESC)?;
            tree.create_scope_path(
                WellKnownPaths::LOG_SERVER_SCOPE,
                WellKnownPaths::LOG_SERVER_SCOPE_DESC,
            )?;
            tree.create_scope_path(WellKnownPaths::ADMIN_SCOPE, WellKnownPaths::ADMIN_SCOPE_DESC)?;

            let mut registration =
                Registration::new(admin_ref, Extras::default(), self.shared.clock.now());
            registration.permanent = true;
            let admin = WellKnownPaths::ADMIN_BINDING;
            if tree.exists(admin) == Some(NodeType::Binding) {
                tree.replace_binding(admin, registration, WellKnownPaths::ADMIN_BINDING_DESC)?;
            } else {
                let (parent, name) = path::split_binding_path(admin)
                    .ok_or_else(|| NameServerError::bad_path(admin))?;
                tree.add_binding(parent, name, registration, WellKnownPaths::ADMIN_BINDING_DESC)?;
            }
        }

        if self.shared.config.no_lease {
            info!("Lease enforcement disabled, bindings never expire");
            return Ok(());
        }

        let mut reaper = self.reaper.lock();
        if reaper.is_none() {
            *reaper = Some(LeaseReaper::start(
                Arc::clone(&self.shared),
                &self.shared.config,
            )?);
        }
        Ok(())
    }

    /// Stop the reaper (bounded wait) and drop the admin binding.
    pub fn terminate(&self) {
        let reaper = self.reaper.lock().take();
        if let Some(mut reaper) = reaper {
            if !reaper.stop() {
                warn!("Continuing shutdown without the lease reaper");
            }
        }

        let removed = self
            .shared
            .tree
            .lock()
            .remove_node(WellKnownPaths::ADMIN_BINDING);
        if removed.is_ok() {
            info!("Removed admin binding {}", WellKnownPaths::ADMIN_BINDING);
        }
    }

    /// Run one lease scan right now, waiting on the lock as long as needed.
    ///
    /// Returns the paths of the evicted bindings. A no-op when leases are
    /// disabled.
    pub fn sweep_expired(&self) -> Vec<String> {
        let evicted = {
            let mut tree = self.shared.tree.lock();
            self.shared.sweep_locked(&mut tree)
        };
        ServiceState::log_evictions(&evicted);
        evicted
    }

    /// State of the reaper thread, or `None` if it is not running.
    pub fn reaper_state(&self) -> Option<ReaperState> {
        self.reaper.lock().as_ref().map(LeaseReaper::state)
    }
}
