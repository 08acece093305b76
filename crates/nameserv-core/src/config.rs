//! Centralized configuration for the name server.
//!
//! Fixed values live as associated constants, grouped by concern. The
//! runtime-tunable subset is collected in [`NameServerConfig`], whose
//! defaults come from those constants.

use std::time::Duration;

/// Lease enforcement and reaper timing.
pub struct LeaseConfig;

impl LeaseConfig {
    /// How long a non-permanent binding survives without a renewal.
    pub const LEASE_DURATION: Duration = Duration::from_secs(180);
    /// How long the reaper sleeps between scans.
    pub const REAPER_INTERVAL: Duration = Duration::from_secs(15);
    /// Upper bound on how long the reaper waits for the tree lock.
    pub const REAPER_LOCK_TIMEOUT: Duration = Duration::from_secs(2);
    /// Minimum spacing between two reaper failure log messages.
    pub const FAILURE_LOG_THROTTLE: Duration = Duration::from_secs(45);
    /// How long shutdown waits for the reaper thread to exit.
    pub const REAPER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Scopes and bindings every name server creates at startup.
pub struct WellKnownPaths;

impl WellKnownPaths {
    pub const ROOT_SCOPE: &'static str = "/CIDLib";
    pub const ROOT_SCOPE_DESC: &'static str = "CIDLib Scope";
    pub const LOG_SERVER_SCOPE: &'static str = "/CIDLib/CIDLogSrv";
    pub const LOG_SERVER_SCOPE_DESC: &'static str = "CIDLib Log Server Scope";
    pub const ADMIN_SCOPE: &'static str = "/CIDLib/CIDNameSrv";
    pub const ADMIN_SCOPE_DESC: &'static str = "Name Server Admin Scope";
    pub const ADMIN_BINDING: &'static str = "/CIDLib/CIDNameSrv/CoreAdmin";
    pub const ADMIN_BINDING_DESC: &'static str = "Name Server Core Admin Object";
}

/// Defaults for the RPC front end.
pub struct RpcConfig;

impl RpcConfig {
    pub const DEFAULT_PORT: u16 = 13502;
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_MAX_CLIENTS: usize = 64;
}

/// Runtime configuration handed to [`crate::RegistryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameServerConfig {
    pub lease_duration: Duration,
    pub reaper_interval: Duration,
    pub reaper_lock_timeout: Duration,
    pub failure_log_throttle: Duration,
    pub reaper_join_timeout: Duration,
    /// Treat every binding as permanent and never start the reaper.
    pub no_lease: bool,
}

impl Default for NameServerConfig {
    fn default() -> Self {
        Self {
            lease_duration: LeaseConfig::LEASE_DURATION,
            reaper_interval: LeaseConfig::REAPER_INTERVAL,
            reaper_lock_timeout: LeaseConfig::REAPER_LOCK_TIMEOUT,
            failure_log_throttle: LeaseConfig::FAILURE_LOG_THROTTLE,
            reaper_join_timeout: LeaseConfig::REAPER_JOIN_TIMEOUT,
            no_lease: false,
        }
    }
}

impl NameServerConfig {
    pub fn with_lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    pub fn with_reaper_interval(mut self, interval: Duration) -> Self {
        self.reaper_interval = interval;
        self
    }

    pub fn with_reaper_lock_timeout(mut self, timeout: Duration) -> Self {
        self.reaper_lock_timeout = timeout;
        self
    }

    pub fn with_failure_log_throttle(mut self, throttle: Duration) -> Self {
        self.failure_log_throttle = throttle;
        self
    }

    pub fn with_reaper_join_timeout(mut self, timeout: Duration) -> Self {
        self.reaper_join_timeout = timeout;
        self
    }

    pub fn with_no_lease(mut self, no_lease: bool) -> Self {
        self.no_lease = no_lease;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_constants() {
        let config = NameServerConfig::default();
        assert_eq!(config.lease_duration, LeaseConfig::LEASE_DURATION);
        assert_eq!(config.reaper_interval, Duration::from_secs(15));
        assert_eq!(config.reaper_lock_timeout, Duration::from_secs(2));
        assert!(!config.no_lease);
    }

    #[test]
    fn test_builder_setters() {
        let config = NameServerConfig::default()
            .with_lease_duration(Duration::from_secs(10))
            .with_no_lease(true);
        assert_eq!(config.lease_duration, Duration::from_secs(10));
        assert!(config.no_lease);
    }

    #[test]
    fn test_well_known_paths_nest() {
        assert!(WellKnownPaths::LOG_SERVER_SCOPE.starts_with(WellKnownPaths::ROOT_SCOPE));
        assert!(WellKnownPaths::ADMIN_BINDING.starts_with(WellKnownPaths::ADMIN_SCOPE));
    }
}
