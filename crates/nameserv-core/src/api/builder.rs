//! Builder for configuring RegistryService construction.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::state::ServiceState;
use crate::clock::{Clock, SystemClock};
use crate::config::NameServerConfig;
use crate::RegistryService;

/// Builder for configuring a [`RegistryService`].
///
/// # Example
///
/// ```rust,ignore
/// use nameserv_core::{NameServerConfig, RegistryService};
///
/// let service = RegistryService::builder()
///     .config(NameServerConfig::default().with_no_lease(true))
///     .build();
/// service.initialize(admin_ref)?;
/// ```
pub struct RegistryServiceBuilder {
    config: NameServerConfig,
    clock: Arc<dyn Clock>,
    cookie: Option<u64>,
}

impl Default for RegistryServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: NameServerConfig::default(),
            clock: Arc::new(SystemClock),
            cookie: None,
        }
    }

    /// Runtime configuration. Default: [`NameServerConfig::default`].
    pub fn config(mut self, config: NameServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Time source used for lease bookkeeping.
    ///
    /// Default: the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fix the restart cookie instead of deriving it from the start time.
    ///
    /// Mostly useful for simulating a restart in tests.
    pub fn cookie(mut self, cookie: u64) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn build(self) -> RegistryService {
        let cookie = self.cookie.unwrap_or_else(|| {
            self.clock
                .now()
                .timestamp_nanos_opt()
                .map(|nanos| nanos as u64)
                .unwrap_or_default()
        });
        RegistryService {
            shared: Arc::new(ServiceState::new(self.config, self.clock, cookie)),
            reaper: Mutex::new(None),
        }
    }
}
