//! Nameserv Core - in-memory hierarchical name server.
//!
//! Services publish an opaque reference under a `/`-delimited path (a
//! *binding*) inside nested containers (*scopes*) so that clients can find
//! them by name. Bindings hold a lease that their owner renews periodically;
//! a background reaper evicts the ones that lapse. Every scope carries a
//! serial number so pollers can skip re-listing a scope that did not change,
//! and the server carries a cookie so clients can notice it restarted.
//!
//! This crate is transport agnostic. The `nameserv-rpc` binary puts it behind
//! a JSON-RPC endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use nameserv_core::{RegistryService, ServiceRef};
//!
//! let service = RegistryService::new();
//! service.initialize(ServiceRef::from("127.0.0.1:13502"))?;
//!
//! service.bind_obj(
//!     "/CIDLib/CIDLogSrv/Primary",
//!     "Primary log server",
//!     Default::default(),
//!     ServiceRef::from("10.0.0.4:13503"),
//! )?;
//! let reply = service.get_object("/CIDLib/CIDLogSrv/Primary")?;
//! assert!(reply.found);
//!
//! service.terminate();
//! ```

pub mod clock;
pub mod config;
pub mod dump;
pub mod error;
pub mod models;
pub mod path;
pub mod reaper;
pub mod registration;
pub mod tree;

mod api;

// Re-export commonly used types
pub use api::RegistryServiceBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LeaseConfig, NameServerConfig, RpcConfig, WellKnownPaths};
pub use dump::DumpFormat;
pub use error::{ErrorKind, NameServerError, Result};
pub use models::{
    BindingInfo, ExistsReply, LookupReply, NameInfo, NameServerInfo, RebindInfo, RebindReply,
    RebindResult, RenewReply, ScopeInfo, ScopeKeys,
};
pub use reaper::{LeaseReaper, LeaseSweep, LogThrottle, ReaperState};
pub use registration::{Extras, Registration, ServiceRef, EXTRA_COUNT};
pub use tree::{NodeType, PathTree};

use std::sync::Arc;

use parking_lot::Mutex;

use api::ServiceState;

/// The name server.
///
/// Every operation takes the single tree lock for its whole body and
/// returns owned copies, so operations are linearizable with respect to each
/// other. Construct one per process and share it by reference; the lease
/// reaper holds its own handle to the shared state.
pub struct RegistryService {
    shared: Arc<ServiceState>,
    reaper: Mutex<Option<LeaseReaper>>,
}

impl RegistryService {
    /// Create a service with default configuration and the system clock.
    ///
    /// Call [`RegistryService::initialize`] before serving requests.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryServiceBuilder {
        RegistryServiceBuilder::new()
    }

    pub fn config(&self) -> &NameServerConfig {
        &self.shared.config
    }
}

impl Default for RegistryService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService")
            .field("cookie", &self.shared.cookie)
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
