//! The value stored at a binding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Number of free-form metadata strings a binding carries.
pub const EXTRA_COUNT: usize = 4;

/// Opaque reference to a remote service endpoint.
///
/// The name server never looks inside it. On the wire it travels as a hex
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ServiceRef(Vec<u8>);

impl ServiceRef {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(encoded: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(encoded).map(Self)
    }
}

impl From<Vec<u8>> for ServiceRef {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for ServiceRef {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl Serialize for ServiceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ServiceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        ServiceRef::from_hex(&encoded).map_err(serde::de::Error::custom)
    }
}

/// The four metadata strings attached to a binding.
pub type Extras = [String; EXTRA_COUNT];

/// A binding's registration: service reference, metadata and lease state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub service_ref: ServiceRef,
    pub extras: Extras,
    pub permanent: bool,
    pub last_renewal: DateTime<Utc>,
}

impl Registration {
    pub fn new(service_ref: ServiceRef, extras: Extras, now: DateTime<Utc>) -> Self {
        Self {
            service_ref,
            extras,
            permanent: false,
            last_renewal: now,
        }
    }

    /// Check whether the lease has run out at `now`.
    ///
    /// Permanent registrations never expire. A renewal time in the future
    /// means the clock went backwards; such a lease counts as expired so the
    /// entry is reset rather than held forever.
    pub fn is_lease_expired(&self, now: DateTime<Utc>, lease: Duration) -> bool {
        if self.permanent {
            return false;
        }
        if now < self.last_renewal {
            return true;
        }
        match (now - self.last_renewal).to_std() {
            Ok(elapsed) => elapsed > lease,
            Err(_) => true,
        }
    }

    pub fn renew(&mut self, now: DateTime<Utc>) {
        self.last_renewal = now;
    }

    /// Replace the service reference and metadata, keeping permanence.
    pub fn refresh(&mut self, service_ref: ServiceRef, extras: Extras, now: DateTime<Utc>) {
        self.service_ref = service_ref;
        self.extras = extras;
        self.last_renewal = now;
    }

    /// Look up an extra value by its 1-based slot.
    pub fn extra(&self, index: u32) -> Option<&str> {
        slot(index).map(|i| self.extras[i].as_str())
    }

    /// Set an extra value by its 1-based slot. Returns false for a bad slot.
    pub fn set_extra(&mut self, index: u32, value: impl Into<String>) -> bool {
        match slot(index) {
            Some(i) => {
                self.extras[i] = value.into();
                true
            }
            None => false,
        }
    }
}

fn slot(index: u32) -> Option<usize> {
    match index {
        1..=4 => Some(index as usize - 1),
        _ => None,
    }
}
