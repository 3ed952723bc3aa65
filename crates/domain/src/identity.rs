//! Server identity — what the accessory server persists about itself.
//!
//! The device id is generated once and never changes; controllers use it to
//! recognise the accessory. The configuration number (`c#`) is bumped
//! whenever the published accessory database differs from the one recorded
//! at the previous start.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Six-byte device identifier, written `AA:BB:CC:DD:EE:FF`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId([u8; 6]);

impl DeviceId {
    /// Generate a random device id.
    #[must_use]
    pub fn random() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&uuid.as_bytes()[..6]);
        Self(bytes)
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({self})")
    }
}

/// Error returned when a device id string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid device id {0:?}")]
pub struct InvalidDeviceId(pub String);

impl FromStr for DeviceId {
    type Err = InvalidDeviceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or_else(|| InvalidDeviceId(s.to_string()))?;
            if part.len() != 2 {
                return Err(InvalidDeviceId(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| InvalidDeviceId(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(InvalidDeviceId(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Persistent identity of the accessory server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIdentity {
    pub device_id: DeviceId,
    /// Published as the `c#` discovery field, which only carries 1..=65535.
    pub config_number: u16,
    /// Accessory database published at the last start.
    #[serde(default)]
    pub layout: String,
}

impl ServerIdentity {
    /// Fresh identity for a server that was never started before.
    #[must_use]
    pub fn generate(layout: impl Into<String>) -> Self {
        Self {
            device_id: DeviceId::random(),
            config_number: 1,
            layout: layout.into(),
        }
    }

    /// Record the current accessory database, bumping the configuration
    /// number when it changed. Returns whether a bump happened.
    ///
    /// The number wraps back to 1 after 65535.
    pub fn reconcile(&mut self, layout: &str) -> bool {
        if self.layout == layout {
            return false;
        }
        self.layout = layout.to_string();
        self.config_number = match self.config_number.checked_add(1) {
            Some(next) => next,
            None => 1,
        };
        true
    }
}
