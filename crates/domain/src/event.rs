//! Event — an immutable record of a characteristic value change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::characteristic::CharacteristicValue;
use crate::id::{Aid, CharacteristicRef, ControllerId, EventId, Iid};

/// Who caused a characteristic change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UpdateOrigin {
    /// A paired controller wrote the value over the network.
    Remote { controller: Option<ControllerId> },
    /// The accessory itself changed the value.
    Local,
}

impl UpdateOrigin {
    #[must_use]
    pub fn is_remote(self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// A characteristic value change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicEvent {
    pub id: EventId,
    pub aid: Aid,
    pub iid: Iid,
    /// New value; `None` for write-only characteristics such as Identify.
    pub value: Option<CharacteristicValue>,
    pub origin: UpdateOrigin,
    pub timestamp: DateTime<Utc>,
}

impl CharacteristicEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(
        target: CharacteristicRef,
        value: Option<CharacteristicValue>,
        origin: UpdateOrigin,
    ) -> Self {
        Self {
            id: EventId::new(),
            aid: target.aid,
            iid: target.iid,
            value,
            origin,
            timestamp: Utc::now(),
        }
    }

    /// Address of the characteristic that changed.
    #[must_use]
    pub fn target(&self) -> CharacteristicRef {
        CharacteristicRef::new(self.aid, self.iid)
    }
}
