//! Service — a group of characteristics describing one function of an
//! accessory (its information, a switch, …).

use serde::{Deserialize, Serialize};

use crate::characteristic::{Characteristic, CharacteristicType};
use crate::id::Iid;

/// Well-known service types, serialized as their short type UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "3E")]
    AccessoryInformation,
    #[serde(rename = "49")]
    Switch,
    #[serde(rename = "A2")]
    ProtocolInformation,
}

/// A service and its characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub iid: Iid,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub characteristics: Vec<Characteristic>,
}

impl Service {
    /// First characteristic of the given type.
    #[must_use]
    pub fn characteristic(&self, char_type: CharacteristicType) -> Option<&Characteristic> {
        self.characteristics
            .iter()
            .find(|c| c.char_type == char_type)
    }
}
