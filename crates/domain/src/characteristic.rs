//! Characteristic — a single controllable or observable property of an
//! accessory (e.g. a switch's on/off state, the accessory name).

mod value;

pub use value::CharacteristicValue;

use serde::{Deserialize, Serialize};

use crate::id::Iid;

/// Well-known characteristic types, serialized as their short type UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacteristicType {
    #[serde(rename = "14")]
    Identify,
    #[serde(rename = "20")]
    Manufacturer,
    #[serde(rename = "21")]
    Model,
    #[serde(rename = "23")]
    Name,
    #[serde(rename = "25")]
    On,
    #[serde(rename = "30")]
    SerialNumber,
    #[serde(rename = "37")]
    Version,
    #[serde(rename = "52")]
    FirmwareRevision,
}

impl CharacteristicType {
    /// Value format mandated for this type.
    #[must_use]
    pub fn format(self) -> Format {
        match self {
            Self::Identify | Self::On => Format::Bool,
            Self::Manufacturer
            | Self::Model
            | Self::Name
            | Self::SerialNumber
            | Self::Version
            | Self::FirmwareRevision => Format::String,
        }
    }

    /// Permissions mandated for this type.
    #[must_use]
    pub fn permissions(self) -> Vec<Permission> {
        match self {
            Self::Identify => vec![Permission::PairedWrite],
            Self::On => vec![
                Permission::PairedRead,
                Permission::PairedWrite,
                Permission::Events,
            ],
            Self::Manufacturer
            | Self::Model
            | Self::Name
            | Self::SerialNumber
            | Self::Version
            | Self::FirmwareRevision => vec![Permission::PairedRead],
        }
    }
}

/// Wire format of a characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bool,
    Int,
    Float,
    String,
}

impl Format {
    /// Check `value` against this format, returning the normalised value.
    ///
    /// Booleans also accept the integers `0` and `1`; floats accept integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce(self, value: &CharacteristicValue) -> Option<CharacteristicValue> {
        match (self, value) {
            (Self::Bool, CharacteristicValue::Bool(b)) => Some(CharacteristicValue::Bool(*b)),
            (Self::Bool, CharacteristicValue::Int(0)) => Some(CharacteristicValue::Bool(false)),
            (Self::Bool, CharacteristicValue::Int(1)) => Some(CharacteristicValue::Bool(true)),
            (Self::Int, CharacteristicValue::Int(i)) => Some(CharacteristicValue::Int(*i)),
            (Self::Float, CharacteristicValue::Int(i)) => Some(CharacteristicValue::Float(*i as f64)),
            (Self::Float, CharacteristicValue::Float(f)) => Some(CharacteristicValue::Float(*f)),
            (Self::String, CharacteristicValue::String(s)) => {
                Some(CharacteristicValue::String(s.clone()))
            }
            _ => None,
        }
    }
}

/// Characteristic permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// Paired controllers may read the value.
    #[serde(rename = "pr")]
    PairedRead,
    /// Paired controllers may write the value.
    #[serde(rename = "pw")]
    PairedWrite,
    /// Value changes are notified to subscribers.
    #[serde(rename = "ev")]
    Events,
}

/// A characteristic as exposed in the accessory database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    pub iid: Iid,
    #[serde(rename = "type")]
    pub char_type: CharacteristicType,
    pub format: Format,
    pub perms: Vec<Permission>,
    /// Absent for write-only characteristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CharacteristicValue>,
}

impl Characteristic {
    /// Create a characteristic with the format and permissions of `char_type`.
    ///
    /// The initial value is dropped for write-only types.
    #[must_use]
    pub fn new(iid: Iid, char_type: CharacteristicType, value: Option<CharacteristicValue>) -> Self {
        let perms = char_type.permissions();
        let value = if perms.contains(&Permission::PairedRead) {
            value
        } else {
            None
        };
        Self {
            iid,
            char_type,
            format: char_type.format(),
            perms,
            value,
        }
    }

    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.perms.contains(&Permission::PairedRead)
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.perms.contains(&Permission::PairedWrite)
    }

    #[must_use]
    pub fn supports_events(&self) -> bool {
        self.perms.contains(&Permission::Events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_type_as_short_uuid() {
        let json = serde_json::to_string(&CharacteristicType::On).unwrap();
        assert_eq!(json, "\"25\"");
    }

    #[test]
    fn should_coerce_zero_and_one_to_bool() {
        assert_eq!(
            Format::Bool.coerce(&CharacteristicValue::Int(1)),
            Some(CharacteristicValue::Bool(true))
        );
        assert_eq!(
            Format::Bool.coerce(&CharacteristicValue::Int(0)),
            Some(CharacteristicValue::Bool(false))
        );
    }

    #[test]
    fn should_reject_other_integers_for_bool() {
        assert_eq!(Format::Bool.coerce(&CharacteristicValue::Int(2)), None);
    }

    #[test]
    fn should_reject_string_for_bool() {
        assert_eq!(Format::Bool.coerce(&CharacteristicValue::from("on")), None);
    }

    #[test]
    fn should_widen_int_to_float() {
        assert_eq!(
            Format::Float.coerce(&CharacteristicValue::Int(3)),
            Some(CharacteristicValue::Float(3.0))
        );
    }

    #[test]
    fn should_drop_initial_value_of_write_only_characteristic() {
        let c = Characteristic::new(Iid::new(2), CharacteristicType::Identify, Some(false.into()));
        assert!(c.value.is_none());
        assert!(!c.is_readable());
        assert!(c.is_writable());
    }

    #[test]
    fn should_give_on_characteristic_read_write_and_events() {
        let c = Characteristic::new(Iid::new(11), CharacteristicType::On, Some(false.into()));
        assert!(c.is_readable());
        assert!(c.is_writable());
        assert!(c.supports_events());
        assert_eq!(c.format, Format::Bool);
    }

    #[test]
    fn should_serialize_in_accessory_database_shape() {
        let c = Characteristic::new(Iid::new(11), CharacteristicType::On, Some(true.into()));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "iid": 11,
                "type": "25",
                "format": "bool",
                "perms": ["pr", "pw", "ev"],
                "value": true
            })
        );
    }
}
