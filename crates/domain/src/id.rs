//! Typed identifiers.
//!
//! Random identifiers (controllers, events) are UUID newtypes. Accessory and
//! instance ids are small integers assigned by the server, as the accessory
//! protocol mandates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

macro_rules! define_instance_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw integer id.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Access the raw integer.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The id that follows this one.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Identifier of a paired controller (the pairing identifier it presents).
    ControllerId
);

define_id!(
    /// Unique identifier for a [`CharacteristicEvent`](crate::event::CharacteristicEvent).
    EventId
);

define_instance_id!(
    /// Accessory instance id, unique within the server.
    Aid
);

define_instance_id!(
    /// Service or characteristic instance id, unique within an accessory.
    Iid
);

/// Fully-qualified characteristic address, written `aid.iid` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacteristicRef {
    pub aid: Aid,
    pub iid: Iid,
}

impl CharacteristicRef {
    #[must_use]
    pub const fn new(aid: Aid, iid: Iid) -> Self {
        Self { aid, iid }
    }
}

impl fmt::Display for CharacteristicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.aid, self.iid)
    }
}

impl FromStr for CharacteristicRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidCharacteristicId(s.to_string());
        let (aid, iid) = s.trim().split_once('.').ok_or_else(invalid)?;
        let aid = aid.parse::<u64>().map_err(|_| invalid())?;
        let iid = iid.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(Aid::new(aid), Iid::new(iid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = ControllerId::new();
        let b = ControllerId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = ControllerId::new();
        let parsed: ControllerId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        assert!(ControllerId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn should_serialize_instance_id_as_plain_number() {
        let json = serde_json::to_string(&Aid::new(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn should_increment_instance_id() {
        assert_eq!(Iid::new(9).next(), Iid::new(10));
    }

    #[test]
    fn should_parse_characteristic_ref() {
        let r: CharacteristicRef = "1.10".parse().unwrap();
        assert_eq!(r, CharacteristicRef::new(Aid::new(1), Iid::new(10)));
        assert_eq!(r.to_string(), "1.10");
    }

    #[test]
    fn should_reject_characteristic_ref_without_dot() {
        let result = CharacteristicRef::from_str("110");
        assert!(matches!(
            result,
            Err(ValidationError::InvalidCharacteristicId(_))
        ));
    }

    #[test]
    fn should_reject_characteristic_ref_with_non_numeric_part() {
        assert!(CharacteristicRef::from_str("1.x").is_err());
        assert!(CharacteristicRef::from_str("a.1").is_err());
    }
}
