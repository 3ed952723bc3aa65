//! Accessory — a logical device exposed to controllers.
//!
//! Every accessory carries an *Accessory Information* service (iid 1) and a
//! *Protocol Information* service, followed by the services that make up its
//! function. Instance ids are assigned sequentially by [`AccessoryBuilder`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::characteristic::{Characteristic, CharacteristicType, CharacteristicValue};
use crate::error::{HapError, ValidationError};
use crate::id::{Aid, Iid};
use crate::service::{Service, ServiceType};

/// Protocol version advertised by the Protocol Information service.
pub const PROTOCOL_VERSION: &str = "1.1.0";

/// Accessory category, advertised to controllers to pick an icon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    Other,
    Bridge,
    Fan,
    Lightbulb,
    Outlet,
    Switch,
}

impl Category {
    /// Numeric category identifier (`ci`).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Other => 1,
            Self::Bridge => 2,
            Self::Fan => 3,
            Self::Lightbulb => 5,
            Self::Outlet => 7,
            Self::Switch => 8,
        }
    }
}

/// Descriptive information published through the Accessory Information service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: String,
}

impl Default for AccessoryInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            manufacturer: "hapdemo".to_string(),
            model: "undefined".to_string(),
            serial_number: "undefined".to_string(),
            firmware_revision: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// An accessory and its services, in accessory-database shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub aid: Aid,
    /// Not part of the accessory database.
    #[serde(skip)]
    pub category: Category,
    pub services: Vec<Service>,
}

impl Accessory {
    /// Create a builder for constructing an [`Accessory`].
    #[must_use]
    pub fn builder() -> AccessoryBuilder {
        AccessoryBuilder::default()
    }

    /// The value of the Name characteristic.
    #[must_use]
    pub fn name(&self) -> &str {
        self.find(ServiceType::AccessoryInformation, CharacteristicType::Name)
            .and_then(|c| match &c.value {
                Some(CharacteristicValue::String(name)) => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Look up a characteristic by instance id.
    #[must_use]
    pub fn characteristic(&self, iid: Iid) -> Option<&Characteristic> {
        self.services
            .iter()
            .flat_map(|s| s.characteristics.iter())
            .find(|c| c.iid == iid)
    }

    /// Mutable lookup of a characteristic by instance id.
    pub fn characteristic_mut(&mut self, iid: Iid) -> Option<&mut Characteristic> {
        self.services
            .iter_mut()
            .flat_map(|s| s.characteristics.iter_mut())
            .find(|c| c.iid == iid)
    }

    /// First characteristic of `char_type` within the first service of `service_type`.
    #[must_use]
    pub fn find(
        &self,
        service_type: ServiceType,
        char_type: CharacteristicType,
    ) -> Option<&Characteristic> {
        self.services
            .iter()
            .find(|s| s.service_type == service_type)
            .and_then(|s| s.characteristic(char_type))
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HapError::Validation`] when the name is empty or two
    /// services/characteristics share an instance id.
    pub fn validate(&self) -> Result<(), HapError> {
        if self.name().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.iid) {
                return Err(ValidationError::DuplicateInstanceId(service.iid.get()).into());
            }
            for characteristic in &service.characteristics {
                if !seen.insert(characteristic.iid) {
                    return Err(
                        ValidationError::DuplicateInstanceId(characteristic.iid.get()).into(),
                    );
                }
            }
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Accessory`].
#[derive(Debug, Default)]
pub struct AccessoryBuilder {
    aid: Option<Aid>,
    category: Category,
    info: AccessoryInfo,
    services: Vec<(ServiceType, Vec<(CharacteristicType, Option<CharacteristicValue>)>)>,
}

impl AccessoryBuilder {
    #[must_use]
    pub fn aid(mut self, aid: Aid) -> Self {
        self.aid = Some(aid);
        self
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn info(mut self, info: AccessoryInfo) -> Self {
        self.info = info;
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.info.name = name.into();
        self
    }

    /// Append a service with the given characteristics and initial values.
    #[must_use]
    pub fn service(
        mut self,
        service_type: ServiceType,
        characteristics: Vec<(CharacteristicType, Option<CharacteristicValue>)>,
    ) -> Self {
        self.services.push((service_type, characteristics));
        self
    }

    /// Consume the builder, assign instance ids, validate, and return an [`Accessory`].
    ///
    /// # Errors
    ///
    /// Returns [`HapError::Validation`] if the name is missing or empty.
    pub fn build(self) -> Result<Accessory, HapError> {
        let info = self.info;
        let mut specs = vec![
            (
                ServiceType::AccessoryInformation,
                vec![
                    (CharacteristicType::Identify, None),
                    (CharacteristicType::Manufacturer, Some(info.manufacturer.into())),
                    (CharacteristicType::Model, Some(info.model.into())),
                    (CharacteristicType::Name, Some(info.name.into())),
                    (CharacteristicType::SerialNumber, Some(info.serial_number.into())),
                    (
                        CharacteristicType::FirmwareRevision,
                        Some(info.firmware_revision.into()),
                    ),
                ],
            ),
            (
                ServiceType::ProtocolInformation,
                vec![(CharacteristicType::Version, Some(PROTOCOL_VERSION.into()))],
            ),
        ];
        specs.extend(self.services);

        let mut next = Iid::new(1);
        let mut services = Vec::with_capacity(specs.len());
        for (service_type, characteristics) in specs {
            let service_iid = next;
            next = next.next();
            let characteristics = characteristics
                .into_iter()
                .map(|(char_type, value)| {
                    let iid = next;
                    next = next.next();
                    Characteristic::new(iid, char_type, value)
                })
                .collect();
            services.push(Service {
                iid: service_iid,
                service_type,
                characteristics,
            });
        }

        let accessory = Accessory {
            aid: self.aid.unwrap_or(Aid::new(1)),
            category: self.category,
            services,
        };
        accessory.validate()?;
        Ok(accessory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switch() -> Accessory {
        Accessory::builder()
            .name("MBP-DEMO")
            .service(
                ServiceType::Switch,
                vec![(CharacteristicType::On, Some(false.into()))],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_accessory_with_information_service_first() {
        let accessory = switch();
        assert_eq!(accessory.services[0].iid, Iid::new(1));
        assert_eq!(
            accessory.services[0].service_type,
            ServiceType::AccessoryInformation
        );
        assert_eq!(accessory.name(), "MBP-DEMO");
    }

    #[test]
    fn should_assign_sequential_instance_ids() {
        let accessory = switch();
        let mut iids = Vec::new();
        for service in &accessory.services {
            iids.push(service.iid.get());
            iids.extend(service.characteristics.iter().map(|c| c.iid.get()));
        }
        let expected: Vec<u64> = (1..=u64::try_from(iids.len()).unwrap()).collect();
        assert_eq!(iids, expected);
    }

    #[test]
    fn should_advertise_protocol_version() {
        let accessory = switch();
        let version = accessory
            .find(ServiceType::ProtocolInformation, CharacteristicType::Version)
            .unwrap();
        assert_eq!(version.value, Some(PROTOCOL_VERSION.into()));
    }

    #[test]
    fn should_find_switch_on_characteristic() {
        let accessory = switch();
        let on = accessory
            .find(ServiceType::Switch, CharacteristicType::On)
            .unwrap();
        assert_eq!(on.value, Some(false.into()));
        assert_eq!(accessory.characteristic(on.iid), Some(on));
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Accessory::builder().build();
        assert!(matches!(
            result,
            Err(HapError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_reject_duplicate_instance_ids() {
        let mut accessory = switch();
        let first = accessory.services[0].characteristics[0].clone();
        accessory.services[2].characteristics.push(first);
        assert!(matches!(
            accessory.validate(),
            Err(HapError::Validation(ValidationError::DuplicateInstanceId(2)))
        ));
    }

    #[test]
    fn should_leave_category_out_of_accessory_database() {
        let accessory = Accessory::builder()
            .name("MBP-DEMO")
            .category(Category::Switch)
            .build()
            .unwrap();
        assert_eq!(accessory.category.code(), 8);
        let json = serde_json::to_value(&accessory).unwrap();
        assert!(json.get("category").is_none());
    }

    #[test]
    fn should_default_to_aid_one() {
        assert_eq!(switch().aid, Aid::new(1));
    }
}
