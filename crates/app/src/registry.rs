//! Accessory registry — the set of exposed accessories and their
//! characteristic values.
//!
//! Reads and writes are validated against the characteristic permissions and
//! format; failures are reported as protocol [`HapStatus`] codes so the
//! protocol server can return them per characteristic. Every value change is
//! published as a [`CharacteristicEvent`] on the injected [`EventPublisher`].

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hapdemo_domain::accessory::Accessory;
use hapdemo_domain::characteristic::{Characteristic, CharacteristicValue};
use hapdemo_domain::error::HapError;
use hapdemo_domain::event::{CharacteristicEvent, UpdateOrigin};
use hapdemo_domain::id::{Aid, CharacteristicRef};
use hapdemo_domain::status::HapStatus;

use crate::ports::EventPublisher;

/// Holds every accessory exposed by the server.
pub struct AccessoryRegistry<P> {
    accessories: RwLock<Vec<Accessory>>,
    publisher: P,
}

impl<P: EventPublisher> AccessoryRegistry<P> {
    /// Create an empty registry publishing changes to `publisher`.
    pub fn new(publisher: P) -> Self {
        Self {
            accessories: RwLock::new(Vec::new()),
            publisher,
        }
    }

    /// Register an accessory, assigning it the next free accessory id.
    ///
    /// The first accessory gets aid 1.
    ///
    /// # Errors
    ///
    /// Returns [`HapError::Validation`] if the accessory breaks its invariants.
    pub fn add(&self, mut accessory: Accessory) -> Result<Aid, HapError> {
        accessory.validate()?;
        let mut accessories = self.write_lock();
        let aid = accessories
            .iter()
            .map(|a| a.aid)
            .max()
            .map_or(Aid::new(1), Aid::next);
        accessory.aid = aid;
        tracing::debug!(%aid, name = accessory.name(), "accessory registered");
        accessories.push(accessory);
        Ok(aid)
    }

    /// Snapshot of the accessory database.
    #[must_use]
    pub fn accessories(&self) -> Vec<Accessory> {
        self.read_lock().clone()
    }

    /// Snapshot of a single accessory.
    #[must_use]
    pub fn get(&self, aid: Aid) -> Option<Accessory> {
        self.read_lock().iter().find(|a| a.aid == aid).cloned()
    }

    /// Read the current value of a characteristic.
    ///
    /// # Errors
    ///
    /// - [`HapStatus::ResourceDoesNotExist`] for an unknown accessory or characteristic
    /// - [`HapStatus::WriteOnly`] when the characteristic cannot be read
    pub fn read(&self, target: CharacteristicRef) -> Result<CharacteristicValue, HapStatus> {
        let accessories = self.read_lock();
        let characteristic = lookup(&accessories, target)?;
        if !characteristic.is_readable() {
            return Err(HapStatus::WriteOnly);
        }
        characteristic
            .value
            .clone()
            .ok_or(HapStatus::ServiceCommunicationFailure)
    }

    /// Check that a controller may subscribe to notifications of `target`.
    ///
    /// # Errors
    ///
    /// - [`HapStatus::ResourceDoesNotExist`] for an unknown characteristic
    /// - [`HapStatus::NotificationNotSupported`] when it lacks the `ev` permission
    pub fn check_events(&self, target: CharacteristicRef) -> Result<(), HapStatus> {
        let accessories = self.read_lock();
        if lookup(&accessories, target)?.supports_events() {
            Ok(())
        } else {
            Err(HapStatus::NotificationNotSupported)
        }
    }

    /// Apply a write coming from a controller.
    ///
    /// # Errors
    ///
    /// - [`HapStatus::ResourceDoesNotExist`] for an unknown characteristic
    /// - [`HapStatus::ReadOnly`] when the characteristic cannot be written
    /// - [`HapStatus::InvalidValue`] when the value does not match its format
    pub fn write(
        &self,
        target: CharacteristicRef,
        value: &CharacteristicValue,
        origin: UpdateOrigin,
    ) -> Result<(), HapStatus> {
        self.apply(target, value, origin)
    }

    /// Apply a change made by the accessory itself.
    ///
    /// Read-only characteristics may be updated this way.
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write), except [`HapStatus::ReadOnly`].
    pub fn update(
        &self,
        target: CharacteristicRef,
        value: &CharacteristicValue,
    ) -> Result<(), HapStatus> {
        self.apply(target, value, UpdateOrigin::Local)
    }

    /// Structural description of the accessory database (values stripped).
    ///
    /// Two registries with the same layout expose the same accessories,
    /// services and characteristics, whatever their current values.
    ///
    /// # Errors
    ///
    /// Returns [`HapError::Storage`] if the database cannot be serialized.
    pub fn layout(&self) -> Result<String, HapError> {
        let mut accessories = self.accessories();
        for accessory in &mut accessories {
            for service in &mut accessory.services {
                for characteristic in &mut service.characteristics {
                    characteristic.value = None;
                }
            }
        }
        serde_json::to_string(&accessories).map_err(|err| HapError::Storage(Box::new(err)))
    }

    fn apply(
        &self,
        target: CharacteristicRef,
        value: &CharacteristicValue,
        origin: UpdateOrigin,
    ) -> Result<(), HapStatus> {
        let event = {
            let mut accessories = self.write_lock();
            let characteristic = lookup_mut(&mut accessories, target)?;
            if origin.is_remote() && !characteristic.is_writable() {
                return Err(HapStatus::ReadOnly);
            }
            let normalised = characteristic
                .format
                .coerce(value)
                .ok_or(HapStatus::InvalidValue)?;

            if characteristic.is_readable() {
                if characteristic.value.as_ref() == Some(&normalised) {
                    None
                } else {
                    characteristic.value = Some(normalised.clone());
                    Some(CharacteristicEvent::new(target, Some(normalised), origin))
                }
            } else {
                // write-only characteristics (Identify) notify on every write
                Some(CharacteristicEvent::new(target, None, origin))
            }
        };

        if let Some(event) = event {
            let value = event.value.clone();
            let listeners = self.publisher.publish(event);
            tracing::debug!(%target, ?value, ?origin, listeners, "characteristic changed");
        }
        Ok(())
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Vec<Accessory>> {
        self.accessories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Vec<Accessory>> {
        self.accessories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn lookup(accessories: &[Accessory], target: CharacteristicRef) -> Result<&Characteristic, HapStatus> {
    accessories
        .iter()
        .find(|a| a.aid == target.aid)
        .and_then(|a| a.characteristic(target.iid))
        .ok_or(HapStatus::ResourceDoesNotExist)
}

fn lookup_mut(
    accessories: &mut [Accessory],
    target: CharacteristicRef,
) -> Result<&mut Characteristic, HapStatus> {
    accessories
        .iter_mut()
        .find(|a| a.aid == target.aid)
        .and_then(|a| a.characteristic_mut(target.iid))
        .ok_or(HapStatus::ResourceDoesNotExist)
}
