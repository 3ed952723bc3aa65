//! Pairing service — establishes and manages trust with controllers.
//!
//! The first controller presenting the right pairing code becomes the admin.
//! Once paired, the accessory refuses further pair-setup attempts; admins add
//! or remove other controllers instead. Pairings are stored under
//! `pairing.<controller-id>` as JSON.
//!
//! Pair-setup runs one request at a time: the lock guarding the failed
//! attempt counter is held from the "already paired?" check until the new
//! pairing is stored, so two controllers can never both become admin.

use chrono::Utc;
use tokio::sync::Mutex;

use hapdemo_domain::error::{HapError, NotFoundError, PairingError};
use hapdemo_domain::id::ControllerId;
use hapdemo_domain::pairing::{Pairing, Permissions, Pin};

use crate::ports::KeyValueStore;

/// Unsuccessful pair-setup attempts tolerated before refusing for good.
pub const MAX_AUTH_ATTEMPTS: u32 = 100;

const PAIRING_PREFIX: &str = "pairing.";

/// Application service for pairing management.
pub struct PairingService<S> {
    store: S,
    pin: Pin,
    /// Unsuccessful pair-setup attempts; also serializes pair-setup.
    setup: Mutex<u32>,
}

impl<S: KeyValueStore> PairingService<S> {
    /// Create a new service backed by `store`, accepting `pin` during pair-setup.
    pub fn new(store: S, pin: Pin) -> Self {
        Self {
            store,
            pin,
            setup: Mutex::new(0),
        }
    }

    /// The pairing code this service accepts.
    #[must_use]
    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    /// Whether at least one controller is paired.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn is_paired(&self) -> Result<bool, HapError> {
        let keys = self.store.keys().await?;
        Ok(keys.iter().any(|k| k.starts_with(PAIRING_PREFIX)))
    }

    /// Pair a new controller using the pairing code.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Unavailable`] if the accessory is already paired
    /// - [`PairingError::MaxTries`] after [`MAX_AUTH_ATTEMPTS`] failures
    /// - [`PairingError::Authentication`] if `pin` does not match
    /// - a storage error propagated from the store
    pub async fn pair_setup(&self, controller: ControllerId, pin: &str) -> Result<Pairing, HapError> {
        let mut failed_attempts = self.setup.lock().await;
        if self.is_paired().await? {
            return Err(PairingError::Unavailable.into());
        }
        if *failed_attempts >= MAX_AUTH_ATTEMPTS {
            return Err(PairingError::MaxTries.into());
        }
        if !self.pin.matches(pin) {
            *failed_attempts += 1;
            tracing::warn!(%controller, attempts = *failed_attempts, "pair-setup rejected: wrong pairing code");
            return Err(PairingError::Authentication.into());
        }

        let pairing = Pairing {
            controller,
            permissions: Permissions::Admin,
            paired_at: Utc::now(),
        };
        self.save(&pairing).await?;
        *failed_attempts = 0;
        tracing::info!(%controller, "controller paired");
        Ok(pairing)
    }

    /// Look up the pairing of `controller`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails or the record is corrupt.
    pub async fn get(&self, controller: ControllerId) -> Result<Option<Pairing>, HapError> {
        let Some(raw) = self.store.get(&key(controller)).await? else {
            return Ok(None);
        };
        let pairing = serde_json::from_slice(&raw).map_err(|err| HapError::Storage(Box::new(err)))?;
        Ok(Some(pairing))
    }

    /// List every pairing. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InsufficientPrivileges`] for a non-admin
    /// requester, or a storage error.
    pub async fn list_pairings(&self, requester: &Pairing) -> Result<Vec<Pairing>, HapError> {
        require_admin(requester)?;
        self.all().await
    }

    /// Add (or update the permissions of) a pairing. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InsufficientPrivileges`] for a non-admin
    /// requester, or a storage error.
    pub async fn add_pairing(
        &self,
        requester: &Pairing,
        controller: ControllerId,
        permissions: Permissions,
    ) -> Result<Pairing, HapError> {
        require_admin(requester)?;
        let paired_at = self
            .get(controller)
            .await?
            .map_or_else(Utc::now, |existing| existing.paired_at);
        let pairing = Pairing {
            controller,
            permissions,
            paired_at,
        };
        self.save(&pairing).await?;
        tracing::info!(%controller, ?permissions, by = %requester.controller, "pairing added");
        Ok(pairing)
    }

    /// Remove a pairing. Admin only.
    ///
    /// Removing the last admin removes every pairing, returning the
    /// accessory to the unpaired state.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InsufficientPrivileges`] for a non-admin
    /// requester, [`HapError::NotFound`] when `controller` is not paired, or
    /// a storage error.
    pub async fn remove_pairing(
        &self,
        requester: &Pairing,
        controller: ControllerId,
    ) -> Result<(), HapError> {
        require_admin(requester)?;
        if self.get(controller).await?.is_none() {
            return Err(NotFoundError {
                entity: "Pairing",
                id: controller.to_string(),
            }
            .into());
        }
        self.store.delete(&key(controller)).await?;
        tracing::info!(%controller, by = %requester.controller, "pairing removed");

        let remaining = self.all().await?;
        if !remaining.iter().any(Pairing::is_admin) {
            for pairing in remaining {
                self.store.delete(&key(pairing.controller)).await?;
            }
            tracing::info!("last admin removed, accessory is unpaired");
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Pairing>, HapError> {
        let mut pairings = Vec::new();
        for k in self.store.keys().await? {
            let Some(id) = k.strip_prefix(PAIRING_PREFIX) else {
                continue;
            };
            let Ok(controller) = id.parse::<ControllerId>() else {
                tracing::warn!(key = %k, "ignoring pairing record with malformed identifier");
                continue;
            };
            if let Some(pairing) = self.get(controller).await? {
                pairings.push(pairing);
            }
        }
        Ok(pairings)
    }

    async fn save(&self, pairing: &Pairing) -> Result<(), HapError> {
        let raw = serde_json::to_vec(pairing).map_err(|err| HapError::Storage(Box::new(err)))?;
        self.store.set(&key(pairing.controller), &raw).await
    }
}

fn key(controller: ControllerId) -> String {
    format!("{PAIRING_PREFIX}{controller}")
}

fn require_admin(requester: &Pairing) -> Result<(), HapError> {
    if requester.is_admin() {
        Ok(())
    } else {
        Err(PairingError::InsufficientPrivileges.into())
    }
}
