//! Identity service — loads or creates the persisted server identity.

use hapdemo_domain::error::HapError;
use hapdemo_domain::identity::ServerIdentity;

use crate::ports::KeyValueStore;

/// Store key holding the serialized [`ServerIdentity`].
pub const IDENTITY_KEY: &str = "identity";

/// Application service for the server identity.
pub struct IdentityService<S> {
    store: S,
}

impl<S: KeyValueStore> IdentityService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the stored identity, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails or the record is corrupt.
    pub async fn load(&self) -> Result<Option<ServerIdentity>, HapError> {
        let Some(raw) = self.store.get(IDENTITY_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|err| HapError::Storage(Box::new(err)))
    }

    /// Load the identity, creating it on first start, and reconcile it with
    /// the accessory database `layout`. The result is written back whenever
    /// it changed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails or the record is corrupt.
    pub async fn load_or_create(&self, layout: &str) -> Result<ServerIdentity, HapError> {
        let identity = match self.load().await? {
            Some(mut identity) => {
                if identity.reconcile(layout) {
                    tracing::info!(
                        config_number = identity.config_number,
                        "accessory database changed"
                    );
                    self.save(&identity).await?;
                }
                identity
            }
            None => {
                let identity = ServerIdentity::generate(layout);
                tracing::info!(device_id = %identity.device_id, "server identity created");
                self.save(&identity).await?;
                identity
            }
        };
        Ok(identity)
    }

    async fn save(&self, identity: &ServerIdentity) -> Result<(), HapError> {
        let raw = serde_json::to_vec(identity).map_err(|err| HapError::Storage(Box::new(err)))?;
        self.store.set(IDENTITY_KEY, &raw).await
    }
}
