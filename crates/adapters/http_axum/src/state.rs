//! Shared application state for axum handlers.

use std::sync::Arc;

use hapdemo_app::event_bus::InProcessEventBus;
use hapdemo_app::lifecycle::ShutdownToken;
use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_app::registry::AccessoryRegistry;
use hapdemo_app::services::pairing_service::PairingService;

/// Application state shared across all axum handlers.
///
/// Generic over the store and event publisher to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<S, P> {
    /// Accessory database and characteristic values.
    pub registry: Arc<AccessoryRegistry<P>>,
    /// Pairing management.
    pub pairing: Arc<PairingService<S>>,
    /// Event bus for real-time SSE streaming.
    pub event_bus: Arc<InProcessEventBus>,
    /// Ends long-lived responses on shutdown.
    pub shutdown: ShutdownToken,
}

impl<S, P> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            pairing: Arc::clone(&self.pairing),
            event_bus: Arc::clone(&self.event_bus),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S, P> AppState<S, P>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    pub fn new(
        registry: Arc<AccessoryRegistry<P>>,
        pairing: Arc<PairingService<S>>,
        event_bus: Arc<InProcessEventBus>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            registry,
            pairing,
            event_bus,
            shutdown,
        }
    }
}
