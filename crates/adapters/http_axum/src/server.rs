//! Accessory protocol server.
//!
//! [`HapServer`] ties the registry, the store-backed services and the event
//! bus together and runs the HTTP surface until a shutdown token is
//! cancelled. On cancellation the listener stops accepting, in-flight
//! requests get a bounded window to finish, and anything still running after
//! that window is dropped.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use hapdemo_app::event_bus::InProcessEventBus;
use hapdemo_app::lifecycle::ShutdownToken;
use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_app::registry::AccessoryRegistry;
use hapdemo_app::services::identity_service::IdentityService;
use hapdemo_app::services::pairing_service::PairingService;
use hapdemo_domain::error::HapError;
use hapdemo_domain::identity::ServerIdentity;
use hapdemo_domain::pairing::Pin;

use crate::state::AppState;

/// Default window given to in-flight requests after cancellation.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Accepting or serving connections failed.
    #[error("server I/O error")]
    Io(#[from] std::io::Error),
}

/// Accessory protocol server.
pub struct HapServer<S, P> {
    registry: Arc<AccessoryRegistry<P>>,
    pairing: Arc<PairingService<Arc<S>>>,
    event_bus: Arc<InProcessEventBus>,
    identity: ServerIdentity,
    shutdown_timeout: Duration,
}

impl<S, P> HapServer<S, P>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Build a server on top of `store`.
    ///
    /// Loads the server identity (creating it on first start) and bumps its
    /// configuration number when the accessory database changed since the
    /// previous start.
    ///
    /// # Errors
    ///
    /// Returns [`HapError`] if the store cannot be read or written, or the
    /// accessory database cannot be described.
    pub async fn new(
        store: S,
        registry: Arc<AccessoryRegistry<P>>,
        event_bus: Arc<InProcessEventBus>,
        pin: Pin,
    ) -> Result<Self, HapError> {
        let store = Arc::new(store);
        let layout = registry.layout()?;
        let identity = IdentityService::new(Arc::clone(&store))
            .load_or_create(&layout)
            .await?;
        let category = registry
            .accessories()
            .first()
            .map(|accessory| accessory.category.code());
        tracing::info!(
            device_id = %identity.device_id,
            config_number = identity.config_number,
            category,
            "accessory server ready"
        );
        Ok(Self {
            registry,
            pairing: Arc::new(PairingService::new(store, pin)),
            event_bus,
            identity,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        })
    }

    /// Set the window given to in-flight requests after cancellation.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// The pairing code controllers must present.
    #[must_use]
    pub fn pin(&self) -> &Pin {
        self.pairing.pin()
    }

    #[must_use]
    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Build the HTTP surface. Long-lived responses end when `token` is
    /// cancelled.
    #[must_use]
    pub fn router(&self, token: ShutdownToken) -> Router {
        crate::router::build(AppState::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.pairing),
            Arc::clone(&self.event_bus),
            token,
        ))
    }

    /// Serve connections from `listener` until `token` is cancelled.
    ///
    /// Returns `Ok(())` once the server stopped after cancellation, whether
    /// every in-flight request finished or the shutdown window elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if the listener cannot be inspected or
    /// serving fails before cancellation.
    pub async fn listen_and_serve(
        &self,
        listener: TcpListener,
        token: ShutdownToken,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "accessory server listening");

        let graceful = token.clone();
        let serve = axum::serve(listener, self.router(token.clone()))
            .with_graceful_shutdown(async move { graceful.cancelled().await })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => return result.map_err(ServerError::from),
            () = token.cancelled() => {}
        }

        tracing::debug!(timeout = ?self.shutdown_timeout, "draining in-flight requests");
        if let Ok(result) = tokio::time::timeout(self.shutdown_timeout, serve).await {
            result?;
        } else {
            tracing::warn!(
                timeout = ?self.shutdown_timeout,
                "shutdown window elapsed, dropping remaining connections"
            );
        }
        tracing::info!("accessory server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hapdemo_app::lifecycle::Shutdown;

    use crate::testing::{PIN, server};

    #[tokio::test]
    async fn should_create_identity_on_first_start() {
        let (server, _fixture) = server().await;
        assert_eq!(server.identity().config_number, 1);
        assert_eq!(server.pin().as_digits(), PIN);
    }

    #[tokio::test]
    async fn should_return_after_cancellation() {
        let (server, _fixture) = server().await;
        let shutdown = Shutdown::new();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let token = shutdown.token();
        let run = tokio::spawn(async move { server.listen_and_serve(listener, token).await });
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(2), run)
            .await
            .expect("server should stop after cancellation")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_return_immediately_when_already_cancelled() {
        let (server, _fixture) = server().await;
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        tokio::time::timeout(
            Duration::from_secs(2),
            server.listen_and_serve(listener, shutdown.token()),
        )
        .await
        .expect("already cancelled")
        .unwrap();
    }
}
