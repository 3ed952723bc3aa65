//! Accessory protocol handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod accessories;
pub mod auth;
#[allow(clippy::missing_errors_doc)]
pub mod characteristics;
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod identify;
#[allow(clippy::missing_errors_doc)]
pub mod pairings;

use axum::Router;
use axum::routing::{delete, get, post};

use hapdemo_app::ports::{EventPublisher, KeyValueStore};

use crate::state::AppState;

/// Build the accessory protocol routes.
pub fn routes<S, P>() -> Router<AppState<S, P>>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Unauthenticated
        .route("/identify", post(identify::identify::<S, P>))
        .route("/pair-setup", post(pairings::pair_setup::<S, P>))
        // Admin
        .route(
            "/pairings",
            get(pairings::list::<S, P>).post(pairings::add::<S, P>),
        )
        .route("/pairings/{identifier}", delete(pairings::remove::<S, P>))
        // Paired controllers
        .route("/accessories", get(accessories::list::<S, P>))
        .route(
            "/characteristics",
            get(characteristics::read::<S, P>).put(characteristics::write::<S, P>),
        )
        .route("/events", get(events::stream::<S, P>))
}
