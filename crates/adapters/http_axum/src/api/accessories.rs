//! Accessory database handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_domain::accessory::Accessory;

use crate::api::auth::Controller;
use crate::state::AppState;

/// Response body of `GET /accessories`.
#[derive(Serialize)]
pub struct AccessoriesBody {
    pub accessories: Vec<Accessory>,
}

/// `GET /accessories`
pub async fn list<S, P>(
    State(state): State<AppState<S, P>>,
    Controller(_): Controller,
) -> Json<AccessoriesBody>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Json(AccessoriesBody {
        accessories: state.registry.accessories(),
    })
}
