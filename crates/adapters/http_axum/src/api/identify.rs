//! Unpaired identify routine.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_domain::characteristic::CharacteristicType;
use hapdemo_domain::event::UpdateOrigin;
use hapdemo_domain::id::{Aid, CharacteristicRef};
use hapdemo_domain::service::ServiceType;
use hapdemo_domain::status::HapStatus;

use crate::error::{ApiError, StatusBody};
use crate::state::AppState;

/// Possible responses from the identify endpoint.
pub enum IdentifyResponse {
    NoContent,
    /// Identify over this route is only allowed before pairing.
    AlreadyPaired,
}

impl IntoResponse for IdentifyResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::AlreadyPaired => (
                StatusCode::BAD_REQUEST,
                Json(StatusBody {
                    status: HapStatus::InsufficientPrivileges,
                }),
            )
                .into_response(),
        }
    }
}

/// `POST /identify` — ask the primary accessory to identify itself.
pub async fn identify<S, P>(State(state): State<AppState<S, P>>) -> Result<IdentifyResponse, ApiError>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    if state.pairing.is_paired().await? {
        return Ok(IdentifyResponse::AlreadyPaired);
    }
    let primary = Aid::new(1);
    let target = state
        .registry
        .get(primary)
        .and_then(|accessory| {
            accessory
                .find(ServiceType::AccessoryInformation, CharacteristicType::Identify)
                .map(|c| CharacteristicRef::new(primary, c.iid))
        });
    match target {
        Some(target) => {
            let origin = UpdateOrigin::Remote { controller: None };
            if let Err(status) = state.registry.write(target, &true.into(), origin) {
                tracing::warn!(%target, ?status, "identify failed");
            }
        }
        None => tracing::warn!("identify requested but no primary accessory is registered"),
    }
    Ok(IdentifyResponse::NoContent)
}
