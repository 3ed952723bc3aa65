//! Controller authentication extractors.
//!
//! A controller names itself with the `X-Hap-Controller` header; the request
//! is accepted when that identifier has a stored pairing.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_domain::error::{HapError, PairingError};
use hapdemo_domain::id::ControllerId;
use hapdemo_domain::pairing::Pairing;
use hapdemo_domain::status::HapStatus;

use crate::error::{ApiError, StatusBody, connection_authorization_required};
use crate::state::AppState;

/// Header carrying the controller identifier.
pub const CONTROLLER_HEADER: &str = "x-hap-controller";

/// A paired controller.
#[derive(Debug, Clone)]
pub struct Controller(pub Pairing);

/// A paired controller with admin permissions.
#[derive(Debug, Clone)]
pub struct Admin(pub Pairing);

/// Why a request was not authenticated.
pub enum AuthRejection {
    /// No controller header, or the controller is not paired.
    Unpaired,
    /// The controller is paired but the request was refused, or the pairing
    /// lookup failed.
    Refused(ApiError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unpaired => (
                connection_authorization_required(),
                Json(StatusBody {
                    status: HapStatus::InsufficientAuthorization,
                }),
            )
                .into_response(),
            Self::Refused(err) => err.into_response(),
        }
    }
}

impl<S, P> FromRequestParts<AppState<S, P>> for Controller
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, P>,
    ) -> Result<Self, Self::Rejection> {
        let Some(controller) = parts
            .headers
            .get(CONTROLLER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<ControllerId>().ok())
        else {
            return Err(AuthRejection::Unpaired);
        };
        match state.pairing.get(controller).await {
            Ok(Some(pairing)) => Ok(Self(pairing)),
            Ok(None) => {
                tracing::debug!(%controller, "request from unpaired controller");
                Err(AuthRejection::Unpaired)
            }
            Err(err) => Err(AuthRejection::Refused(err.into())),
        }
    }
}

impl<S, P> FromRequestParts<AppState<S, P>> for Admin
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S, P>,
    ) -> Result<Self, Self::Rejection> {
        let Controller(pairing) = Controller::from_request_parts(parts, state).await?;
        if pairing.is_admin() {
            Ok(Self(pairing))
        } else {
            Err(AuthRejection::Refused(
                HapError::from(PairingError::InsufficientPrivileges).into(),
            ))
        }
    }
}
