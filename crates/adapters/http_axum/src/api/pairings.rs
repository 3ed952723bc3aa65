//! Pairing handlers: pair-setup and admin pairing management.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_domain::error::{HapError, ValidationError};
use hapdemo_domain::id::ControllerId;
use hapdemo_domain::pairing::{Pairing, Permissions};

use crate::api::auth::Admin;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /pair-setup`.
#[derive(Deserialize)]
pub struct PairSetupRequest {
    pub identifier: String,
    pub pin: String,
}

/// Request body for `POST /pairings`.
#[derive(Deserialize)]
pub struct AddPairingRequest {
    pub identifier: String,
    #[serde(default)]
    pub admin: bool,
}

/// A pairing as exposed to controllers.
#[derive(Debug, Serialize)]
pub struct PairingBody {
    pub identifier: ControllerId,
    pub admin: bool,
    pub paired_at: DateTime<Utc>,
}

impl From<Pairing> for PairingBody {
    fn from(pairing: Pairing) -> Self {
        Self {
            identifier: pairing.controller,
            admin: pairing.is_admin(),
            paired_at: pairing.paired_at,
        }
    }
}

/// Response body of `GET /pairings`.
#[derive(Debug, Serialize)]
pub struct PairingsBody {
    pub pairings: Vec<PairingBody>,
}

/// Possible responses from the pairing endpoints.
pub enum PairingResponse {
    Ok(Json<PairingBody>),
    List(Json<PairingsBody>),
    NoContent,
}

impl IntoResponse for PairingResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::List(json) => json.into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `POST /pair-setup`
pub async fn pair_setup<S, P>(
    State(state): State<AppState<S, P>>,
    Json(req): Json<PairSetupRequest>,
) -> Result<PairingResponse, ApiError>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let controller = parse_identifier(&req.identifier)?;
    let pairing = state.pairing.pair_setup(controller, &req.pin).await?;
    Ok(PairingResponse::Ok(Json(pairing.into())))
}

/// `GET /pairings`
pub async fn list<S, P>(
    State(state): State<AppState<S, P>>,
    Admin(requester): Admin,
) -> Result<PairingResponse, ApiError>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let pairings = state.pairing.list_pairings(&requester).await?;
    Ok(PairingResponse::List(Json(PairingsBody {
        pairings: pairings.into_iter().map(PairingBody::from).collect(),
    })))
}

/// `POST /pairings`
pub async fn add<S, P>(
    State(state): State<AppState<S, P>>,
    Admin(requester): Admin,
    Json(req): Json<AddPairingRequest>,
) -> Result<PairingResponse, ApiError>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let controller = parse_identifier(&req.identifier)?;
    let permissions = if req.admin {
        Permissions::Admin
    } else {
        Permissions::User
    };
    let pairing = state
        .pairing
        .add_pairing(&requester, controller, permissions)
        .await?;
    Ok(PairingResponse::Ok(Json(pairing.into())))
}

/// `DELETE /pairings/{identifier}`
pub async fn remove<S, P>(
    State(state): State<AppState<S, P>>,
    Admin(requester): Admin,
    Path(identifier): Path<String>,
) -> Result<PairingResponse, ApiError>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let controller = parse_identifier(&identifier)?;
    state.pairing.remove_pairing(&requester, controller).await?;
    Ok(PairingResponse::NoContent)
}

fn parse_identifier(raw: &str) -> Result<ControllerId, HapError> {
    raw.parse()
        .map_err(|_| ValidationError::InvalidControllerId(raw.to_string()).into())
}
