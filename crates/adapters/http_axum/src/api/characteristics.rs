//! Characteristic read and write handlers.
//!
//! Both endpoints act on a batch of characteristics. When every item
//! succeeds the plain response is returned; otherwise the response is
//! `207 Multi-Status` and every item carries its own status.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use hapdemo_app::ports::{EventPublisher, KeyValueStore};
use hapdemo_domain::characteristic::CharacteristicValue;
use hapdemo_domain::error::HapError;
use hapdemo_domain::event::UpdateOrigin;
use hapdemo_domain::id::{Aid, CharacteristicRef, Iid};
use hapdemo_domain::status::HapStatus;

use crate::api::auth::Controller;
use crate::error::ApiError;
use crate::state::AppState;

/// Query string of `GET /characteristics`.
#[derive(Deserialize)]
pub struct ReadQuery {
    /// Comma-separated `aid.iid` list.
    pub id: String,
}

/// One characteristic in a read or write response.
#[derive(Debug, Serialize)]
pub struct CharacteristicItem {
    pub aid: Aid,
    pub iid: Iid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CharacteristicValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<HapStatus>,
}

/// Body of both responses.
#[derive(Debug, Serialize)]
pub struct CharacteristicsBody {
    pub characteristics: Vec<CharacteristicItem>,
}

/// Body of `PUT /characteristics`.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub characteristics: Vec<WriteItem>,
}

/// One characteristic write.
#[derive(Debug, Deserialize)]
pub struct WriteItem {
    pub aid: Aid,
    pub iid: Iid,
    #[serde(default)]
    pub value: Option<CharacteristicValue>,
    /// Event notification subscription change.
    #[serde(default)]
    pub ev: Option<bool>,
}

/// Possible responses from the read endpoint.
pub enum ReadResponse {
    Ok(Json<CharacteristicsBody>),
    MultiStatus(Json<CharacteristicsBody>),
}

impl IntoResponse for ReadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::MultiStatus(json) => (StatusCode::MULTI_STATUS, json).into_response(),
        }
    }
}

/// Possible responses from the write endpoint.
pub enum WriteResponse {
    NoContent,
    MultiStatus(Json<CharacteristicsBody>),
}

impl IntoResponse for WriteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::MultiStatus(json) => (StatusCode::MULTI_STATUS, json).into_response(),
        }
    }
}

/// `GET /characteristics?id=1.9,1.11`
pub async fn read<S, P>(
    State(state): State<AppState<S, P>>,
    Controller(_): Controller,
    Query(query): Query<ReadQuery>,
) -> Result<ReadResponse, ApiError>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let targets = parse_ids(&query.id)?;
    let results: Vec<_> = targets
        .into_iter()
        .map(|target| (target, state.registry.read(target)))
        .collect();

    if results.iter().all(|(_, result)| result.is_ok()) {
        let characteristics = results
            .into_iter()
            .map(|(target, result)| CharacteristicItem {
                aid: target.aid,
                iid: target.iid,
                value: result.ok(),
                status: None,
            })
            .collect();
        return Ok(ReadResponse::Ok(Json(CharacteristicsBody { characteristics })));
    }

    let characteristics = results
        .into_iter()
        .map(|(target, result)| match result {
            Ok(value) => CharacteristicItem {
                aid: target.aid,
                iid: target.iid,
                value: Some(value),
                status: Some(HapStatus::Success),
            },
            Err(status) => CharacteristicItem {
                aid: target.aid,
                iid: target.iid,
                value: None,
                status: Some(status),
            },
        })
        .collect();
    Ok(ReadResponse::MultiStatus(Json(CharacteristicsBody {
        characteristics,
    })))
}

/// `PUT /characteristics`
pub async fn write<S, P>(
    State(state): State<AppState<S, P>>,
    Controller(controller): Controller,
    Json(request): Json<WriteRequest>,
) -> WriteResponse
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let origin = UpdateOrigin::Remote {
        controller: Some(controller.controller),
    };
    let mut statuses = Vec::with_capacity(request.characteristics.len());
    for item in request.characteristics {
        let target = CharacteristicRef::new(item.aid, item.iid);
        let status = match apply(&state, target, &item, origin) {
            Ok(()) => HapStatus::Success,
            Err(status) => {
                tracing::debug!(%target, ?status, "characteristic write refused");
                status
            }
        };
        statuses.push((target, status));
    }

    if statuses.iter().all(|(_, status)| status.is_success()) {
        return WriteResponse::NoContent;
    }
    let characteristics = statuses
        .into_iter()
        .map(|(target, status)| CharacteristicItem {
            aid: target.aid,
            iid: target.iid,
            value: None,
            status: Some(status),
        })
        .collect();
    WriteResponse::MultiStatus(Json(CharacteristicsBody { characteristics }))
}

fn apply<S, P>(
    state: &AppState<S, P>,
    target: CharacteristicRef,
    item: &WriteItem,
    origin: UpdateOrigin,
) -> Result<(), HapStatus>
where
    S: KeyValueStore + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    if item.ev == Some(true) {
        state.registry.check_events(target)?;
    }
    if let Some(value) = &item.value {
        state.registry.write(target, value, origin)?;
    }
    Ok(())
}

fn parse_ids(raw: &str) -> Result<Vec<CharacteristicRef>, HapError> {
    raw.split(',')
        .map(|part| part.trim().parse::<CharacteristicRef>().map_err(HapError::from))
        .collect()
}
