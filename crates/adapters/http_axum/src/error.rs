//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hapdemo_domain::error::{HapError, PairingError};
use hapdemo_domain::status::HapStatus;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON body carrying a single protocol status.
#[derive(Serialize)]
pub struct StatusBody {
    pub status: HapStatus,
}

/// HTTP status a controller gets when it must pair (or pair again) first.
#[must_use]
pub fn connection_authorization_required() -> StatusCode {
    StatusCode::from_u16(470).unwrap_or(StatusCode::UNAUTHORIZED)
}

/// Maps [`HapError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(HapError);

impl From<HapError> for ApiError {
    fn from(err: HapError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HapError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            HapError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            HapError::Pairing(err) => (pairing_status(err), pairing_code(err).to_string()),
            HapError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

fn pairing_status(err: &PairingError) -> StatusCode {
    match err {
        PairingError::Authentication => StatusCode::UNAUTHORIZED,
        PairingError::Unavailable | PairingError::InsufficientPrivileges => StatusCode::FORBIDDEN,
        PairingError::MaxTries => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn pairing_code(err: &PairingError) -> &'static str {
    match err {
        PairingError::Authentication => "authentication",
        PairingError::Unavailable => "unavailable",
        PairingError::MaxTries => "max-tries",
        PairingError::InsufficientPrivileges => "insufficient-privileges",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hapdemo_domain::error::{NotFoundError, ValidationError};

    #[test]
    fn should_map_domain_errors_to_http_statuses() {
        let cases = [
            (
                HapError::from(ValidationError::InvalidCharacteristicId("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                HapError::from(NotFoundError {
                    entity: "Pairing",
                    id: "x".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                HapError::from(PairingError::Authentication),
                StatusCode::UNAUTHORIZED,
            ),
            (
                HapError::from(PairingError::Unavailable),
                StatusCode::FORBIDDEN,
            ),
            (
                HapError::from(PairingError::MaxTries),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                HapError::Storage("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn should_use_hap_connection_authorization_status() {
        assert_eq!(connection_authorization_required().as_u16(), 470);
    }
}
