//! Per-characteristic status codes returned by the accessory protocol.

use serde::{Deserialize, Serialize};

/// Status of a single characteristic read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum HapStatus {
    Success,
    InsufficientPrivileges,
    ServiceCommunicationFailure,
    ResourceBusy,
    ReadOnly,
    WriteOnly,
    NotificationNotSupported,
    OutOfResources,
    Timeout,
    ResourceDoesNotExist,
    InvalidValue,
    InsufficientAuthorization,
}

impl HapStatus {
    /// Numeric code as sent on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InsufficientPrivileges => -70401,
            Self::ServiceCommunicationFailure => -70402,
            Self::ResourceBusy => -70403,
            Self::ReadOnly => -70404,
            Self::WriteOnly => -70405,
            Self::NotificationNotSupported => -70406,
            Self::OutOfResources => -70407,
            Self::Timeout => -70408,
            Self::ResourceDoesNotExist => -70409,
            Self::InvalidValue => -70410,
            Self::InsufficientAuthorization => -70411,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<HapStatus> for i32 {
    fn from(status: HapStatus) -> Self {
        status.code()
    }
}

/// Error returned when decoding an unknown status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status code {0}")]
pub struct UnknownStatus(pub i32);

impl TryFrom<i32> for HapStatus {
    type Error = UnknownStatus;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        let status = match code {
            0 => Self::Success,
            -70401 => Self::InsufficientPrivileges,
            -70402 => Self::ServiceCommunicationFailure,
            -70403 => Self::ResourceBusy,
            -70404 => Self::ReadOnly,
            -70405 => Self::WriteOnly,
            -70406 => Self::NotificationNotSupported,
            -70407 => Self::OutOfResources,
            -70408 => Self::Timeout,
            -70409 => Self::ResourceDoesNotExist,
            -70410 => Self::InvalidValue,
            -70411 => Self::InsufficientAuthorization,
            other => return Err(UnknownStatus(other)),
        };
        Ok(status)
    }
}

impl std::fmt::Display for HapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.code().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_as_numeric_code() {
        let json = serde_json::to_string(&HapStatus::ResourceDoesNotExist).unwrap();
        assert_eq!(json, "-70409");
    }

    #[test]
    fn should_decode_known_code() {
        let status: HapStatus = serde_json::from_str("-70404").unwrap();
        assert_eq!(status, HapStatus::ReadOnly);
    }

    #[test]
    fn should_reject_unknown_code() {
        assert_eq!(HapStatus::try_from(42), Err(UnknownStatus(42)));
    }

    #[test]
    fn should_only_report_success_for_zero() {
        assert!(HapStatus::Success.is_success());
        assert!(!HapStatus::InvalidValue.is_success());
    }
}
