//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HapError`]
//! via `#[from]` (or an explicit `From` impl for boxed storage errors).

/// Base error type shared by every crate of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum HapError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced resource does not exist.
    #[error("resource not found")]
    NotFound(#[from] NotFoundError),

    /// A pairing operation was refused.
    #[error("pairing error")]
    Pairing(#[from] PairingError),

    /// The persistent store failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A name was missing or empty.
    #[error("name must not be empty")]
    EmptyName,

    /// A pairing code is not made of 8 digits.
    #[error("pairing code must be 8 digits (XXX-XX-XXX)")]
    InvalidPinFormat,

    /// A pairing code is on the list of trivial codes.
    #[error("pairing code {0} is too easy to guess")]
    TrivialPin(String),

    /// A store key contains characters outside `[A-Za-z0-9._-]`.
    #[error("invalid store key {0:?}")]
    InvalidKey(String),

    /// A characteristic id is not of the `aid.iid` form.
    #[error("invalid characteristic id {0:?}")]
    InvalidCharacteristicId(String),

    /// A controller identifier is not a UUID.
    #[error("invalid controller identifier {0:?}")]
    InvalidControllerId(String),

    /// Two characteristics of the same accessory share an instance id.
    #[error("duplicate instance id {0}")]
    DuplicateInstanceId(u64),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of resource (e.g. `"Pairing"`).
    pub entity: &'static str,
    /// Identifier that was looked up.
    pub id: String,
}

/// Reasons a pairing request is refused.
///
/// The variants mirror the TLV error codes of the accessory protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingError {
    /// The pairing code did not match.
    #[error("authentication failed")]
    Authentication,

    /// The accessory is already paired and refuses another pair-setup.
    #[error("accessory is already paired")]
    Unavailable,

    /// Too many unsuccessful pair-setup attempts.
    #[error("too many failed attempts")]
    MaxTries,

    /// The caller is not an admin controller.
    #[error("insufficient privileges")]
    InsufficientPrivileges,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_hap_error() {
        let err: HapError = ValidationError::EmptyName.into();
        assert!(matches!(err, HapError::Validation(ValidationError::EmptyName)));
    }

    #[test]
    fn should_display_not_found_error_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Pairing",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Pairing abc not found");
    }

    #[test]
    fn should_display_trivial_pin() {
        let err = ValidationError::TrivialPin("12345678".to_string());
        assert_eq!(err.to_string(), "pairing code 12345678 is too easy to guess");
    }

    #[test]
    fn should_convert_pairing_error_into_hap_error() {
        let err: HapError = PairingError::MaxTries.into();
        assert!(matches!(err, HapError::Pairing(PairingError::MaxTries)));
    }
}
