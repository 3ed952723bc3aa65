//! Pairing — the trust relationship between the accessory server and a
//! controller, and the pairing code used to establish it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HapError, ValidationError};
use crate::id::ControllerId;

/// Codes the accessory protocol forbids because they are trivially guessable.
const TRIVIAL_PINS: &[&str] = &[
    "00000000", "11111111", "22222222", "33333333", "44444444", "55555555", "66666666",
    "77777777", "88888888", "99999999", "12345678", "87654321",
];

/// An 8-digit pairing code.
///
/// Accepts both `00102003` and the displayed `001-02-003` form.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Parse and validate a pairing code.
    ///
    /// # Errors
    ///
    /// Returns [`HapError::Validation`] when the code is not 8 digits or is
    /// one of the trivial codes.
    pub fn parse(input: &str) -> Result<Self, HapError> {
        let digits = strip_dashes(input);
        if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidPinFormat.into());
        }
        if TRIVIAL_PINS.contains(&digits.as_str()) {
            return Err(ValidationError::TrivialPin(digits).into());
        }
        Ok(Self(digits))
    }

    /// The 8 digits without separators.
    #[must_use]
    pub fn as_digits(&self) -> &str {
        &self.0
    }

    /// Whether `candidate` (with or without dashes) is this code.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        strip_dashes(candidate) == self.0
    }
}

fn strip_dashes(input: &str) -> String {
    input.trim().chars().filter(|c| *c != '-').collect()
}

impl FromStr for Pin {
    type Err = HapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", &self.0[..3], &self.0[3..5], &self.0[5..])
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(***)")
    }
}

/// What a paired controller is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permissions {
    /// Regular controller.
    User,
    /// May add, remove and list pairings.
    Admin,
}

/// A stored pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub controller: ControllerId,
    pub permissions: Permissions,
    pub paired_at: DateTime<Utc>,
}

impl Pairing {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.permissions == Permissions::Admin
    }
}
