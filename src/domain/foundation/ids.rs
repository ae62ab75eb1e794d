//! Strongly-typed identifier value objects.

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Number of characters in a room code.
pub const ROOM_ID_LENGTH: usize = 6;

/// Longest participant name accepted.
pub const MAX_NAME_LENGTH: usize = 64;

/// Short public code identifying a room.
///
/// Generated codes are always [`ROOM_ID_LENGTH`] characters drawn from
/// `[A-Za-z0-9]`. Codes parsed from client input only need to be non-blank;
/// anything that could never have been generated simply never matches a
/// stored room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Samples a fresh candidate code from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Samples a candidate code from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_ID_LENGTH)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self(code)
    }

    /// Parses a room code supplied by a client.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("room_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// True when the code has the shape of a generated room code.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ROOM_ID_LENGTH && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of a participant, unique within its room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantName(String);

impl ParticipantName {
    /// Creates a participant name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `TooLong` if the name exceeds [`MAX_NAME_LENGTH`] characters
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LENGTH {
            return Err(ValidationError::too_long("name", MAX_NAME_LENGTH, len));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
