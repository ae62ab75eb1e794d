//! Credential types for the domain layer.
//!
//! A credential is a signed, time-limited token asserting that its bearer is
//! a named participant of a room, optionally its admin. Claims are derived
//! from a `Participant` at issuance and are trusted for the whole validity
//! window; nothing here consults the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{ParticipantName, RoomId, Timestamp};

/// Identity asserted by a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantClaims {
    pub room_id: RoomId,
    pub name: ParticipantName,
    pub is_admin: bool,
    pub expires_at: Timestamp,
}

impl ParticipantClaims {
    /// True when these claims carry the room admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// An encoded, signed credential handed to clients.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Errors raised while issuing or verifying credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Signature check failed.
    #[error("Invalid token")]
    Invalid,

    /// Signature is valid but the validity window has elapsed.
    #[error("Token expired")]
    Expired,

    /// The token could not be parsed at all.
    #[error("Malformed token")]
    Malformed,

    /// Encoding a new token failed.
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// Returns true if the client should obtain a fresh credential.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::Invalid | AuthError::Expired | AuthError::Malformed)
    }
}
