//! Credential service port.
//!
//! Issues and verifies the signed, time-limited credentials that are the
//! only authorization mechanism. Verification never consults the store: a
//! credential stays valid for its whole window even if the participant it
//! names changes afterwards.

use crate::domain::foundation::{AccessToken, AuthError, ParticipantClaims, Timestamp};
use crate::domain::room::Participant;

/// Issues and verifies participant credentials.
///
/// Pure function of a shared secret, so the trait is synchronous.
///
/// # Contract
///
/// - `verify(issue(p))` returns claims matching `p` until the window elapses
/// - `Invalid` when the signature does not check out
/// - `Expired` when the signature is good but the window has elapsed
/// - `Malformed` when the token cannot be parsed
pub trait CredentialService: Send + Sync {
    /// Issue a credential for `participant`, valid from now.
    fn issue(&self, participant: &Participant) -> Result<AccessToken, AuthError> {
        self.issue_at(participant, Timestamp::now())
    }

    /// Issue a credential as if the current time were `issued_at`.
    fn issue_at(
        &self,
        participant: &Participant,
        issued_at: Timestamp,
    ) -> Result<AccessToken, AuthError>;

    /// Check signature and expiry and return the asserted identity.
    fn verify(&self, token: &str) -> Result<ParticipantClaims, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_service_is_object_safe() {
        fn _accepts_dyn(_svc: &dyn CredentialService) {}
    }
}
