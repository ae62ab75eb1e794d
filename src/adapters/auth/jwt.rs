//! HS256 JWT credential service.
//!
//! Tokens carry `{room_id, name, is_admin, iat, exp}` and are signed with a
//! shared secret. There is no revocation: a token is honoured until `exp`.
//!
//! # Security
//!
//! - Only HS256 is accepted; tokens signed with any other algorithm are `Invalid`
//! - Expiry is checked with zero leeway
//! - The secret lives in a `SecretString` and is never logged

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{
    AccessToken, AuthError, ParticipantClaims, ParticipantName, RoomId, Timestamp,
};
use crate::domain::room::Participant;
use crate::ports::CredentialService;

/// Default validity window: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Wire form of the claims.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    room_id: String,
    name: String,
    is_admin: bool,
    iat: i64,
    exp: i64,
}

/// Issues and verifies participant credentials as HS256 JWTs.
pub struct JwtCredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtCredentialService {
    pub fn new(secret: &SecretString, ttl_secs: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
            ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }

    fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
        match err.kind() {
            ErrorKind::ExpiredSignature => {
                tracing::debug!("token expired");
                AuthError::Expired
            }
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::MissingRequiredClaim(_) => {
                tracing::debug!(error = %err, "malformed token");
                AuthError::Malformed
            }
            _ => {
                tracing::warn!(error = %err, "token rejected");
                AuthError::Invalid
            }
        }
    }
}

impl std::fmt::Debug for JwtCredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredentialService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl CredentialService for JwtCredentialService {
    fn issue_at(
        &self,
        participant: &Participant,
        issued_at: Timestamp,
    ) -> Result<AccessToken, AuthError> {
        let iat = issued_at.as_unix_secs();
        let claims = TokenClaims {
            room_id: participant.room_id().to_string(),
            name: participant.name().to_string(),
            is_admin: participant.is_admin(),
            iat,
            exp: iat + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(AccessToken::new)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<ParticipantClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(Self::map_decode_error)?;
        let claims = data.claims;

        Ok(ParticipantClaims {
            room_id: RoomId::parse(claims.room_id).map_err(|_| AuthError::Malformed)?,
            name: ParticipantName::new(claims.name).map_err(|_| AuthError::Malformed)?,
            is_admin: claims.is_admin,
            expires_at: Timestamp::from_unix_secs(claims.exp).ok_or(AuthError::Malformed)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes!!";

    fn service() -> JwtCredentialService {
        JwtCredentialService::new(&SecretString::new(SECRET.to_string()), DEFAULT_TOKEN_TTL_SECS)
    }

    fn participant(name: &str, is_admin: bool) -> Participant {
        Participant::new(
            RoomId::parse("aB3xY9").unwrap(),
            ParticipantName::new(name).unwrap(),
            is_admin,
        )
    }

    #[test]
    fn issued_token_verifies_to_the_same_identity() {
        let svc = service();
        let alice = participant("Alice", true);

        let token = svc.issue(&alice).unwrap();
        let claims = svc.verify(token.as_str()).unwrap();

        assert_eq!(&claims.room_id, alice.room_id());
        assert_eq!(&claims.name, alice.name());
        assert!(claims.is_admin());
    }

    #[test]
    fn validity_window_is_the_configured_ttl() {
        let svc = service();
        let issued_at = Timestamp::now();

        let token = svc.issue_at(&participant("Bob", false), issued_at).unwrap();
        let claims = svc.verify(token.as_str()).unwrap();

        assert_eq!(
            claims.expires_at.as_unix_secs(),
            issued_at.as_unix_secs() + DEFAULT_TOKEN_TTL_SECS
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let issued_at = Timestamp::now().plus_secs(-(DEFAULT_TOKEN_TTL_SECS + 60));

        let token = svc.issue_at(&participant("Bob", false), issued_at).unwrap();

        assert_eq!(svc.verify(token.as_str()), Err(AuthError::Expired));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let other = JwtCredentialService::new(
            &SecretString::new("a-completely-different-secret-value!!".to_string()),
            DEFAULT_TOKEN_TTL_SECS,
        );
        let token = other.issue(&participant("Mallory", true)).unwrap();

        assert_eq!(service().verify(token.as_str()), Err(AuthError::Invalid));
    }

    #[test]
    fn other_algorithms_are_invalid() {
        let claims = TokenClaims {
            room_id: "aB3xY9".to_string(),
            name: "Mallory".to_string(),
            is_admin: true,
            iat: Timestamp::now().as_unix_secs(),
            exp: Timestamp::now().plus_secs(60).as_unix_secs(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().verify("not-a-jwt"), Err(AuthError::Malformed));
        assert_eq!(service().verify(""), Err(AuthError::Malformed));
    }

    proptest! {
        #[test]
        fn roundtrip_preserves_identity(
            name in "[A-Za-z][A-Za-z0-9 ]{0,30}[A-Za-z0-9]",
            is_admin in any::<bool>(),
        ) {
            let svc = service();
            let p = participant(&name, is_admin);

            let claims = svc.verify(svc.issue(&p).unwrap().as_str()).unwrap();

            prop_assert_eq!(&claims.name, p.name());
            prop_assert_eq!(claims.is_admin, is_admin);
        }
    }
}
