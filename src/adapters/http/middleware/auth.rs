//! Credential authorizer and extractors for axum.
//!
//! This module provides:
//! - `authorize` - Layer that verifies the Bearer credential and injects an
//!   `AuthorizerContext` into request extensions
//! - `RequireParticipant` - Extractor that re-derives the caller's identity
//!   from that context
//!
//! # Architecture
//!
//! ```text
//! Request → authorize → injects AuthorizerContext {RoomID, Name, IsAdmin}
//!                                      ↓
//!                  Handler → RequireParticipant reads and parses the context
//! ```
//!
//! The context holds plain string attributes, so the handler side treats a
//! missing or unparseable attribute as a wiring fault rather than a client
//! error.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::foundation::{ParticipantClaims, ParticipantName, RoomId};
use crate::domain::room::{ParticipantIdentity, RoomError};
use crate::ports::CredentialService;

use super::super::error::ApiError;

/// Authorizer state - wraps the credential service.
pub type AuthState = Arc<dyn CredentialService>;

pub const ROOM_ID_ATTRIBUTE: &str = "RoomID";
pub const NAME_ATTRIBUTE: &str = "Name";
pub const IS_ADMIN_ATTRIBUTE: &str = "IsAdmin";

/// Identity attributes forwarded by the authorizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizerContext {
    attributes: HashMap<String, String>,
}

impl AuthorizerContext {
    pub fn from_claims(claims: &ParticipantClaims) -> Self {
        Self::default()
            .with(ROOM_ID_ATTRIBUTE, claims.room_id.as_str())
            .with(NAME_ATTRIBUTE, claims.name.as_str())
            .with(IS_ADMIN_ATTRIBUTE, if claims.is_admin { "true" } else { "false" })
    }

    /// Builder: set one attribute.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn require(&self, key: &str) -> Result<&str, RoomError> {
        self.get(key)
            .ok_or_else(|| RoomError::configuration(format!("authorizer context has no {}", key)))
    }

    /// Rebuild the caller's identity from the attributes.
    ///
    /// # Errors
    ///
    /// `Configuration` when an attribute is missing, unparseable, or
    /// `IsAdmin` is anything but `"true"`/`"false"`.
    pub fn identity(&self) -> Result<ParticipantIdentity, RoomError> {
        let room_id = RoomId::parse(self.require(ROOM_ID_ATTRIBUTE)?)
            .map_err(|e| RoomError::configuration(format!("bad {}: {}", ROOM_ID_ATTRIBUTE, e)))?;
        let name = ParticipantName::new(self.require(NAME_ATTRIBUTE)?)
            .map_err(|e| RoomError::configuration(format!("bad {}: {}", NAME_ATTRIBUTE, e)))?;
        let is_admin = match self.require(IS_ADMIN_ATTRIBUTE)? {
            "true" => true,
            "false" => false,
            other => {
                return Err(RoomError::configuration(format!(
                    "{} must be \"true\" or \"false\", got {:?}",
                    IS_ADMIN_ATTRIBUTE, other
                )))
            }
        };
        Ok(ParticipantIdentity::new(room_id, name, is_admin))
    }
}

/// Authorizer middleware.
///
/// A request without a verifiable `Authorization: Bearer <token>` header is
/// denied with a bare 401 and never reaches the handler.
pub async fn authorize(
    State(credentials): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match credentials.verify(token) {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthorizerContext::from_claims(&claims));
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "credential rejected");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// Extractor for the authenticated caller.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(RequireParticipant(caller): RequireParticipant) -> impl IntoResponse {
///     format!("Hello, {}!", caller.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireParticipant(pub ParticipantIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireParticipant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = parts.extensions.get::<AuthorizerContext>().ok_or_else(|| {
            tracing::error!("route reached without authorizer context");
            ApiError::from(RoomError::configuration("authorizer context missing"))
        })?;
        Ok(RequireParticipant(context.identity()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::JwtCredentialService;
    use crate::domain::foundation::Timestamp;
    use crate::domain::room::Participant;
    use axum::{body::Body, middleware, routing::get, Router};
    use secrecy::SecretString;
    use tower::ServiceExt;

    fn credentials() -> Arc<JwtCredentialService> {
        Arc::new(JwtCredentialService::new(
            &SecretString::new("authorizer-test-secret".to_string()),
            3600,
        ))
    }

    fn claims(is_admin: bool) -> ParticipantClaims {
        ParticipantClaims {
            room_id: RoomId::parse("aB3xY9").unwrap(),
            name: ParticipantName::new("Alice").unwrap(),
            is_admin,
            expires_at: Timestamp::now(),
        }
    }

    fn app(credentials: Arc<JwtCredentialService>) -> Router {
        async fn whoami(RequireParticipant(caller): RequireParticipant) -> String {
            format!("{}:{}:{}", caller.room_id, caller.name, caller.is_admin)
        }
        let state: AuthState = credentials;
        Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(state, authorize))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().uri("/me");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        (status, body)
    }

    #[test]
    fn context_carries_string_attributes() {
        let context = AuthorizerContext::from_claims(&claims(true));

        assert_eq!(context.get(ROOM_ID_ATTRIBUTE), Some("aB3xY9"));
        assert_eq!(context.get(NAME_ATTRIBUTE), Some("Alice"));
        assert_eq!(context.get(IS_ADMIN_ATTRIBUTE), Some("true"));
    }

    #[test]
    fn identity_roundtrips_through_context() {
        let identity = AuthorizerContext::from_claims(&claims(false)).identity().unwrap();

        assert_eq!(identity.name.as_str(), "Alice");
        assert!(!identity.is_admin);
    }

    #[test]
    fn missing_attribute_is_configuration_error() {
        let context = AuthorizerContext::default()
            .with(ROOM_ID_ATTRIBUTE, "aB3xY9")
            .with(IS_ADMIN_ATTRIBUTE, "false");

        assert!(matches!(context.identity(), Err(RoomError::Configuration(_))));
    }

    #[test]
    fn non_literal_is_admin_is_configuration_error() {
        let context = AuthorizerContext::from_claims(&claims(true)).with(IS_ADMIN_ATTRIBUTE, "yes");

        assert!(matches!(context.identity(), Err(RoomError::Configuration(_))));
    }

    #[tokio::test]
    async fn valid_bearer_reaches_handler() {
        let credentials = credentials();
        let participant = Participant::new(
            RoomId::parse("aB3xY9").unwrap(),
            ParticipantName::new("Alice").unwrap(),
            true,
        );
        let token = credentials.issue(&participant).unwrap();

        let (status, body) = call(
            app(credentials),
            Some(&format!("Bearer {}", token.as_str())),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"aB3xY9:Alice:true");
    }

    #[tokio::test]
    async fn missing_or_bad_credentials_get_bare_401() {
        for header in [None, Some("Bearer not-a-jwt"), Some("Basic dXNlcjpwYXNz")] {
            let (status, body) = call(app(credentials()), header).await;

            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn extractor_without_context_is_server_error() {
        async fn whoami(RequireParticipant(caller): RequireParticipant) -> String {
            caller.name.to_string()
        }
        let app = Router::new().route("/me", get(whoami));

        let (status, _) = call(app, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
    }
}
