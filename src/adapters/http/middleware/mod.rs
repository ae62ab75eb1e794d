//! HTTP middleware for axum.
//!
//! - `auth` - Bearer credential authorizer and the caller extractor

pub mod auth;

pub use auth::{authorize, AuthState, AuthorizerContext, RequireParticipant};
