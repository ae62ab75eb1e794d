//! Authentication adapters.
//!
//! Implementations of the `CredentialService` port:
//!
//! - `JwtCredentialService` - HS256 JWTs over a shared secret

mod jwt;

pub use jwt::{JwtCredentialService, DEFAULT_TOKEN_TTL_SECS};
