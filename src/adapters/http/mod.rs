//! HTTP adapters - REST API implementations.
//!
//! - `room` - Room, vote and participant endpoints
//! - `middleware` - Credential authorizer
//! - `error` - Error to status mapping
//! - `health` - Liveness probe

pub mod error;
pub mod health;
pub mod middleware;
pub mod room;

pub use error::{ApiError, ErrorResponse};
pub use health::health_router;
pub use room::{room_router, RoomAppState};

use std::time::Duration;

use axum::Router;
use http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{live_router, LiveState};

/// Assemble every route with the shared layers.
///
/// An empty `cors_origins` allows any origin.
pub fn app_router(
    rooms: RoomAppState,
    live: LiveState,
    request_timeout: Duration,
    cors_origins: &[String],
) -> Router {
    // The live route holds its connection open, so it stays outside the timeout
    let api = Router::new()
        .merge(health_router())
        .merge(room_router(rooms))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(api)
        .merge(live_router(live))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
