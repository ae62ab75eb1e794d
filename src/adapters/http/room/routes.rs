//! Axum router configuration for room endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::super::middleware::{authorize, AuthState};
use super::handlers::{
    cast_vote, get_room, host_room, join_room, list_participants, reset_votes, reveal_votes,
    RoomAppState,
};

/// Routes anyone may call.
///
/// - `POST /rooms` - Host a room
/// - `POST /rooms/join` - Join a room
pub fn public_routes() -> Router<RoomAppState> {
    Router::new()
        .route("/rooms", post(host_room))
        .route("/rooms/join", post(join_room))
}

/// Routes behind the credential authorizer.
///
/// - `GET /room`
/// - `GET /participants`
/// - `POST /votes`
/// - `POST /votes/reveal`
/// - `POST /votes/reset`
pub fn authenticated_routes(credentials: AuthState) -> Router<RoomAppState> {
    Router::new()
        .route("/room", get(get_room))
        .route("/participants", get(list_participants))
        .route("/votes", post(cast_vote))
        .route("/votes/reveal", post(reveal_votes))
        .route("/votes/reset", post(reset_votes))
        // route_layer so unknown paths still 404 instead of 401
        .route_layer(middleware::from_fn_with_state(credentials, authorize))
}

/// Create the complete room router with its state applied.
///
/// # Example
///
/// ```ignore
/// let state = RoomAppState { repository, event_publisher, credentials };
/// let app = Router::new().merge(room_router(state));
/// ```
pub fn room_router(state: RoomAppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(state.credentials.clone()))
        .with_state(state)
}
