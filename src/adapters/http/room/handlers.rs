//! HTTP handlers for room endpoints.
//!
//! These handlers connect axum routes to the application layer handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::room::{
    CastVoteCommand, CastVoteHandler, FindParticipantsHandler, FindParticipantsQuery,
    FindRoomHandler, FindRoomQuery, HostRoomCommand, HostRoomHandler, JoinRoomCommand,
    JoinRoomHandler, ResetVotesCommand, ResetVotesHandler, RevealVotesCommand,
    RevealVotesHandler,
};
use crate::domain::foundation::CommandMetadata;
use crate::ports::{CredentialService, EventPublisher, RoomRepository};

use super::super::error::ApiError;
use super::super::middleware::RequireParticipant;
use super::dto::{
    CastVoteRequest, EmptyResponse, HostRoomRequest, HostRoomResponse, JoinRoomRequest,
    JoinRoomResponse, ParticipantResponse, RoomResponse,
};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for room routes.
///
/// Cloned per request; handlers are built on demand from the shared ports.
#[derive(Clone)]
pub struct RoomAppState {
    pub repository: Arc<dyn RoomRepository>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub credentials: Arc<dyn CredentialService>,
}

impl RoomAppState {
    pub fn host_room_handler(&self) -> HostRoomHandler {
        HostRoomHandler::new(self.repository.clone(), self.credentials.clone())
    }

    pub fn join_room_handler(&self) -> JoinRoomHandler {
        JoinRoomHandler::new(
            self.repository.clone(),
            self.credentials.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn find_room_handler(&self) -> FindRoomHandler {
        FindRoomHandler::new(self.repository.clone())
    }

    pub fn find_participants_handler(&self) -> FindParticipantsHandler {
        FindParticipantsHandler::new(self.repository.clone())
    }

    pub fn cast_vote_handler(&self) -> CastVoteHandler {
        CastVoteHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn reveal_votes_handler(&self) -> RevealVotesHandler {
        RevealVotesHandler::new(self.event_publisher.clone())
    }

    pub fn reset_votes_handler(&self) -> ResetVotesHandler {
        ResetVotesHandler::new(self.repository.clone(), self.event_publisher.clone())
    }
}

/// Command metadata for one request, reusing the caller's correlation id
/// when one is supplied.
fn request_metadata(headers: &HeaderMap) -> CommandMetadata {
    let metadata = CommandMetadata::new().with_source("http");
    match headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        Some(id) => metadata.with_correlation_id(id),
        None => metadata,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Public endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /rooms - Host a new room
pub async fn host_room(
    State(state): State<RoomAppState>,
    headers: HeaderMap,
    body: Result<Json<HostRoomRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = HostRoomCommand { name: request.name };

    let result = state
        .host_room_handler()
        .handle(cmd, request_metadata(&headers))
        .await?;

    let response = HostRoomResponse {
        room_id: result.room.id().to_string(),
        access_token: result.access_token.into_inner(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /rooms/join - Join an existing room
pub async fn join_room(
    State(state): State<RoomAppState>,
    headers: HeaderMap,
    body: Result<Json<JoinRoomRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = JoinRoomCommand {
        room_id: request.room_id,
        name: request.name,
    };

    let result = state
        .join_room_handler()
        .handle(cmd, request_metadata(&headers))
        .await?;

    Ok(Json(JoinRoomResponse {
        access_token: result.access_token.into_inner(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Authenticated endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /room - The room named by the caller's credential
pub async fn get_room(
    State(state): State<RoomAppState>,
    RequireParticipant(caller): RequireParticipant,
) -> Result<impl IntoResponse, ApiError> {
    let query = FindRoomQuery {
        room_id: caller.room_id.to_string(),
    };
    let room = state.find_room_handler().handle(query).await?;
    Ok(Json(RoomResponse::from(room)))
}

/// GET /participants - Everyone in the caller's room
pub async fn list_participants(
    State(state): State<RoomAppState>,
    RequireParticipant(caller): RequireParticipant,
) -> Result<impl IntoResponse, ApiError> {
    let participants = state
        .find_participants_handler()
        .handle(FindParticipantsQuery { caller })
        .await?;

    let response: Vec<ParticipantResponse> =
        participants.into_iter().map(ParticipantResponse::from).collect();
    Ok(Json(response))
}

/// POST /votes - Cast or change the caller's vote
pub async fn cast_vote(
    State(state): State<RoomAppState>,
    headers: HeaderMap,
    RequireParticipant(caller): RequireParticipant,
    body: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let cmd = CastVoteCommand {
        caller,
        vote: request.vote,
    };

    state
        .cast_vote_handler()
        .handle(cmd, request_metadata(&headers))
        .await?;
    Ok(Json(EmptyResponse::default()))
}

/// POST /votes/reveal - Reveal the room's votes (admin only)
pub async fn reveal_votes(
    State(state): State<RoomAppState>,
    headers: HeaderMap,
    RequireParticipant(caller): RequireParticipant,
) -> Result<impl IntoResponse, ApiError> {
    state
        .reveal_votes_handler()
        .handle(RevealVotesCommand { caller }, request_metadata(&headers))
        .await?;
    Ok(Json(EmptyResponse::default()))
}

/// POST /votes/reset - Clear every vote in the room (admin only)
pub async fn reset_votes(
    State(state): State<RoomAppState>,
    headers: HeaderMap,
    RequireParticipant(caller): RequireParticipant,
) -> Result<impl IntoResponse, ApiError> {
    state
        .reset_votes_handler()
        .handle(ResetVotesCommand { caller }, request_metadata(&headers))
        .await?;
    Ok(Json(EmptyResponse::default()))
}
