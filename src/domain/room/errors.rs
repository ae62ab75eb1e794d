//! Room use-case error types.

use crate::domain::foundation::{AuthError, DomainError, ErrorCode, RoomId, ValidationError};

/// Errors surfaced by the room use cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Client input was missing or malformed.
    ValidationFailed { field: String, message: String },
    /// The room does not exist.
    RoomNotFound(RoomId),
    /// The participant does not exist in the room.
    ParticipantNotFound { room_id: RoomId, name: String },
    /// The name is already taken in the room.
    ParticipantAlreadyExists { room_id: RoomId, name: String },
    /// The caller lacks the admin role.
    Forbidden,
    /// Identity attributes or collaborators are missing or unusable.
    Configuration(String),
    /// A store, fanout or credential dependency failed.
    Dependency(String),
}

impl RoomError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RoomError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn room_not_found(room_id: RoomId) -> Self {
        RoomError::RoomNotFound(room_id)
    }
    pub fn participant_not_found(room_id: RoomId, name: impl Into<String>) -> Self {
        RoomError::ParticipantNotFound {
            room_id,
            name: name.into(),
        }
    }
    pub fn already_exists(room_id: RoomId, name: impl Into<String>) -> Self {
        RoomError::ParticipantAlreadyExists {
            room_id,
            name: name.into(),
        }
    }
    pub fn forbidden() -> Self {
        RoomError::Forbidden
    }
    pub fn configuration(message: impl Into<String>) -> Self {
        RoomError::Configuration(message.into())
    }
    pub fn dependency(message: impl Into<String>) -> Self {
        RoomError::Dependency(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RoomError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            RoomError::RoomNotFound(_) => ErrorCode::RoomNotFound,
            RoomError::ParticipantNotFound { .. } => ErrorCode::ParticipantNotFound,
            RoomError::ParticipantAlreadyExists { .. } => ErrorCode::ParticipantAlreadyExists,
            RoomError::Forbidden => ErrorCode::Forbidden,
            RoomError::Configuration(_) => ErrorCode::ConfigurationError,
            RoomError::Dependency(_) => ErrorCode::InternalError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RoomError::ValidationFailed { message, .. } => message.clone(),
            RoomError::RoomNotFound(id) => format!("room {} not found", id),
            RoomError::ParticipantNotFound { room_id, name } => {
                format!("participant {} not found in room {}", name, room_id)
            }
            RoomError::ParticipantAlreadyExists { room_id, name } => {
                format!("participant {} already exists in room {}", name, room_id)
            }
            RoomError::Forbidden => "only the room admin can do that".to_string(),
            RoomError::Configuration(msg) => format!("configuration error: {}", msg),
            RoomError::Dependency(msg) => format!("dependency error: {}", msg),
        }
    }

    /// True for failures the caller cannot fix by changing the request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, RoomError::Configuration(_) | RoomError::Dependency(_))
    }
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RoomError {}

impl From<ValidationError> for RoomError {
    fn from(err: ValidationError) -> Self {
        RoomError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Port failures. Not-found results come back from ports as `None`, so a
/// `DomainError` reaching this point is a dependency problem unless the
/// adapter says otherwise.
impl From<DomainError> for RoomError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => RoomError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::ConfigurationError => RoomError::Configuration(err.message),
            _ => RoomError::Dependency(err.to_string()),
        }
    }
}

/// Only issuance reaches the use cases; verification failures are handled
/// by the authorizer before a handler runs.
impl From<AuthError> for RoomError {
    fn from(err: AuthError) -> Self {
        RoomError::Dependency(err.to_string())
    }
}
