//! API route handlers.
//!
//! Handlers are organized by resource:
//!
//! - `health`: health check endpoint
//! - `users`: registration, login, confirmation, password reset, profile
//! - `projects`: project CRUD and collaborator management
//! - `tasks`: task CRUD and state toggling

use crate::error::ApiError;
use serde::Serialize;
use uuid::Uuid;

pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

/// Plain message response used by endpoints with nothing else to return
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Parses a path segment as a resource id.
///
/// Malformed ids are indistinguishable from absent resources on the
/// wire: both come back 404 with the same message. Handlers never see
/// a 400 from the path extractor.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_canonical_uuid() {
        let id = Uuid::new_v4();
        let parsed = parse_id(&id.to_string(), "Project not found").expect("Should parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_id_maps_garbage_to_not_found() {
        let err = parse_id("not-a-uuid", "Project not found").unwrap_err();
        match err {
            ApiError::NotFound(message) => assert_eq!(message, "Project not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
