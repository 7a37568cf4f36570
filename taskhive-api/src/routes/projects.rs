//! Project endpoints.
//!
//! All routes here sit behind the JWT layer; the actor comes out of the
//! request extensions, never the body. Resource lookup happens before
//! authorization, so an id that does not exist answers 404 even to a
//! caller who would not have been allowed to see it.
//!
//! # Endpoints
//!
//! - `POST   /api/projects` - Create a project
//! - `GET    /api/projects` - List projects visible to the actor
//! - `GET    /api/projects/:id` - Project detail with tasks and collaborators
//! - `PUT    /api/projects/:id` - Partial update of project fields
//! - `DELETE /api/projects/:id` - Delete a project and its tasks
//! - `POST   /api/projects/:id/collaborators` - Invite a collaborator by email
//! - `DELETE /api/projects/:id/collaborators` - Remove a collaborator by id
//! - `POST   /api/projects/collaborators/search` - Look up a user by email

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{parse_id, MessageResponse},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskhive_shared::{
    auth::{
        authorization::{authorize, Action},
        middleware::AuthContext,
    },
    models::{
        project::{CreateProject, Project, ProjectDetail, ProjectSummary, UpdateProject},
        task::Task,
        user::{User, UserProfile},
    },
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Create-project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Free-form description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Client the project is for
    #[validate(length(min = 1, max = 200, message = "Client must be 1-200 characters"))]
    pub client: String,

    /// Deadline; defaults to now when omitted
    pub deadline: Option<DateTime<Utc>>,
}

/// Update-project request
///
/// Absent fields keep their previous value; an empty string is a real
/// value and overwrites.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New client
    pub client: Option<String>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Invite-collaborator request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCollaboratorRequest {
    /// Email of the user to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Remove-collaborator request
#[derive(Debug, Deserialize)]
pub struct RemoveCollaboratorRequest {
    /// Id of the collaborator to remove
    pub user: Uuid,
}

/// Collaborator search request
#[derive(Debug, Deserialize, Validate)]
pub struct SearchCollaboratorRequest {
    /// Email to look up
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Create a project
///
/// The actor becomes the creator; the collaborator and task sets start
/// empty.
///
/// # Endpoint
///
/// ```text
/// POST /api/projects
/// Content-Type: application/json
///
/// {
///   "name": "Website relaunch",
///   "description": "New marketing site",
///   "client": "ACME",
///   "deadline": "2026-03-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session token
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = Project::create(
        &state.db,
        auth.user_id,
        CreateProject {
            name: req.name,
            description: req.description,
            client: req.client,
            deadline: req.deadline,
        },
    )
    .await?;

    info!(project_id = %project.id, user_id = %auth.user_id, "Project created");

    Ok(Json(project))
}

/// List every project the actor can see
///
/// One entry per project the actor created or collaborates on, newest
/// first, without task lists.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let projects = Project::list_visible_to(&state.db, auth.user_id).await?;

    Ok(Json(projects))
}

/// Project detail: the project plus its tasks and collaborator profiles
///
/// # Errors
///
/// - `403 Forbidden`: Actor is neither creator nor collaborator
/// - `404 Not Found`: Unknown or malformed project id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectDetail>> {
    let project_id = parse_id(&id, "Project not found")?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    authorize(auth.user_id, &project, Action::View)?;

    let tasks = Task::list_for_project(&state.db, project_id).await?;
    let collaborators = User::profiles_by_ids(&state.db, &project.collaborator_ids).await?;

    Ok(Json(ProjectDetail {
        project,
        tasks,
        collaborators,
    }))
}

/// Partially update project fields
///
/// Creator only. Only fields present in the body change.
///
/// # Errors
///
/// - `403 Forbidden`: Actor is not the creator
/// - `404 Not Found`: Unknown or malformed project id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    let project_id = parse_id(&id, "Project not found")?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    authorize(auth.user_id, &project, Action::EditProjectFields)?;

    let updated = Project::update_fields(
        &state.db,
        project_id,
        UpdateProject {
            name: req.name,
            description: req.description,
            client: req.client,
            deadline: req.deadline,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    info!(project_id = %project_id, user_id = %auth.user_id, "Project updated");

    Ok(Json(updated))
}

/// Delete a project and everything under it
///
/// Creator only. The project's tasks go with it in the same transaction,
/// so no task can outlive its project.
///
/// # Errors
///
/// - `403 Forbidden`: Actor is not the creator
/// - `404 Not Found`: Unknown or malformed project id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let project_id = parse_id(&id, "Project not found")?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    authorize(auth.user_id, &project, Action::DeleteProject)?;

    let deleted = Project::delete_cascade(&state.db, project_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    info!(project_id = %project_id, user_id = %auth.user_id, "Project deleted");

    Ok(Json(MessageResponse::new("Project deleted")))
}

/// Invite a collaborator by email
///
/// Creator only. The three rejections are distinct: an unknown email is
/// 404, inviting the creator is 409, and inviting an existing
/// collaborator is 409.
///
/// # Errors
///
/// - `403 Forbidden`: Actor is not the creator
/// - `404 Not Found`: Project or target user not found
/// - `409 Conflict`: Target is the creator or already a collaborator
/// - `422 Unprocessable Entity`: Validation failed
pub async fn add_collaborator(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<AddCollaboratorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let project_id = parse_id(&id, "Project not found")?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    authorize(auth.user_id, &project, Action::ManageCollaborators)?;

    let target = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if target.id == project.creator_id {
        return Err(ApiError::Conflict(
            "The project creator cannot be added as a collaborator".to_string(),
        ));
    }

    if project.is_collaborator(target.id) {
        return Err(ApiError::Conflict(
            "User is already a collaborator".to_string(),
        ));
    }

    // The guarded append loses to a concurrent identical invite
    let added = Project::add_collaborator(&state.db, project_id, target.id).await?;
    if !added {
        return Err(ApiError::Conflict(
            "User is already a collaborator".to_string(),
        ));
    }

    info!(
        project_id = %project_id,
        user_id = %auth.user_id,
        collaborator_id = %target.id,
        "Collaborator added"
    );

    Ok(Json(MessageResponse::new("Collaborator added")))
}

/// Remove a collaborator
///
/// Creator only. Removing a user who is not a collaborator is a no-op
/// and still succeeds.
///
/// # Errors
///
/// - `403 Forbidden`: Actor is not the creator
/// - `404 Not Found`: Unknown or malformed project id
pub async fn remove_collaborator(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<RemoveCollaboratorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let project_id = parse_id(&id, "Project not found")?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    authorize(auth.user_id, &project, Action::ManageCollaborators)?;

    Project::remove_collaborator(&state.db, project_id, req.user).await?;

    info!(
        project_id = %project_id,
        user_id = %auth.user_id,
        collaborator_id = %req.user,
        "Collaborator removed"
    );

    Ok(Json(MessageResponse::new("Collaborator removed")))
}

/// Look up a user profile by email
///
/// Backs the invite form: the frontend searches first, then confirms the
/// invitation.
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
/// - `422 Unprocessable Entity`: Validation failed
pub async fn search_collaborator(
    State(state): State<AppState>,
    Json(req): Json<SearchCollaboratorRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.profile()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_validation() {
        let valid = CreateProjectRequest {
            name: "Website relaunch".to_string(),
            description: "New marketing site".to_string(),
            client: "ACME".to_string(),
            deadline: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateProjectRequest {
            name: "".to_string(),
            description: "New marketing site".to_string(),
            client: "ACME".to_string(),
            deadline: None,
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_request_distinguishes_absent_from_empty() {
        let absent: UpdateProjectRequest = serde_json::from_str("{}").expect("Should parse");
        assert!(absent.name.is_none());

        let empty: UpdateProjectRequest =
            serde_json::from_str(r#"{"name":""}"#).expect("Should parse");
        assert_eq!(empty.name.as_deref(), Some(""));
    }
}
