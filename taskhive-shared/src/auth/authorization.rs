//! Access control evaluation for projects and their tasks.
//!
//! Every permission in the system derives from a user's relationship to a
//! project. There are no stored roles:
//!
//! 1. **Creator**: the user who created the project. May edit and delete
//!    the project, manage its collaborators, and create/edit/delete tasks.
//! 2. **Collaborator**: invited by the creator. May view the project and
//!    toggle task completion, nothing else.
//! 3. Everyone else is denied.
//!
//! Handlers fetch the resource first (absent resources are `NotFound`,
//! reported before any permission check), then consult [`authorize`] and
//! return immediately on a denial so no partial mutation can follow one.
//!
//! # Example
//!
//! ```no_run
//! use taskhive_shared::auth::authorization::{authorize, Action};
//! use taskhive_shared::models::project::Project;
//! use uuid::Uuid;
//!
//! # fn example(project: Project, actor: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! // Only the creator may delete a project
//! authorize(actor, &project, Action::DeleteProject)?;
//! # Ok(())
//! # }
//! ```

use uuid::Uuid;

use crate::models::project::Project;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Actor lacks permission for the attempted action
    #[error("Not authorized to perform this action")]
    NotAuthorized,
}

/// Actions gated by the evaluator.
///
/// Task actions are authorized against the task's parent project; tasks
/// carry no permissions of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read a project or one of its tasks
    View,

    /// Change project name/description/deadline/client
    EditProjectFields,

    /// Delete the project and its tasks
    DeleteProject,

    /// Add or remove collaborators
    ManageCollaborators,

    /// Create a task under the project
    CreateTask,

    /// Change task name/description/deadline/priority
    EditTaskFields,

    /// Delete a task
    DeleteTask,

    /// Flip a task between pending and complete
    ToggleTaskState,
}

impl Action {
    /// Whether collaborators are allowed this action, or only the creator.
    pub fn allows_collaborators(&self) -> bool {
        matches!(self, Action::View | Action::ToggleTaskState)
    }

    /// Gets the action name as a string, for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::EditProjectFields => "edit_project_fields",
            Action::DeleteProject => "delete_project",
            Action::ManageCollaborators => "manage_collaborators",
            Action::CreateTask => "create_task",
            Action::EditTaskFields => "edit_task_fields",
            Action::DeleteTask => "delete_task",
            Action::ToggleTaskState => "toggle_task_state",
        }
    }
}

/// Decides whether `actor` may perform `action` on `project`.
///
/// The project must already have been fetched; existence is not this
/// function's concern. Pure and synchronous so callers cannot observe a
/// partially applied decision.
///
/// # Returns
///
/// `Ok(())` when allowed, `AuthzError::NotAuthorized` otherwise
pub fn authorize(actor: Uuid, project: &Project, action: Action) -> Result<(), AuthzError> {
    if project.is_creator(actor) {
        return Ok(());
    }

    if action.allows_collaborators() && project.is_collaborator(actor) {
        return Ok(());
    }

    Err(AuthzError::NotAuthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project_with(creator: Uuid, collaborators: Vec<Uuid>) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Website".to_string(),
            description: "Marketing site".to_string(),
            client: "Acme".to_string(),
            deadline: Utc::now(),
            creator_id: creator,
            collaborator_ids: collaborators,
            task_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    const ALL_ACTIONS: [Action; 8] = [
        Action::View,
        Action::EditProjectFields,
        Action::DeleteProject,
        Action::ManageCollaborators,
        Action::CreateTask,
        Action::EditTaskFields,
        Action::DeleteTask,
        Action::ToggleTaskState,
    ];

    #[test]
    fn test_creator_is_allowed_everything() {
        let creator = Uuid::new_v4();
        let project = project_with(creator, vec![]);

        for action in ALL_ACTIONS {
            assert!(
                authorize(creator, &project, action).is_ok(),
                "creator should be allowed {:?}",
                action
            );
        }
    }

    #[test]
    fn test_collaborator_can_view_and_toggle_only() {
        let collaborator = Uuid::new_v4();
        let project = project_with(Uuid::new_v4(), vec![collaborator]);

        assert!(authorize(collaborator, &project, Action::View).is_ok());
        assert!(authorize(collaborator, &project, Action::ToggleTaskState).is_ok());

        for action in ALL_ACTIONS {
            if action.allows_collaborators() {
                continue;
            }
            assert!(
                authorize(collaborator, &project, action).is_err(),
                "collaborator should be denied {:?}",
                action
            );
        }
    }

    #[test]
    fn test_stranger_is_denied_everything() {
        let stranger = Uuid::new_v4();
        let project = project_with(Uuid::new_v4(), vec![Uuid::new_v4()]);

        for action in ALL_ACTIONS {
            assert!(
                authorize(stranger, &project, action).is_err(),
                "stranger should be denied {:?}",
                action
            );
        }
    }

    #[test]
    fn test_action_as_str() {
        assert_eq!(Action::View.as_str(), "view");
        assert_eq!(Action::ToggleTaskState.as_str(), "toggle_task_state");
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotAuthorized;
        assert!(err.to_string().contains("Not authorized"));
    }
}
