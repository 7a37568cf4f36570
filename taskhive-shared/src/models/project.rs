//! Project model and collaboration store.
//!
//! A project is owned by exactly one creator and carries its collaborator
//! set and task index inline as UUID arrays, so both live in the same row
//! as the fields they guard:
//!
//! - `collaborator_ids`: users invited by the creator. The creator never
//!   appears here.
//! - `task_ids`: ordered index of the project's tasks, kept in lockstep
//!   with the `tasks` table by running both writes in one transaction.
//!
//! Membership mutations are single conditional UPDATE statements
//! (`array_append` guarded by containment, `array_remove`), so two racing
//! requests cannot produce a duplicate entry or a lost update.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     client TEXT NOT NULL DEFAULT '',
//!     deadline TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     creator_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
//!     collaborator_ids UUID[] NOT NULL DEFAULT '{}',
//!     task_ids UUID[] NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::task::Task;
use super::user::UserProfile;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Client the project is for
    pub client: String,

    /// Project deadline
    pub deadline: DateTime<Utc>,

    /// Owning user, fixed at creation
    pub creator_id: Uuid,

    /// Invited collaborators (never contains `creator_id`)
    pub collaborator_ids: Vec<Uuid>,

    /// Ordered index of the project's tasks
    pub task_ids: Vec<Uuid>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Project listing entry: everything except the task index
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    /// Project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Client the project is for
    pub client: String,

    /// Project deadline
    pub deadline: DateTime<Utc>,

    /// Owning user
    pub creator_id: Uuid,

    /// Invited collaborators
    pub collaborator_ids: Vec<Uuid>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Project with its tasks and collaborator profiles populated
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    /// The project row
    #[serde(flatten)]
    pub project: Project,

    /// Tasks belonging to the project, oldest first
    pub tasks: Vec<Task>,

    /// Profiles of the invited collaborators, in invitation order
    pub collaborators: Vec<UserProfile>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Client the project is for
    pub client: String,

    /// Deadline; defaults to now when omitted
    pub deadline: Option<DateTime<Utc>>,
}

/// Input for a partial project update
///
/// Absent fields keep their previous value. An empty string is a real
/// value and overwrites; only `None` means "no change".
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New client
    pub client: Option<String>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates a project owned by `creator_id`.
    ///
    /// The creator comes from the authenticated session, never from client
    /// input, and starts with empty collaborator and task sets.
    pub async fn create(
        pool: &PgPool,
        creator_id: Uuid,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, client, deadline, creator_id)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
            RETURNING id, name, description, client, deadline, creator_id,
                      collaborator_ids, task_ids, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.client)
        .bind(data.deadline)
        .bind(creator_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, client, deadline, creator_id,
                   collaborator_ids, task_ids, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects the user can see: created by them or shared with
    /// them. One query, no duplicates, newest first.
    pub async fn list_visible_to(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT id, name, description, client, deadline, creator_id,
                   collaborator_ids, created_at
            FROM projects
            WHERE creator_id = $1 OR collaborator_ids @> ARRAY[$1]
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update; absent fields are left untouched.
    ///
    /// # Returns
    ///
    /// The updated project, or None if it doesn't exist
    pub async fn update_fields(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                client = COALESCE($4, client),
                deadline = COALESCE($5, deadline),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, client, deadline, creator_id,
                      collaborator_ids, task_ids, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.client)
        .bind(data.deadline)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes the project and every task under it.
    ///
    /// Both deletes run in one transaction; a project can never disappear
    /// while leaving orphaned tasks behind.
    ///
    /// # Returns
    ///
    /// True if the project existed and was deleted
    pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds a collaborator if not already present.
    ///
    /// The containment guard makes the append atomic: two racing invites
    /// for the same user leave exactly one entry, and the loser observes
    /// `false`.
    ///
    /// # Returns
    ///
    /// True if the user was added, false if they were already a member
    /// (or the project vanished)
    pub async fn add_collaborator(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET collaborator_ids = array_append(collaborator_ids, $2),
                updated_at = NOW()
            WHERE id = $1 AND NOT (collaborator_ids @> ARRAY[$2])
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a collaborator. Removing a non-member is a no-op, not an
    /// error.
    pub async fn remove_collaborator(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE projects
            SET collaborator_ids = array_remove(collaborator_ids, $2),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Whether `user_id` created this project
    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }

    /// Whether `user_id` is an invited collaborator
    pub fn is_collaborator(&self, user_id: Uuid) -> bool {
        self.collaborator_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project(creator: Uuid) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Website".to_string(),
            description: "".to_string(),
            client: "Acme".to_string(),
            deadline: Utc::now(),
            creator_id: creator,
            collaborator_ids: vec![],
            task_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_creator() {
        let creator = Uuid::new_v4();
        let project = sample_project(creator);

        assert!(project.is_creator(creator));
        assert!(!project.is_creator(Uuid::new_v4()));
    }

    #[test]
    fn test_is_collaborator() {
        let collaborator = Uuid::new_v4();
        let mut project = sample_project(Uuid::new_v4());
        project.collaborator_ids.push(collaborator);

        assert!(project.is_collaborator(collaborator));
        assert!(!project.is_collaborator(Uuid::new_v4()));
        // The creator is not implicitly a collaborator
        assert!(!project.is_collaborator(project.creator_id));
    }

    #[test]
    fn test_update_project_default_changes_nothing() {
        let update = UpdateProject::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
        assert!(update.client.is_none());
        assert!(update.deadline.is_none());
    }

    #[test]
    fn test_summary_omits_task_index() {
        let summary = ProjectSummary {
            id: Uuid::new_v4(),
            name: "Website".to_string(),
            description: "".to_string(),
            client: "Acme".to_string(),
            deadline: Utc::now(),
            creator_id: Uuid::new_v4(),
            collaborator_ids: vec![],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&summary).expect("Should serialize");
        assert!(json.get("task_ids").is_none());
        assert_eq!(json["name"], "Website");
    }

    // Integration tests for database operations are in tests/ of the API crate
}
