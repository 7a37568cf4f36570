//! Task model and lifecycle operations.
//!
//! Tasks live under exactly one project. Creation and deletion touch two
//! places, the task row and the parent project's `task_ids` index, and
//! always run both writes in a single transaction so the index and the
//! rows can never diverge.
//!
//! A task's `state` is a plain boolean (false = pending, true =
//! complete). The only transition is a toggle in either direction;
//! `complete_by` records whoever last flipped the state, regardless of
//! which way it went.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     priority task_priority NOT NULL DEFAULT 'low',
//!     deadline TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     state BOOLEAN NOT NULL DEFAULT FALSE,
//!     project_id UUID NOT NULL REFERENCES projects (id),
//!     complete_by UUID REFERENCES users (id) ON DELETE SET NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority
    Low,

    /// Medium priority
    Medium,

    /// High priority
    High,
}

impl TaskPriority {
    /// Gets the priority as a string, for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Task name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Priority level
    pub priority: TaskPriority,

    /// Task deadline
    pub deadline: DateTime<Utc>,

    /// false = pending, true = complete
    pub state: bool,

    /// Parent project, fixed at creation
    pub project_id: Uuid,

    /// Who last toggled `state` (None until the first toggle)
    pub complete_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Task name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Priority level
    pub priority: TaskPriority,

    /// Deadline; defaults to now when omitted
    pub deadline: Option<DateTime<Utc>>,
}

/// Input for a partial task update
///
/// Absent fields keep their previous value; the parent project cannot be
/// changed.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a task and appends it to the parent project's index.
    ///
    /// Both writes run in one transaction. If the project disappears
    /// between the caller's authorization check and the index update, the
    /// transaction rolls back and `RowNotFound` is returned, so no task
    /// can exist without being indexed.
    pub async fn create(
        pool: &PgPool,
        project_id: Uuid,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, description, priority, deadline, project_id)
            VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
            RETURNING id, name, description, priority, deadline, state,
                      project_id, complete_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.deadline)
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await?;

        let indexed = sqlx::query(
            r#"
            UPDATE projects
            SET task_ids = array_append(task_ids, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .bind(task.id)
        .execute(&mut *tx)
        .await?;

        if indexed.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        tx.commit().await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, description, priority, deadline, state,
                   project_id, complete_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks, oldest first
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, name, description, priority, deadline, state,
                   project_id, complete_by, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update; absent fields are left untouched.
    ///
    /// # Returns
    ///
    /// The updated task, or None if it doesn't exist
    pub async fn update_fields(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                deadline = COALESCE($5, deadline),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, priority, deadline, state,
                      project_id, complete_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.deadline)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task and removes it from the parent project's index.
    ///
    /// Index removal comes first, then the row delete, all in one
    /// transaction.
    ///
    /// # Returns
    ///
    /// True if the task existed and was deleted
    pub async fn delete(pool: &PgPool, id: Uuid, project_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE projects
            SET task_ids = array_remove(task_ids, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(project_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips `state` and records the actor, in both directions.
    ///
    /// A single UPDATE, so two racing toggles serialize at the row: each
    /// one flips exactly once and the later writer's identity sticks.
    ///
    /// # Returns
    ///
    /// The toggled task, or None if it doesn't exist
    pub async fn toggle_state(
        pool: &PgPool,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET state = NOT state, complete_by = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, priority, deadline, state,
                      project_id, complete_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(actor_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(TaskPriority::Low).unwrap(),
            serde_json::json!("low")
        );
        assert_eq!(
            serde_json::to_value(TaskPriority::High).unwrap(),
            serde_json::json!("high")
        );
    }

    #[test]
    fn test_priority_deserializes_lowercase() {
        let p: TaskPriority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(p, TaskPriority::Medium);
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
    }

    #[test]
    fn test_update_task_default_changes_nothing() {
        let update = UpdateTask::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
        assert!(update.priority.is_none());
        assert!(update.deadline.is_none());
    }

    // Integration tests for database operations are in tests/ of the API crate
}
