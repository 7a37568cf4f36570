//! Realtime task lifecycle events.
//!
//! After a task mutation commits, the API server publishes one event to
//! the parent project's room. Events are serialized once into a text
//! frame and fanned out verbatim to every connection joined to the room,
//! including the actor's own.
//!
//! Frame shape on the wire:
//!
//! ```text
//! {"event":"task:created","payload":{...task...}}
//! {"event":"task:deleted","payload":{"id":"...","project_id":"..."}}
//! ```
//!
//! `task:completed` fires on every state toggle regardless of direction;
//! the name is historical, the meaning is "state changed".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::task::Task;

/// Error type for event serialization
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Failed to serialize an event or its payload
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Kind of task lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEventKind {
    /// A task was created
    #[serde(rename = "task:created")]
    Created,

    /// A task's fields were edited
    #[serde(rename = "task:updated")]
    Updated,

    /// A task was deleted
    #[serde(rename = "task:deleted")]
    Deleted,

    /// A task's state was toggled (in either direction)
    #[serde(rename = "task:completed")]
    Completed,
}

impl TaskEventKind {
    /// Gets the wire name of the event kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskEventKind::Created => "task:created",
            TaskEventKind::Updated => "task:updated",
            TaskEventKind::Deleted => "task:deleted",
            TaskEventKind::Completed => "task:completed",
        }
    }
}

/// A task lifecycle event bound for a project room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Event kind
    #[serde(rename = "event")]
    pub kind: TaskEventKind,

    /// Event payload: the affected task, or `{id, project_id}` for deletes
    pub payload: Value,
}

impl TaskEvent {
    /// Builds an event carrying the full task as payload.
    ///
    /// Used for `Created`, `Updated` and `Completed`; the receiving client
    /// replaces its local copy wholesale.
    pub fn for_task(kind: TaskEventKind, task: &Task) -> Result<Self, EventError> {
        Ok(Self {
            kind,
            payload: serde_json::to_value(task)?,
        })
    }

    /// Builds a deletion event.
    ///
    /// Deleted tasks no longer have a row to serialize, so the payload
    /// carries just the identities a client needs to drop its copy.
    pub fn for_deleted_task(task_id: Uuid, project_id: Uuid) -> Self {
        Self {
            kind: TaskEventKind::Deleted,
            payload: serde_json::json!({
                "id": task_id,
                "project_id": project_id,
            }),
        }
    }

    /// Serializes the event into the text frame broadcast to the room
    pub fn frame(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;
    use chrono::Utc;

    fn sample_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "Design".to_string(),
            description: "".to_string(),
            priority: TaskPriority::Medium,
            deadline: Utc::now(),
            state: true,
            project_id: Uuid::new_v4(),
            complete_by: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_kind_wire_names() {
        assert_eq!(TaskEventKind::Created.as_str(), "task:created");
        assert_eq!(TaskEventKind::Updated.as_str(), "task:updated");
        assert_eq!(TaskEventKind::Deleted.as_str(), "task:deleted");
        assert_eq!(TaskEventKind::Completed.as_str(), "task:completed");
    }

    #[test]
    fn test_task_event_frame_shape() {
        let task = sample_task();
        let event = TaskEvent::for_task(TaskEventKind::Completed, &task).unwrap();
        let frame = event.frame().unwrap();

        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["event"], "task:completed");
        assert_eq!(parsed["payload"]["id"], task.id.to_string());
        assert_eq!(parsed["payload"]["state"], true);
    }

    #[test]
    fn test_deleted_event_carries_both_identities() {
        let task_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();

        let event = TaskEvent::for_deleted_task(task_id, project_id);
        let frame = event.frame().unwrap();

        let parsed: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["event"], "task:deleted");
        assert_eq!(parsed["payload"]["id"], task_id.to_string());
        assert_eq!(parsed["payload"]["project_id"], project_id.to_string());
    }

    #[test]
    fn test_frame_roundtrip() {
        let task = sample_task();
        let event = TaskEvent::for_task(TaskEventKind::Created, &task).unwrap();

        let frame = event.frame().unwrap();
        let back: TaskEvent = serde_json::from_str(&frame).unwrap();

        assert_eq!(back.kind, TaskEventKind::Created);
        assert_eq!(back.payload["name"], "Design");
    }
}
