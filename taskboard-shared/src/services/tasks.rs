/// Task lifecycle
///
/// Create, read, partial update, delete and the dashboard summary. Every
/// operation asks the policy first; validation and writes only happen once the
/// caller is allowed.
///
/// # Partial updates
///
/// [`UpdateTaskInput`] distinguishes an absent field from an explicit `null`.
/// Absent fields are left untouched. `null` clears `description` or
/// `deadline` and is rejected for every other field. Keys that name no
/// writable field are kept so the policy sees them; admins get
/// `InvalidValue` for them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::query::scope_for;
use super::{require_text_within, ServiceError, ServiceResult, TITLE_MAX_CHARS};
use crate::auth::policy::{authorize, can, Action, Caller, Decision, Denial, FieldSet, Target, TaskField};
use crate::models::deserialize_present;
use crate::models::task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
use crate::store::Store;

/// Input for [`create_task`]
///
/// `status` and `priority` arrive as raw strings so out-of-range values
/// surface as `InvalidValue` rather than a decoding failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub project_id: Uuid,
    pub assignee_id: Uuid,
}

/// Input for [`update_task`]; `None` = absent, `Some(None)` = explicit null
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub priority: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub assignee_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub project_id: Option<Option<Uuid>>,

    /// Every other key in the request body
    #[serde(flatten)]
    pub unrecognized: BTreeMap<String, IgnoredAny>,
}

impl UpdateTaskInput {
    /// Status-only update
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(Some(status.into())),
            ..Default::default()
        }
    }

    /// Fields present in the request, null or not
    pub fn fields(&self) -> FieldSet {
        [
            (self.title.is_some(), TaskField::Title),
            (self.description.is_some(), TaskField::Description),
            (self.deadline.is_some(), TaskField::Deadline),
            (self.priority.is_some(), TaskField::Priority),
            (self.status.is_some(), TaskField::Status),
            (self.assignee_id.is_some(), TaskField::AssigneeId),
            (self.project_id.is_some(), TaskField::ProjectId),
        ]
        .into_iter()
        .filter_map(|(present, field)| present.then_some(field))
        .chain(self.unrecognized.keys().cloned().map(TaskField::Other))
        .collect()
    }

    /// Validates every present field; nothing is applied on failure
    pub fn into_changes(self) -> ServiceResult<TaskChanges> {
        if let Some(key) = self.unrecognized.keys().next() {
            return Err(ServiceError::invalid(key.as_str(), "unknown field"));
        }

        let title = match self.title {
            None => None,
            Some(None) => return Err(ServiceError::invalid("title", "must not be null")),
            Some(Some(title)) => {
                require_text_within("title", &title, TITLE_MAX_CHARS)?;
                Some(title)
            }
        };

        Ok(TaskChanges {
            title,
            description: self.description,
            deadline: self.deadline,
            priority: required("priority", self.priority)?
                .map(|raw| raw.parse::<TaskPriority>())
                .transpose()?,
            status: required("status", self.status)?
                .map(|raw| raw.parse::<TaskStatus>())
                .transpose()?,
            assignee_id: required("assignee_id", self.assignee_id)?,
            project_id: required("project_id", self.project_id)?,
        })
    }
}

/// Rejects an explicit null for a non-nullable field
fn required<T>(field: &str, value: Option<Option<T>>) -> ServiceResult<Option<T>> {
    match value {
        Some(None) => Err(ServiceError::invalid(field, "must not be null")),
        Some(Some(v)) => Ok(Some(v)),
        None => Ok(None),
    }
}

/// Creates a task (admin only)
pub async fn create_task(
    store: &dyn Store,
    caller: &Caller,
    input: CreateTaskInput,
) -> ServiceResult<Task> {
    authorize(caller, &Action::CreateTask, &Target::Collection)?;

    require_text_within("title", &input.title, TITLE_MAX_CHARS)?;
    let priority = input
        .priority
        .as_deref()
        .map(str::parse::<TaskPriority>)
        .transpose()?
        .unwrap_or_default();
    let status = input
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?
        .unwrap_or_default();

    if store.find_project(input.project_id).await?.is_none() {
        return Err(ServiceError::NotFound("project"));
    }
    if store.find_user(input.assignee_id).await?.is_none() {
        return Err(ServiceError::NotFound("user"));
    }

    let task = store
        .insert_task(NewTask {
            title: input.title,
            description: input.description,
            deadline: input.deadline,
            priority,
            status,
            project_id: input.project_id,
            assignee_id: input.assignee_id,
        })
        .await?;

    info!(
        task_id = %task.id,
        project_id = %task.project_id,
        assignee_id = %task.assignee_id,
        created_by = %caller.id,
        "Task created"
    );
    Ok(task)
}

/// Fetches a task the caller may read
pub async fn get_task(store: &dyn Store, caller: &Caller, task_id: Uuid) -> ServiceResult<Task> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or(ServiceError::NotFound("task"))?;

    authorize(caller, &Action::ReadTask, &Target::from(&task))?;

    debug!(task_id = %task.id, caller = %caller.id, "Task read");
    Ok(task)
}

/// Applies a partial update
///
/// Non-admins may only send `status`, and only for their own tasks; any
/// other field rejects the whole request. For non-admins the write is
/// conditional on the task still being assigned to them.
pub async fn update_task(
    store: &dyn Store,
    caller: &Caller,
    task_id: Uuid,
    input: UpdateTaskInput,
) -> ServiceResult<Task> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or(ServiceError::NotFound("task"))?;

    let fields = input.fields();
    if let Decision::Deny(denial) = can(caller, &Action::UpdateTask(fields), &Target::from(&task)) {
        warn!(task_id = %task.id, caller = %caller.id, reason = %denial, "Task update denied");
        return Err(denial.into());
    }

    let changes = input.into_changes()?;

    if let Some(assignee_id) = changes.assignee_id {
        if store.find_user(assignee_id).await?.is_none() {
            return Err(ServiceError::NotFound("user"));
        }
    }
    if let Some(project_id) = changes.project_id {
        if store.find_project(project_id).await?.is_none() {
            return Err(ServiceError::NotFound("project"));
        }
    }

    if changes.is_empty() {
        return Ok(task);
    }

    let expected_assignee = (!caller.is_admin()).then_some(caller.id);

    match store.update_task(task_id, &changes, expected_assignee).await? {
        Some(updated) => {
            info!(task_id = %updated.id, caller = %caller.id, status = %updated.status, "Task updated");
            Ok(updated)
        }
        None if store.find_task(task_id).await?.is_none() => Err(ServiceError::NotFound("task")),
        None => Err(Denial::NotAssignee.into()),
    }
}

/// Deletes a task and its comments (admin only)
pub async fn delete_task(store: &dyn Store, caller: &Caller, task_id: Uuid) -> ServiceResult<()> {
    authorize(caller, &Action::DeleteTask, &Target::Collection)?;

    if !store.delete_task(task_id).await? {
        return Err(ServiceError::NotFound("task"));
    }

    info!(task_id = %task_id, caller = %caller.id, "Task deleted");
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

/// Dashboard analytics over the caller's visible tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSummary {
    pub total: i64,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,

    /// Past deadline and not completed
    pub overdue: i64,

    /// Completed share of `total`, as a percentage (0 when there are no tasks)
    pub completion_rate: f64,
}

/// Summarizes the tasks the caller can see, optionally within one project
pub async fn task_summary(
    store: &dyn Store,
    caller: &Caller,
    project_id: Option<Uuid>,
) -> ServiceResult<TaskSummary> {
    authorize(caller, &Action::ListTasks, &Target::Collection)?;

    let mut filter = scope_for(caller);
    filter.project_id = project_id;

    let mut summary = TaskSummary::default();
    for row in store.count_tasks(&filter).await? {
        summary.total += row.count;

        match row.status {
            TaskStatus::Pending => summary.by_status.pending += row.count,
            TaskStatus::InProgress => summary.by_status.in_progress += row.count,
            TaskStatus::Completed => summary.by_status.completed += row.count,
        }
        match row.priority {
            TaskPriority::Low => summary.by_priority.low += row.count,
            TaskPriority::Medium => summary.by_priority.medium += row.count,
            TaskPriority::High => summary.by_priority.high += row.count,
        }
        if row.overdue {
            summary.overdue += row.count;
        }
    }

    if summary.total > 0 {
        summary.completion_rate =
            summary.by_status.completed as f64 / summary.total as f64 * 100.0;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_tracks_presence_including_null() {
        let input: UpdateTaskInput =
            serde_json::from_str(r#"{"status": "completed", "description": null}"#).unwrap();

        let fields: Vec<_> = input.fields().into_iter().collect();
        assert_eq!(fields, vec![TaskField::Description, TaskField::Status]);
    }

    #[test]
    fn test_empty_update() {
        let input: UpdateTaskInput = serde_json::from_str("{}").unwrap();
        assert!(input.fields().is_empty());
        assert!(input.into_changes().unwrap().is_empty());
    }

    #[test]
    fn test_unrecognized_keys_reach_the_policy() {
        let input: UpdateTaskInput =
            serde_json::from_str(r#"{"status": "completed", "project_id": null, "owner": 1}"#)
                .unwrap();

        let fields: Vec<_> = input.fields().into_iter().collect();
        assert_eq!(
            fields,
            vec![
                TaskField::Status,
                TaskField::ProjectId,
                TaskField::Other("owner".to_string()),
            ]
        );
    }

    #[test]
    fn test_into_changes_rejects_unrecognized_keys() {
        let input: UpdateTaskInput =
            serde_json::from_str(r#"{"status": "completed", "owner": {"id": 1}}"#).unwrap();

        match input.into_changes() {
            Err(ServiceError::InvalidValue { field, .. }) => assert_eq!(field, "owner"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_into_changes_moves_project() {
        let project_id = Uuid::new_v4();
        let input: UpdateTaskInput =
            serde_json::from_str(&format!(r#"{{"project_id": "{project_id}"}}"#)).unwrap();
        assert_eq!(input.into_changes().unwrap().project_id, Some(project_id));

        let null_project: UpdateTaskInput =
            serde_json::from_str(r#"{"project_id": null}"#).unwrap();
        assert!(null_project.into_changes().is_err());
    }

    #[test]
    fn test_into_changes_parses_enums() {
        let changes = UpdateTaskInput::status("in_progress").into_changes().unwrap();
        assert_eq!(changes.status, Some(TaskStatus::InProgress));
        assert!(changes.title.is_none());
    }

    #[test]
    fn test_into_changes_rejects_bad_values() {
        assert!(matches!(
            UpdateTaskInput::status("done").into_changes(),
            Err(ServiceError::InvalidValue { .. })
        ));

        let null_title: UpdateTaskInput = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(null_title.into_changes().is_err());

        let blank_title: UpdateTaskInput = serde_json::from_str(r#"{"title": "  "}"#).unwrap();
        assert!(blank_title.into_changes().is_err());

        let null_priority: UpdateTaskInput =
            serde_json::from_str(r#"{"priority": null}"#).unwrap();
        assert!(null_priority.into_changes().is_err());
    }

    #[test]
    fn test_into_changes_clears_nullable_fields() {
        let input: UpdateTaskInput =
            serde_json::from_str(r#"{"description": null, "deadline": null}"#).unwrap();
        let changes = input.into_changes().unwrap();

        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.deadline, Some(None));
    }
}
