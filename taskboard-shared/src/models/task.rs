/// Task model and database operations
///
/// A task belongs to exactly one project and is assigned to exactly one user.
/// Status and priority are closed enumerations backed by PostgreSQL enums.
///
/// # Status
///
/// ```text
/// pending ⇄ in_progress ⇄ completed
/// ```
///
/// Any status may be set to any other; there is no forward-only ordering.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     deadline TIMESTAMPTZ,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'pending',
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assignee_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(project_id: Uuid, assignee_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, NewTask {
///     title: "Design mockups".to_string(),
///     description: None,
///     deadline: None,
///     priority: TaskPriority::High,
///     status: TaskStatus::Pending,
///     project_id,
///     assignee_id,
/// }).await?;
///
/// let changes = TaskChanges {
///     status: Some(TaskStatus::InProgress),
///     ..Default::default()
/// };
/// Task::update(&pool, task.id, &changes, Some(assignee_id)).await?;
/// # Ok(())
/// # }
/// ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::listing::{Pagination, TaskFilter, TaskSort};
use super::ParseEnumError;

/// Task progress
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

/// Task priority, ordered `Low < Medium < High`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(ParseEnumError::new("priority", other)),
        }
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    pub title: String,
    pub description: Option<String>,

    /// Due date; past deadlines are accepted
    pub deadline: Option<DateTime<Utc>>,

    pub priority: TaskPriority,
    pub status: TaskStatus,

    /// Owning project
    pub project_id: Uuid,

    /// User responsible for the task
    pub assignee_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// True when the deadline has passed and the task isn't completed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_completed() && self.deadline.map_or(false, |deadline| deadline < now)
    }
}

/// Input for creating a new task, with defaults already resolved
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub project_id: Uuid,
    pub assignee_id: Uuid,
}

/// Validated partial update for a task
///
/// Only `Some` fields are written. For nullable columns `Some(None)` clears
/// the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee_id.is_none()
            && self.project_id.is_none()
    }

    /// Applies the changes to an in-memory task
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
    }
}

/// One group of the task summary aggregation
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskCountRow {
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub overdue: bool,
    pub count: i64,
}

const TASK_COLUMNS: &str = "id, title, description, deadline, priority, status, \
                            project_id, assignee_id, created_at, updated_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    builder.push(" WHERE TRUE");

    if let Some(scope) = filter.scope_assignee {
        builder.push(" AND assignee_id = ").push_bind(scope);
    }
    if let Some(assignee_id) = filter.assignee_id {
        builder.push(" AND assignee_id = ").push_bind(assignee_id);
    }
    if let Some(project_id) = filter.project_id {
        builder.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ").push_bind(priority);
    }
}

impl Task {
    /// Inserts a new task
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation on `tasks_project_id_fkey` or
    /// `tasks_assignee_id_fkey` when a reference is dangling.
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, deadline, priority, status, project_id, assignee_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TASK_COLUMNS}"
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.deadline)
            .bind(data.priority)
            .bind(data.status)
            .bind(data.project_id)
            .bind(data.assignee_id)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists tasks matching `filter`, ordered by `sort`, windowed by `page`
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        sort: TaskSort,
        page: Pagination,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder.push(TASK_COLUMNS).push(" FROM tasks");

        push_filter(&mut builder, filter);

        builder.push(" ORDER BY ").push(sort.order_by_clause());
        builder.push(" LIMIT ").push_bind(page.limit);
        builder.push(" OFFSET ").push_bind(page.skip);

        let tasks = builder.build_query_as::<Task>().fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Counts tasks matching `filter`, grouped by status, priority and overdue flag
    pub async fn count_grouped(
        pool: &PgPool,
        filter: &TaskFilter,
    ) -> Result<Vec<TaskCountRow>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT status, priority, \
             COALESCE(deadline < NOW() AND status <> 'completed', FALSE) AS overdue, \
             COUNT(*) AS count \
             FROM tasks",
        );

        push_filter(&mut builder, filter);

        builder.push(" GROUP BY 1, 2, 3");

        let rows = builder
            .build_query_as::<TaskCountRow>()
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Applies a partial update in a single statement
    ///
    /// When `expected_assignee` is set the row is only written if the task is
    /// still assigned to that user. Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: &TaskChanges,
        expected_assignee: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(deadline) = changes.deadline {
            builder.push(", deadline = ").push_bind(deadline);
        }
        if let Some(priority) = changes.priority {
            builder.push(", priority = ").push_bind(priority);
        }
        if let Some(status) = changes.status {
            builder.push(", status = ").push_bind(status);
        }
        if let Some(assignee_id) = changes.assignee_id {
            builder.push(", assignee_id = ").push_bind(assignee_id);
        }
        if let Some(project_id) = changes.project_id {
            builder.push(", project_id = ").push_bind(project_id);
        }

        builder.push(" WHERE id = ").push_bind(id);
        if let Some(expected) = expected_assignee {
            builder.push(" AND assignee_id = ").push_bind(expected);
        }
        builder.push(" RETURNING ").push(TASK_COLUMNS);

        let task = builder
            .build_query_as::<Task>()
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Deletes a task and, via cascade, its comments
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
