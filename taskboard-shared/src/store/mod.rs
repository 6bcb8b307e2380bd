/// Storage abstraction
///
/// Services talk to persistence only through the [`Store`] trait, so the
/// access-control and lifecycle logic runs unchanged against PostgreSQL
/// ([`PgStore`]) or the in-process [`MemoryStore`].
///
/// # Contract
///
/// Every backend must:
/// 1. Reject a second user with the same username or email (`Duplicate`)
/// 2. Reject rows referencing a missing user, project or task (`MissingReference`)
/// 3. Cascade project deletion to tasks and task deletion to comments
/// 4. Perform each mutation atomically
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_shared::store::{MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::comment::{Comment, NewComment};
use crate::models::listing::{Pagination, TaskFilter, TaskSort};
use crate::models::project::{NewProject, Project, ProjectChanges};
use crate::models::task::{NewTask, Task, TaskChanges, TaskCountRow};
use crate::models::user::{NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (field name attached)
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// A foreign key points at a row that doesn't exist
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let constraint = match &err {
            sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_owned),
            _ => None,
        };

        match constraint.as_deref() {
            Some("users_username_key") => StoreError::Duplicate("username"),
            Some("users_email_key") => StoreError::Duplicate("email"),
            Some("projects_creator_id_fkey")
            | Some("tasks_assignee_id_fkey")
            | Some("comments_author_id_fkey") => StoreError::MissingReference("user"),
            Some("tasks_project_id_fkey") => StoreError::MissingReference("project"),
            Some("comments_task_id_fkey") => StoreError::MissingReference("task"),
            _ => StoreError::Database(err),
        }
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations over users, projects, tasks and comments
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Lists users oldest first
    async fn list_users(&self, page: Pagination) -> StoreResult<Vec<User>>;

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Lists projects oldest first
    async fn list_projects(&self, page: Pagination) -> StoreResult<Vec<Project>>;

    /// Applies `changes` and stamps `updated_at`; `None` if the project is gone
    async fn update_project(
        &self,
        id: Uuid,
        changes: &ProjectChanges,
    ) -> StoreResult<Option<Project>>;

    /// Deletes the project with its tasks and their comments
    async fn delete_project(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_task(&self, task: NewTask) -> StoreResult<Task>;
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        page: Pagination,
    ) -> StoreResult<Vec<Task>>;

    /// Task counts grouped by status, priority and overdue flag
    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<TaskCountRow>>;

    /// Applies `changes` and stamps `updated_at`
    ///
    /// With `expected_assignee` set, the write only happens if the task is
    /// still assigned to that user. `None` means no row matched.
    async fn update_task(
        &self,
        id: Uuid,
        changes: &TaskChanges,
        expected_assignee: Option<Uuid>,
    ) -> StoreResult<Option<Task>>;

    /// Deletes the task with its comments
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;

    /// Lists a task's comments oldest first
    async fn list_comments(&self, task_id: Uuid, page: Pagination) -> StoreResult<Vec<Comment>>;
}
