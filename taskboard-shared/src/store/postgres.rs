/// PostgreSQL store backend
///
/// Thin adapter from [`Store`] onto the model-level queries. Constraint
/// violations are classified by [`StoreError::from`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::db::pool;
use crate::models::comment::{Comment, NewComment};
use crate::models::listing::{Pagination, TaskFilter, TaskSort};
use crate::models::project::{NewProject, Project, ProjectChanges};
use crate::models::task::{NewTask, Task, TaskChanges, TaskCountRow};
use crate::models::user::{NewUser, User};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self, page: Pagination) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool, page.limit, page.skip).await?)
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, project).await?)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self, page: Pagination) -> StoreResult<Vec<Project>> {
        Ok(Project::list(&self.pool, page.limit, page.skip).await?)
    }

    async fn update_project(
        &self,
        id: Uuid,
        changes: &ProjectChanges,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, changes).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, task).await?)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        page: Pagination,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::list(&self.pool, filter, sort, page).await?)
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<TaskCountRow>> {
        Ok(Task::count_grouped(&self.pool, filter).await?)
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: &TaskChanges,
        expected_assignee: Option<Uuid>,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, changes, expected_assignee).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        Ok(Comment::create(&self.pool, comment).await?)
    }

    async fn list_comments(&self, task_id: Uuid, page: Pagination) -> StoreResult<Vec<Comment>> {
        Ok(Comment::list_by_task(&self.pool, task_id, page.limit, page.skip).await?)
    }
}
