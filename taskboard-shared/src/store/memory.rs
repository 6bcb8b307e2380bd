/// In-memory store backend
///
/// Keeps every table in a `Vec` behind a single `tokio::sync::RwLock`, so each
/// mutation (including its uniqueness and reference checks) happens under one
/// write lock. Enforces the same constraints as the PostgreSQL schema:
/// unique username/email, existing references, cascading deletes.
///
/// Used for tests and for running the API without a database
/// (`database.url = "memory://"`). Nothing is persisted.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::comment::{Comment, NewComment};
use crate::models::listing::{Pagination, TaskFilter, TaskSort};
use crate::models::project::{NewProject, Project, ProjectChanges};
use crate::models::task::{NewTask, Task, TaskChanges, TaskCountRow};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn project_exists(&self, id: Uuid) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    fn task_exists(&self, id: Uuid) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a user's active flag; accounts are never deactivated through the store trait
    #[cfg(test)]
    pub(crate) async fn set_user_active(&self, id: Uuid, active: bool) {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, page: Pagination) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.users.iter().cloned()))
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;

        if !tables.user_exists(project.creator_id) {
            return Err(StoreError::MissingReference("user"));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            creator_id: project.creator_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());

        Ok(project)
    }

    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, page: Pagination) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.projects.iter().cloned()))
    }

    async fn update_project(
        &self,
        id: Uuid,
        changes: &ProjectChanges,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;

        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        changes.apply_to(project);
        project.updated_at = Utc::now();

        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        if tables.projects.len() == before {
            return Ok(false);
        }

        let orphaned: Vec<Uuid> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == id)
            .map(|t| t.id)
            .collect();
        tables.tasks.retain(|t| t.project_id != id);
        tables.comments.retain(|c| !orphaned.contains(&c.task_id));

        Ok(true)
    }

    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        if !tables.project_exists(task.project_id) {
            return Err(StoreError::MissingReference("project"));
        }
        if !tables.user_exists(task.assignee_id) {
            return Err(StoreError::MissingReference("user"));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            priority: task.priority,
            status: task.status,
            project_id: task.project_id,
            assignee_id: task.assignee_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        sort: TaskSort,
        page: Pagination,
    ) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;

        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| sort.compare(a, b));

        Ok(page.slice(tasks))
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<TaskCountRow>> {
        let tables = self.tables.read().await;
        let now = Utc::now();

        let mut groups = BTreeMap::new();
        for task in tables.tasks.iter().filter(|t| filter.matches(t)) {
            *groups
                .entry((task.status, task.priority, task.is_overdue(now)))
                .or_insert(0i64) += 1;
        }

        Ok(groups
            .into_iter()
            .map(|((status, priority, overdue), count)| TaskCountRow {
                status,
                priority,
                overdue,
                count,
            })
            .collect())
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: &TaskChanges,
        expected_assignee: Option<Uuid>,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        if let Some(assignee_id) = changes.assignee_id {
            if !tables.user_exists(assignee_id) {
                return Err(StoreError::MissingReference("user"));
            }
        }
        if let Some(project_id) = changes.project_id {
            if !tables.project_exists(project_id) {
                return Err(StoreError::MissingReference("project"));
            }
        }

        let Some(task) = tables.tasks.iter_mut().find(|t| {
            t.id == id && expected_assignee.map_or(true, |expected| t.assignee_id == expected)
        }) else {
            return Ok(None);
        };

        changes.apply_to(task);
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        if tables.tasks.len() == before {
            return Ok(false);
        }

        tables.comments.retain(|c| c.task_id != id);
        Ok(true)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;

        if !tables.task_exists(comment.task_id) {
            return Err(StoreError::MissingReference("task"));
        }
        if !tables.user_exists(comment.author_id) {
            return Err(StoreError::MissingReference("user"));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            content: comment.content,
            task_id: comment.task_id,
            author_id: comment.author_id,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn list_comments(&self, task_id: Uuid, page: Pagination) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(page.slice(tables.comments.iter().filter(|c| c.task_id == task_id).cloned()))
    }
}
