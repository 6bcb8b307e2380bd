/// Project model and database operations
///
/// Projects group tasks. Deleting a project removes its tasks and their
/// comments through `ON DELETE CASCADE`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     creator_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Project grouping a set of tasks
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Admin who created the project
    pub creator_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
}

/// Validated partial update for a project
///
/// Only `Some` fields are written. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Applies the changes to an in-memory project
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
    }
}

const PROJECT_COLUMNS: &str = "id, title, description, creator_id, created_at, updated_at";

impl Project {
    /// Inserts a new project
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation on `projects_creator_id_fkey` if the
    /// creator does not exist.
    pub async fn create(pool: &PgPool, data: NewProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, description, creator_id) \
             VALUES ($1, $2, $3) \
             RETURNING {PROJECT_COLUMNS}"
        );

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.creator_id)
            .fetch_one(pool)
            .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Lists projects in creation order
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             ORDER BY created_at ASC, id ASC \
             LIMIT $1 OFFSET $2"
        );

        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(projects)
    }

    /// Applies a partial update in a single statement
    ///
    /// Returns `None` if the project doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: &ProjectChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE projects SET updated_at = NOW()");

        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description.clone());
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ").push(PROJECT_COLUMNS);

        let project = builder
            .build_query_as::<Project>()
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    /// Deletes a project and, via cascade, its tasks and their comments
    ///
    /// Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            title: "Website Redesign".to_string(),
            description: Some("Modern UI".to_string()),
            creator_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_project_changes_default_is_empty() {
        assert!(ProjectChanges::default().is_empty());
    }

    #[test]
    fn test_apply_title_only_keeps_description() {
        let mut project = sample_project();
        let changes = ProjectChanges {
            title: Some("Mobile App".to_string()),
            ..Default::default()
        };

        changes.apply_to(&mut project);

        assert_eq!(project.title, "Mobile App");
        assert_eq!(project.description.as_deref(), Some("Modern UI"));
    }

    #[test]
    fn test_apply_can_clear_description() {
        let mut project = sample_project();
        let changes = ProjectChanges {
            description: Some(None),
            ..Default::default()
        };

        changes.apply_to(&mut project);

        assert!(project.description.is_none());
        assert_eq!(project.title, "Website Redesign");
    }
}
