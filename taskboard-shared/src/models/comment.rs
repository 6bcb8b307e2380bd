/// Comment model and database operations
///
/// Comments are append-only: there is no update or delete. They disappear
/// only when their task is deleted (`ON DELETE CASCADE`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Comment left on a task
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub task_id: Uuid,

    /// Always the authenticated caller who posted the comment
    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub task_id: Uuid,
    pub author_id: Uuid,
}

const COMMENT_COLUMNS: &str = "id, content, task_id, author_id, created_at";

impl Comment {
    /// Inserts a new comment
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation on `comments_task_id_fkey` if the
    /// task was deleted in the meantime.
    pub async fn create(pool: &PgPool, data: NewComment) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (content, task_id, author_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COMMENT_COLUMNS}"
        );

        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(data.content)
            .bind(data.task_id)
            .bind(data.author_id)
            .fetch_one(pool)
            .await?;

        Ok(comment)
    }

    /// Lists a task's comments, oldest first
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE task_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3"
        );

        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(task_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(comments)
    }
}
