/// Task comments
///
/// Comments are append-only. The author is always the caller; clients cannot
/// post on someone else's behalf.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{require_text, ServiceError, ServiceResult};
use crate::auth::policy::{authorize, Action, Caller, Target};
use crate::models::comment::{Comment, NewComment};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentInput {
    pub task_id: Uuid,
    pub content: String,
}

/// Posts a comment on a task the caller may comment on
pub async fn create_comment(
    store: &dyn Store,
    caller: &Caller,
    input: CreateCommentInput,
) -> ServiceResult<Comment> {
    let task = store
        .find_task(input.task_id)
        .await?
        .ok_or(ServiceError::NotFound("task"))?;

    authorize(caller, &Action::CreateComment, &Target::from(&task))?;
    require_text("content", &input.content)?;

    let comment = store
        .insert_comment(NewComment {
            content: input.content,
            task_id: task.id,
            author_id: caller.id,
        })
        .await?;

    info!(comment_id = %comment.id, task_id = %task.id, author_id = %caller.id, "Comment added");
    Ok(comment)
}
