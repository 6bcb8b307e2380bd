/// Comment endpoints
///
/// - `POST /v1/comments` - `{ "task_id": "...", "content": "..." }`
/// - `GET /v1/tasks/:id/comments?skip=0&limit=100` - oldest first
///
/// Both require the caller to be an admin or the task's assignee.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use taskboard_shared::{
    auth::policy::Caller,
    models::comment::Comment,
    services::{
        comments::{self, CreateCommentInput},
        query::{self, PageParams},
    },
};
use uuid::Uuid;

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<CreateCommentInput>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = comments::create_comment(state.store(), &caller, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = query::list_comments(state.store(), &caller, task_id, page).await?;
    Ok(Json(comments))
}
