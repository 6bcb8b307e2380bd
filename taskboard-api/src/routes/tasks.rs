/// Task endpoints
///
/// - `GET /v1/tasks` - filtered, sorted and paginated; non-admins only ever
///   see their own tasks
/// - `POST /v1/tasks` - admin only
/// - `GET /v1/tasks/summary?project_id=...` - dashboard counts
/// - `GET /v1/tasks/:id`
/// - `PUT /v1/tasks/:id` - partial; non-admins may only send `status`
/// - `DELETE /v1/tasks/:id` - admin only
///
/// # Listing parameters
///
/// ```text
/// GET /v1/tasks?status=pending&priority=high&sort_by=deadline&order=asc&skip=0&limit=50
/// ```
///
/// `sort_by` is one of `created_at` (default), `updated_at`, `deadline`,
/// `priority`, `status`. Tasks without a deadline sort last.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::projects::DeletedResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskboard_shared::{
    auth::policy::Caller,
    models::task::Task,
    services::{
        query::{self, TaskQuery},
        tasks::{self, CreateTaskInput, TaskSummary, UpdateTaskInput},
    },
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub project_id: Option<Uuid>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<TaskQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = query::list_tasks(state.store(), &caller, &params).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = tasks::create_task(state.store(), &caller, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn task_summary(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(params): ApiQuery<SummaryQuery>,
) -> ApiResult<Json<TaskSummary>> {
    let summary = tasks::task_summary(state.store(), &caller, params.project_id).await?;
    Ok(Json(summary))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = tasks::get_task(state.store(), &caller, id).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateTaskInput>,
) -> ApiResult<Json<Task>> {
    let task = tasks::update_task(state.store(), &caller, id, input).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    tasks::delete_task(state.store(), &caller, id).await?;
    Ok(DeletedResponse::new("Task"))
}
