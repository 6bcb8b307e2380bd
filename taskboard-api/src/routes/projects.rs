/// Project endpoints
///
/// Reads are open to every authenticated user; writes are admin only.
///
/// - `GET /v1/projects?skip=0&limit=100`
/// - `POST /v1/projects`
/// - `GET /v1/projects/:id`
/// - `PUT /v1/projects/:id` - partial; `"description": null` clears it
/// - `DELETE /v1/projects/:id` - also removes the project's tasks and comments

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use taskboard_shared::{
    auth::policy::Caller,
    models::project::Project,
    services::{
        projects::{self, CreateProjectInput, UpdateProjectInput},
        query::{self, PageParams},
    },
};
use uuid::Uuid;

/// Acknowledgement for deletes
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

impl DeletedResponse {
    pub fn new(what: &str) -> Json<Self> {
        Json(Self {
            message: format!("{what} deleted successfully"),
        })
    }
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = query::list_projects(state.store(), &caller, page).await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = projects::create_project(state.store(), &caller, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = projects::get_project(state.store(), &caller, id).await?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProjectInput>,
) -> ApiResult<Json<Project>> {
    let project = projects::update_project(state.store(), &caller, id, input).await?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedResponse>> {
    projects::delete_project(state.store(), &caller, id).await?;
    Ok(DeletedResponse::new("Project"))
}
