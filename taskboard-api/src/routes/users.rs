/// User directory
///
/// `GET /v1/users?skip=0&limit=100` - admin only

use crate::{app::AppState, error::ApiResult, extract::ApiQuery};
use axum::{extract::State, Extension, Json};
use taskboard_shared::{
    auth::policy::Caller,
    models::user::User,
    services::query::{self, PageParams},
};

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<Json<Vec<User>>> {
    let users = query::list_users(state.store(), &caller, page).await?;
    Ok(Json(users))
}
