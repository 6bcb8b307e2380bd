/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Exchange credentials for a bearer token
/// - `GET /v1/auth/me` - Current user

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskboard_shared::{
    auth::policy::Caller,
    models::user::{Role, User},
    services::identity::{self, IssuedToken, Registration},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Defaults to `user`
    #[serde(default)]
    pub role: Role,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new user
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "secret123"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username or email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let user = identity::register(
        state.store(),
        state.hashing(),
        Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            role: req.role,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login
///
/// ```text
/// POST /v1/auth/login
///
/// { "username": "alice", "password": "secret123" }
/// ```
///
/// Response:
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer", "expires_in": 1800 }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown user, wrong password or inactive account
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<IssuedToken>> {
    req.validate()?;

    let token = identity::login(state.store(), &state.tokens, &req.username, &req.password).await?;

    Ok(Json(token))
}

/// Current user
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<User>> {
    let user = identity::current_user(state.store(), &caller).await?;
    Ok(Json(user))
}
