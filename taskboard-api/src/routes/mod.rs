/// API route handlers
///
/// Handlers are thin: extract, call the matching service operation, wrap the
/// result in JSON. Authorization happens in the services.
///
/// - `health`: liveness and store connectivity
/// - `auth`: register, login, current user
/// - `projects`, `tasks`, `comments`: the task board itself
/// - `users`: user directory (admin)

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
