/// Domain services
///
/// Each operation takes the store, the authenticated [`Caller`] and a request
/// value, consults [`policy::can`] and then performs at most one
/// read-modify-write against the store.
///
/// # Modules
///
/// - `identity`: registration, login, token resolution, current user
/// - `projects`: project CRUD
/// - `tasks`: task lifecycle and summary
/// - `comments`: append-only task comments
/// - `query`: every listing, with pagination and scoping
/// - `seed`: sample data for development
///
/// [`Caller`]: crate::auth::policy::Caller
/// [`policy::can`]: crate::auth::policy::can

pub mod comments;
pub mod identity;
pub mod projects;
pub mod query;
pub mod seed;
pub mod tasks;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::auth::policy::Denial;
use crate::models::ParseEnumError;
use crate::store::StoreError;

/// Outcome taxonomy shared by every service operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced row doesn't exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Policy denied the action
    #[error("forbidden: {0}")]
    Forbidden(#[from] Denial),

    /// Username or email already taken
    #[error("{field} already registered")]
    Conflict { field: &'static str },

    /// Malformed or out-of-range input; nothing was written
    #[error("invalid {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Unknown username, wrong password or inactive account at login
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Missing, invalid or expired token, or one naming an unusable account
    #[error("authentication required")]
    Unauthenticated,

    #[error("storage failure: {0}")]
    Store(StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl ServiceError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for failures that are the server's fault rather than the caller's
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ServiceError::Store(_) | ServiceError::Password(_) | ServiceError::Token(_)
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => ServiceError::Conflict { field },
            StoreError::MissingReference(entity) => ServiceError::NotFound(entity),
            other => ServiceError::Store(other),
        }
    }
}

impl From<ParseEnumError> for ServiceError {
    fn from(err: ParseEnumError) -> Self {
        let message = err.to_string();
        ServiceError::InvalidValue {
            field: err.kind.to_string(),
            message,
        }
    }
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Column widths, in characters
pub(crate) const TITLE_MAX_CHARS: usize = 200;
pub(crate) const USERNAME_MAX_CHARS: usize = 50;
pub(crate) const EMAIL_MAX_CHARS: usize = 255;

/// Rejects empty or whitespace-only text
pub(crate) fn require_text(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Like [`require_text`], but also enforces the column width
pub(crate) fn require_text_within(field: &str, value: &str, max_chars: usize) -> ServiceResult<()> {
    require_text(field, value)?;
    if value.chars().count() > max_chars {
        return Err(ServiceError::invalid(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_outcomes() {
        assert!(matches!(
            ServiceError::from(StoreError::Duplicate("username")),
            ServiceError::Conflict { field: "username" }
        ));
        assert!(matches!(
            ServiceError::from(StoreError::MissingReference("project")),
            ServiceError::NotFound("project")
        ));

        let db = ServiceError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert!(db.is_internal());
    }

    #[test]
    fn test_parse_error_becomes_invalid_value() {
        let err = ServiceError::from(ParseEnumError::new("status", "done"));
        match err {
            ServiceError::InvalidValue { field, message } => {
                assert_eq!(field, "status");
                assert!(message.contains("done"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "x").is_ok());
        assert!(require_text("title", "   ").is_err());
        assert!(require_text("title", "").is_err());

        assert!(require_text_within("title", &"é".repeat(200), TITLE_MAX_CHARS).is_ok());
        assert!(require_text_within("title", &"x".repeat(201), TITLE_MAX_CHARS).is_err());
    }
}
