/// Database models for Taskboard
///
/// This module contains the four persisted entities and their PostgreSQL
/// CRUD operations, plus the listing types shared by every backend.
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `project`: Projects owning tasks
/// - `task`: Tasks with status/priority and an assignee
/// - `comment`: Append-only comments on tasks
/// - `listing`: Pagination, filters and sort keys for list queries
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{NewProject, Project};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(admin_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, NewProject {
///     title: "Website Redesign".to_string(),
///     description: None,
///     creator_id: admin_id,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod listing;
pub mod project;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Error returned when a string is not one of an enum's variants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseEnumError {
    /// Which enumeration was being parsed (e.g. "status")
    pub kind: &'static str,

    /// The rejected input
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Deserializes a present field into `Some`, so that `Option<Option<T>>`
/// distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
