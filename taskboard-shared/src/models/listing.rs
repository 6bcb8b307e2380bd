/// Listing types shared by the store backends
///
/// These are already-validated values: `Pagination` is bounded, `TaskFilter`
/// is already scoped. Building them from caller input is the job of
/// `services::query`.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{Task, TaskPriority, TaskStatus};
use super::ParseEnumError;

/// Number of rows returned when the caller doesn't ask for a limit
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Upper bound on `limit`; larger requests are clamped
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Offset/limit window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Rows to skip (never negative)
    pub skip: i64,

    /// Rows to return (0..=MAX_PAGE_LIMIT)
    pub limit: i64,
}

impl Pagination {
    /// Builds a window, clamping `limit` to [`MAX_PAGE_LIMIT`]
    ///
    /// Returns `None` when either bound is negative.
    pub fn new(skip: i64, limit: i64) -> Option<Self> {
        if skip < 0 || limit < 0 {
            return None;
        }

        Some(Self {
            skip,
            limit: limit.min(MAX_PAGE_LIMIT),
        })
    }

    /// Applies the window to an already ordered iterator
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Equality filters over tasks, all combined with AND
///
/// `scope_assignee` is the mandatory ownership scope for non-admin callers;
/// `assignee_id` is the optional explicit filter. When both are set a task must
/// match both, so an explicit filter can only narrow the scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub scope_assignee: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.scope_assignee.map_or(true, |id| task.assignee_id == id)
            && self.assignee_id.map_or(true, |id| task.assignee_id == id)
            && self.project_id.map_or(true, |id| task.project_id == id)
            && self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
    }
}

/// Column a task listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Deadline,
    Priority,
    Status,
}

impl TaskSortField {
    pub fn column(&self) -> &'static str {
        match self {
            TaskSortField::CreatedAt => "created_at",
            TaskSortField::UpdatedAt => "updated_at",
            TaskSortField::Deadline => "deadline",
            TaskSortField::Priority => "priority",
            TaskSortField::Status => "status",
        }
    }
}

impl FromStr for TaskSortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(TaskSortField::CreatedAt),
            "updated_at" => Ok(TaskSortField::UpdatedAt),
            "deadline" => Ok(TaskSortField::Deadline),
            "priority" => Ok(TaskSortField::Priority),
            "status" => Ok(TaskSortField::Status),
            other => Err(ParseEnumError::new("sort_by", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ParseEnumError::new("order", other)),
        }
    }
}

/// Ordering for task listings
///
/// Ties are broken by creation time and then id so pages are stable. Tasks
/// without a deadline always sort last when ordering by deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub order: SortOrder,
}

impl TaskSort {
    /// `ORDER BY` clause body for PostgreSQL
    pub fn order_by_clause(&self) -> String {
        let direction = self.order.keyword();
        match self.field {
            TaskSortField::Deadline => {
                format!("deadline {direction} NULLS LAST, created_at ASC, id ASC")
            }
            TaskSortField::CreatedAt => format!("created_at {direction}, id {direction}"),
            field => format!("{} {direction}, created_at ASC, id ASC", field.column()),
        }
    }

    /// Same ordering as [`TaskSort::order_by_clause`], for in-memory sorting
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let directed = |ordering: Ordering| match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };

        let tie_break = || a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id));

        match self.field {
            TaskSortField::CreatedAt => directed(tie_break()),
            TaskSortField::UpdatedAt => directed(a.updated_at.cmp(&b.updated_at)).then_with(tie_break),
            TaskSortField::Priority => directed(a.priority.cmp(&b.priority)).then_with(tie_break),
            TaskSortField::Status => directed(a.status.cmp(&b.status)).then_with(tie_break),
            TaskSortField::Deadline => match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => directed(x.cmp(&y)).then_with(tie_break),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => tie_break(),
            },
        }
    }
}
