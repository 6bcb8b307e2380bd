/// Listing entry points
///
/// Every listing composes, in order: pagination bounds, the caller's
/// mandatory scope, then optional equality filters. Filters are ANDed with
/// the scope, so no combination of query parameters widens what a non-admin
/// can see.

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::policy::{authorize, Action, Caller, Target};
use crate::models::comment::Comment;
use crate::models::listing::{Pagination, SortOrder, TaskFilter, TaskSort, TaskSortField, DEFAULT_PAGE_LIMIT};
use crate::models::project::Project;
use crate::models::task::{Task, TaskPriority, TaskStatus};
use crate::models::user::User;
use crate::store::Store;

/// Raw `skip`/`limit` as supplied by the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    /// Applies defaults, rejects negatives and clamps `limit`
    pub fn resolve(&self) -> ServiceResult<Pagination> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if skip < 0 {
            return Err(ServiceError::invalid("skip", "must not be negative"));
        }

        Pagination::new(skip, limit)
            .ok_or_else(|| ServiceError::invalid("limit", "must not be negative"))
    }
}

/// Raw task listing parameters
///
/// Kept flat (no `#[serde(flatten)]`) so it deserializes from a URL query
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl TaskQuery {
    pub fn page(&self) -> PageParams {
        PageParams {
            skip: self.skip,
            limit: self.limit,
        }
    }

    pub fn sort(&self) -> ServiceResult<TaskSort> {
        Ok(TaskSort {
            field: parse_opt::<TaskSortField>(self.sort_by.as_deref())?.unwrap_or_default(),
            order: parse_opt::<SortOrder>(self.order.as_deref())?.unwrap_or_default(),
        })
    }

    /// Builds the store filter with the caller's scope applied
    pub fn filter_for(&self, caller: &Caller) -> ServiceResult<TaskFilter> {
        let mut filter = scope_for(caller);
        filter.assignee_id = self.assignee_id;
        filter.project_id = self.project_id;
        filter.status = parse_opt::<TaskStatus>(self.status.as_deref())?;
        filter.priority = parse_opt::<TaskPriority>(self.priority.as_deref())?;
        Ok(filter)
    }
}

/// The task set `caller` may see, before any explicit filter
pub fn scope_for(caller: &Caller) -> TaskFilter {
    TaskFilter {
        scope_assignee: (!caller.is_admin()).then_some(caller.id),
        ..Default::default()
    }
}

fn parse_opt<T>(raw: Option<&str>) -> ServiceResult<Option<T>>
where
    T: std::str::FromStr,
    ServiceError: From<T::Err>,
{
    raw.map(str::parse::<T>).transpose().map_err(ServiceError::from)
}

/// Lists tasks visible to `caller`
pub async fn list_tasks(
    store: &dyn Store,
    caller: &Caller,
    query: &TaskQuery,
) -> ServiceResult<Vec<Task>> {
    authorize(caller, &Action::ListTasks, &Target::Collection)?;
    let page = query.page().resolve()?;
    let filter = query.filter_for(caller)?;
    let sort = query.sort()?;

    debug!(caller = %caller.id, ?filter, ?sort, skip = page.skip, limit = page.limit, "Listing tasks");

    Ok(store.list_tasks(&filter, sort, page).await?)
}

/// Lists all projects; readable by every authenticated caller
pub async fn list_projects(
    store: &dyn Store,
    caller: &Caller,
    page: PageParams,
) -> ServiceResult<Vec<Project>> {
    authorize(caller, &Action::ReadProject, &Target::Collection)?;
    let page = page.resolve()?;

    Ok(store.list_projects(page).await?)
}

/// Lists users (admin only)
pub async fn list_users(
    store: &dyn Store,
    caller: &Caller,
    page: PageParams,
) -> ServiceResult<Vec<User>> {
    authorize(caller, &Action::ListUsers, &Target::Collection)?;
    let page = page.resolve()?;

    Ok(store.list_users(page).await?)
}

/// Lists a task's comments, oldest first
pub async fn list_comments(
    store: &dyn Store,
    caller: &Caller,
    task_id: Uuid,
    page: PageParams,
) -> ServiceResult<Vec<Comment>> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or(ServiceError::NotFound("task"))?;
    authorize(caller, &Action::ReadComments, &Target::from(&task))?;
    let page = page.resolve()?;

    Ok(store.list_comments(task_id, page).await?)
}
