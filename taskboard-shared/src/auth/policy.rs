/// Authorization policy
///
/// A single pure decision function, [`can`], gates every read and write in
/// the service layer. It never touches storage: the caller passes in who is
/// asking, what they want to do and (for task-scoped actions) who the task is
/// assigned to.
///
/// # Rules
///
/// | Action                              | admin | assignee          | other user |
/// |-------------------------------------|-------|-------------------|------------|
/// | project create / update / delete    | yes   | no                | no         |
/// | project read, task listing          | yes   | yes               | yes        |
/// | task create / delete, user listing  | yes   | no                | no         |
/// | task read, comment read / create    | yes   | yes               | no         |
/// | task update                         | yes   | `status` only     | no         |
///
/// A non-admin update that names any field besides `status` is denied as a
/// whole, even if `status` is also present.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::policy::{can, Action, Caller, Decision, Target, TaskField};
/// use taskboard_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let alice = Caller::new(Uuid::new_v4(), Role::User);
/// let task = Target::Task { assignee_id: alice.id };
///
/// let status_only = Action::UpdateTask([TaskField::Status].into());
/// assert_eq!(can(&alice, &status_only, &task), Decision::Allow);
///
/// let with_title = Action::UpdateTask([TaskField::Status, TaskField::Title].into());
/// assert!(can(&alice, &with_title, &task).is_denied());
/// ```

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use crate::models::task::Task;
use crate::models::user::{Role, User};

/// Authenticated identity making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Task fields named in update requests
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskField {
    Title,
    Description,
    Deadline,
    Priority,
    Status,
    AssigneeId,
    ProjectId,

    /// A request key that names no writable task field
    Other(String),
}

impl TaskField {
    pub fn as_str(&self) -> &str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Deadline => "deadline",
            TaskField::Priority => "priority",
            TaskField::Status => "status",
            TaskField::AssigneeId => "assignee_id",
            TaskField::ProjectId => "project_id",
            TaskField::Other(key) => key,
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields present in a task update request
pub type FieldSet = BTreeSet<TaskField>;

/// Fields a non-admin assignee may write
const ASSIGNEE_WRITABLE: [TaskField; 1] = [TaskField::Status];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateProject,
    ReadProject,
    UpdateProject,
    DeleteProject,
    CreateTask,
    ReadTask,
    UpdateTask(FieldSet),
    DeleteTask,
    ListTasks,
    CreateComment,
    ReadComments,
    ListUsers,
}

/// What the action is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No specific row (creation, listings)
    Collection,

    /// An existing task, described by its assignee
    Task { assignee_id: Uuid },
}

impl From<&Task> for Target {
    fn from(task: &Task) -> Self {
        Target::Task {
            assignee_id: task.assignee_id,
        }
    }
}

/// Reason for a denial
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("admin role required")]
    AdminOnly,

    #[error("task is not assigned to you")]
    NotAssignee,

    #[error("not allowed to update field(s): {}", join_fields(.0))]
    RestrictedFields(Vec<TaskField>),

    /// Task-scoped action evaluated without a task
    #[error("action requires a target task")]
    MissingTarget,
}

fn join_fields(fields: &[TaskField]) -> String {
    fields
        .iter()
        .map(TaskField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => Err(denial),
        }
    }
}

/// Decides whether `caller` may perform `action` on `target`
pub fn can(caller: &Caller, action: &Action, target: &Target) -> Decision {
    if caller.is_admin() {
        return Decision::Allow;
    }

    match action {
        Action::ReadProject | Action::ListTasks => Decision::Allow,

        Action::CreateProject
        | Action::UpdateProject
        | Action::DeleteProject
        | Action::CreateTask
        | Action::DeleteTask
        | Action::ListUsers => Decision::Deny(Denial::AdminOnly),

        Action::ReadTask | Action::CreateComment | Action::ReadComments => {
            assignee_only(caller, target)
        }

        Action::UpdateTask(fields) => {
            if let Decision::Deny(denial) = assignee_only(caller, target) {
                return Decision::Deny(denial);
            }

            let restricted: Vec<TaskField> = fields
                .iter()
                .filter(|field| !ASSIGNEE_WRITABLE.contains(field))
                .cloned()
                .collect();

            if restricted.is_empty() {
                Decision::Allow
            } else {
                Decision::Deny(Denial::RestrictedFields(restricted))
            }
        }
    }
}

/// [`can`] as a `Result`, for use with `?`
pub fn authorize(caller: &Caller, action: &Action, target: &Target) -> Result<(), Denial> {
    can(caller, action, target).into_result()
}

fn assignee_only(caller: &Caller, target: &Target) -> Decision {
    match target {
        Target::Task { assignee_id } if *assignee_id == caller.id => Decision::Allow,
        Target::Task { .. } => Decision::Deny(Denial::NotAssignee),
        Target::Collection => Decision::Deny(Denial::MissingTarget),
    }
}
