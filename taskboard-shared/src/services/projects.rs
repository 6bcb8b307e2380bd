/// Project aggregate
///
/// Any authenticated caller may read projects; only admins create, update or
/// delete them. Deleting a project removes its tasks and their comments.

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{require_text_within, ServiceError, ServiceResult, TITLE_MAX_CHARS};
use crate::auth::policy::{authorize, Action, Caller, Target};
use crate::models::deserialize_present;
use crate::models::project::{NewProject, Project, ProjectChanges};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial project update; `description: null` clears it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectInput {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
}

impl UpdateProjectInput {
    fn into_changes(self) -> ServiceResult<ProjectChanges> {
        let title = match self.title {
            None => None,
            Some(None) => return Err(ServiceError::invalid("title", "must not be null")),
            Some(Some(title)) => {
                require_text_within("title", &title, TITLE_MAX_CHARS)?;
                Some(title)
            }
        };

        Ok(ProjectChanges {
            title,
            description: self.description,
        })
    }
}

/// Creates a project owned by the caller (admin only)
pub async fn create_project(
    store: &dyn Store,
    caller: &Caller,
    input: CreateProjectInput,
) -> ServiceResult<Project> {
    authorize(caller, &Action::CreateProject, &Target::Collection)?;
    require_text_within("title", &input.title, TITLE_MAX_CHARS)?;

    let project = store
        .insert_project(NewProject {
            title: input.title,
            description: input.description,
            creator_id: caller.id,
        })
        .await?;

    info!(project_id = %project.id, creator_id = %caller.id, "Project created");
    Ok(project)
}

pub async fn get_project(
    store: &dyn Store,
    caller: &Caller,
    project_id: Uuid,
) -> ServiceResult<Project> {
    authorize(caller, &Action::ReadProject, &Target::Collection)?;

    let project = store
        .find_project(project_id)
        .await?
        .ok_or(ServiceError::NotFound("project"))?;

    debug!(project_id = %project.id, "Project read");
    Ok(project)
}

/// Applies a partial update (admin only)
pub async fn update_project(
    store: &dyn Store,
    caller: &Caller,
    project_id: Uuid,
    input: UpdateProjectInput,
) -> ServiceResult<Project> {
    authorize(caller, &Action::UpdateProject, &Target::Collection)?;
    let changes = input.into_changes()?;

    let project = if changes.is_empty() {
        store.find_project(project_id).await?
    } else {
        store.update_project(project_id, &changes).await?
    };
    let project = project.ok_or(ServiceError::NotFound("project"))?;

    info!(project_id = %project.id, caller = %caller.id, "Project updated");
    Ok(project)
}

/// Deletes a project with its tasks and their comments (admin only)
pub async fn delete_project(
    store: &dyn Store,
    caller: &Caller,
    project_id: Uuid,
) -> ServiceResult<()> {
    authorize(caller, &Action::DeleteProject, &Target::Collection)?;

    if !store.delete_project(project_id).await? {
        return Err(ServiceError::NotFound("project"));
    }

    info!(project_id = %project_id, caller = %caller.id, "Project deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::Denial;
    use crate::models::user::{NewUser, Role};
    use crate::store::MemoryStore;

    async fn admin(store: &MemoryStore) -> Caller {
        let user = store
            .insert_user(NewUser {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password_hash: "digest".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        Caller::from(&user)
    }

    fn input(title: &str) -> CreateProjectInput {
        CreateProjectInput {
            title: title.to_string(),
            description: Some("Modern UI".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_records_creator() {
        let store = MemoryStore::new();
        let caller = admin(&store).await;

        let project = create_project(&store, &caller, input("Website Redesign"))
            .await
            .unwrap();
        assert_eq!(project.creator_id, caller.id);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_create() {
        let store = MemoryStore::new();
        let caller = Caller::new(Uuid::new_v4(), Role::User);

        let err = create_project(&store, &caller, input("P")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(Denial::AdminOnly)));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = MemoryStore::new();
        let caller = admin(&store).await;
        let project = create_project(&store, &caller, input("Website Redesign"))
            .await
            .unwrap();

        let update: UpdateProjectInput = serde_json::from_str(r#"{"title": "Web v2"}"#).unwrap();
        let updated = update_project(&store, &caller, project.id, update).await.unwrap();
        assert_eq!(updated.title, "Web v2");
        assert_eq!(updated.description, project.description);

        let clear: UpdateProjectInput = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let cleared = update_project(&store, &caller, project.id, clear).await.unwrap();
        assert!(cleared.description.is_none());
        assert_eq!(cleared.title, "Web v2");
    }

    #[tokio::test]
    async fn test_missing_project() {
        let store = MemoryStore::new();
        let caller = admin(&store).await;
        let missing = Uuid::new_v4();

        assert!(matches!(
            get_project(&store, &caller, missing).await,
            Err(ServiceError::NotFound("project"))
        ));
        assert!(matches!(
            update_project(&store, &caller, missing, UpdateProjectInput::default()).await,
            Err(ServiceError::NotFound("project"))
        ));
        assert!(matches!(
            delete_project(&store, &caller, missing).await,
            Err(ServiceError::NotFound("project"))
        ));
    }
}
