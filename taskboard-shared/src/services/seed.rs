/// Sample data for development
///
/// Creates an admin, two users, two projects, four tasks and three comments.
/// Skipped entirely when a user named `admin` already exists, so it is safe to
/// run on every startup.
///
/// | username     | password   | role  |
/// |--------------|------------|-------|
/// | `admin`      | `admin123` | admin |
/// | `john_doe`   | `user123`  | user  |
/// | `jane_smith` | `user123`  | user  |

use chrono::{Duration, Utc};
use tracing::info;

use super::ServiceResult;
use crate::auth::password::{hash_password, HashingParams};
use crate::models::comment::NewComment;
use crate::models::project::NewProject;
use crate::models::task::{NewTask, TaskPriority, TaskStatus};
use crate::models::user::{NewUser, Role, User};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Sample data was already present
    Skipped,

    Seeded {
        users: usize,
        projects: usize,
        tasks: usize,
        comments: usize,
    },
}

async fn seed_user(
    store: &dyn Store,
    hashing: &HashingParams,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> ServiceResult<User> {
    Ok(store
        .insert_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password, hashing)?,
            role,
        })
        .await?)
}

/// Inserts the sample data set unless it's already there
pub async fn seed_sample_data(
    store: &dyn Store,
    hashing: &HashingParams,
) -> ServiceResult<SeedOutcome> {
    if store.find_user_by_username("admin").await?.is_some() {
        info!("Sample data already present, skipping");
        return Ok(SeedOutcome::Skipped);
    }

    let admin = seed_user(store, hashing, "admin", "admin@example.com", "admin123", Role::Admin).await?;
    let john = seed_user(store, hashing, "john_doe", "john@example.com", "user123", Role::User).await?;
    let jane = seed_user(store, hashing, "jane_smith", "jane@example.com", "user123", Role::User).await?;

    let website = store
        .insert_project(NewProject {
            title: "Website Redesign".to_string(),
            description: Some("Complete redesign of company website with modern UI/UX".to_string()),
            creator_id: admin.id,
        })
        .await?;
    let mobile = store
        .insert_project(NewProject {
            title: "Mobile App Development".to_string(),
            description: Some("Develop mobile application for iOS and Android".to_string()),
            creator_id: admin.id,
        })
        .await?;

    let now = Utc::now();
    let task_specs = [
        (
            "Design Homepage Mockup",
            "Create modern homepage design with responsive layout",
            &website,
            &john,
            7,
            TaskPriority::High,
            TaskStatus::InProgress,
        ),
        (
            "Implement User Authentication",
            "Set up secure user login and registration system",
            &website,
            &jane,
            10,
            TaskPriority::Medium,
            TaskStatus::Pending,
        ),
        (
            "Mobile App UI Design",
            "Design mobile app user interface screens",
            &mobile,
            &john,
            14,
            TaskPriority::Medium,
            TaskStatus::Pending,
        ),
        (
            "Database Schema Design",
            "Design database structure for mobile app",
            &mobile,
            &jane,
            5,
            TaskPriority::High,
            TaskStatus::Completed,
        ),
    ];

    let mut tasks = Vec::with_capacity(task_specs.len());
    for (title, description, project, assignee, due_in_days, priority, status) in task_specs {
        let task = store
            .insert_task(NewTask {
                title: title.to_string(),
                description: Some(description.to_string()),
                deadline: Some(now + Duration::days(due_in_days)),
                priority,
                status,
                project_id: project.id,
                assignee_id: assignee.id,
            })
            .await?;
        tasks.push(task);
    }

    let comment_specs = [
        (
            0,
            &john,
            "Started working on the mockup. Will have initial draft ready by tomorrow.",
        ),
        (0, &admin, "Please use the brand colors specified in the style guide."),
        (3, &jane, "Database schema has been finalized and approved."),
    ];

    for (task_index, author, content) in comment_specs {
        store
            .insert_comment(NewComment {
                content: content.to_string(),
                task_id: tasks[task_index].id,
                author_id: author.id,
            })
            .await?;
    }

    let outcome = SeedOutcome::Seeded {
        users: 3,
        projects: 2,
        tasks: tasks.len(),
        comments: comment_specs.len(),
    };
    info!(?outcome, "Sample data created");
    Ok(outcome)
}
