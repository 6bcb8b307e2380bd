/// Registration, login and caller resolution
///
/// Plaintext passwords enter here and leave only as Argon2id digests. They are
/// never logged.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{require_text_within, ServiceError, ServiceResult, EMAIL_MAX_CHARS, USERNAME_MAX_CHARS};
use crate::auth::jwt::TokenService;
use crate::auth::password::{hash_password, verify_password, HashingParams};
use crate::auth::policy::Caller;
use crate::models::user::{NewUser, Role, User};
use crate::store::Store;

/// Input for [`register`]
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Bearer token handed out by [`login`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,

    /// Always "bearer"
    pub token_type: &'static str,

    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Creates a user account
///
/// Uniqueness is checked up front for a precise error; the store's unique
/// constraints still decide concurrent races, which surface as the same
/// `Conflict`.
pub async fn register(
    store: &dyn Store,
    hashing: &HashingParams,
    registration: Registration,
) -> ServiceResult<User> {
    require_text_within("username", &registration.username, USERNAME_MAX_CHARS)?;
    require_text_within("email", &registration.email, EMAIL_MAX_CHARS)?;

    if store
        .find_user_by_username(&registration.username)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict { field: "username" });
    }
    if store.find_user_by_email(&registration.email).await?.is_some() {
        return Err(ServiceError::Conflict { field: "email" });
    }

    let password_hash = hash_password(&registration.password, hashing)?;

    let user = store
        .insert_user(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            role: registration.role,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
    Ok(user)
}

/// Checks a username/password pair
///
/// Unknown users, wrong passwords and inactive accounts all fail the same way.
pub async fn authenticate(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> ServiceResult<User> {
    let Some(user) = store.find_user_by_username(username).await? else {
        warn!(username = %username, "Login failed: unknown user");
        return Err(ServiceError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ServiceError::InvalidCredentials);
    }

    if !user.is_active {
        warn!(user_id = %user.id, "Login failed: account inactive");
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(user)
}

/// Authenticates and issues a bearer token
pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> ServiceResult<IssuedToken> {
    let user = authenticate(store, username, password).await?;
    let access_token = tokens.issue(user.id)?;

    info!(user_id = %user.id, "User logged in");

    Ok(IssuedToken {
        access_token,
        token_type: "bearer",
        expires_in: tokens.ttl().num_seconds(),
    })
}

/// Resolves a bearer token to the caller it names
///
/// The role comes from the store, not the token, and inactive or deleted
/// accounts are rejected.
pub async fn resolve_caller(
    store: &dyn Store,
    tokens: &TokenService,
    token: &str,
) -> ServiceResult<Caller> {
    let user_id = tokens.verify(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ServiceError::Unauthenticated
    })?;

    match store.find_user(user_id).await? {
        Some(user) if user.is_active => Ok(Caller::from(&user)),
        _ => {
            warn!(user_id = %user_id, "Token names a missing or inactive user");
            Err(ServiceError::Unauthenticated)
        }
    }
}

/// Returns the caller's own account
pub async fn current_user(store: &dyn Store, caller: &Caller) -> ServiceResult<User> {
    store
        .find_user(caller.id)
        .await?
        .ok_or(ServiceError::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "user123".to_string(),
            role: Role::User,
        }
    }

    fn tokens() -> TokenService {
        TokenService::new("test-secret-that-is-at-least-32-bytes-long", Duration::minutes(30))
    }

    #[tokio::test]
    async fn test_register_stores_digest_only() {
        let store = MemoryStore::new();
        let user = register(&store, &HashingParams::minimal(), registration("alice"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
        assert_ne!(user.password_hash, "user123");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicates() {
        let store = MemoryStore::new();
        let hashing = HashingParams::minimal();
        register(&store, &hashing, registration("alice")).await.unwrap();

        let err = register(&store, &hashing, registration("alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { field: "username" }));

        let mut same_email = registration("bob");
        same_email.email = "alice@example.com".to_string();
        let err = register(&store, &hashing, same_email).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict { field: "email" }));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = MemoryStore::new();
        register(&store, &HashingParams::minimal(), registration("alice"))
            .await
            .unwrap();

        assert!(authenticate(&store, "alice", "user123").await.is_ok());
        assert!(matches!(
            authenticate(&store, "alice", "nope").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&store, "mallory", "user123").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_and_resolve() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let user = register(&store, &HashingParams::minimal(), registration("alice"))
            .await
            .unwrap();

        let issued = login(&store, &tokens, "alice", "user123").await.unwrap();
        assert_eq!(issued.token_type, "bearer");
        assert_eq!(issued.expires_in, 1800);

        let caller = resolve_caller(&store, &tokens, &issued.access_token)
            .await
            .unwrap();
        assert_eq!(caller, Caller::new(user.id, Role::User));

        let me = current_user(&store, &caller).await.unwrap();
        assert_eq!(me.username, "alice");
    }

    #[tokio::test]
    async fn test_inactive_account_is_locked_out() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let user = register(&store, &HashingParams::minimal(), registration("alice"))
            .await
            .unwrap();
        let issued = login(&store, &tokens, "alice", "user123").await.unwrap();

        store.set_user_active(user.id, false).await;

        assert!(matches!(
            authenticate(&store, "alice", "user123").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&store, &tokens, "alice", "user123").await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            resolve_caller(&store, &tokens, &issued.access_token).await,
            Err(ServiceError::Unauthenticated)
        ));

        store.set_user_active(user.id, true).await;
        assert!(resolve_caller(&store, &tokens, &issued.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_tokens() {
        let store = MemoryStore::new();
        let tokens = tokens();

        assert!(matches!(
            resolve_caller(&store, &tokens, "garbage").await,
            Err(ServiceError::Unauthenticated)
        ));

        let orphan = tokens.issue(uuid::Uuid::new_v4()).unwrap();
        assert!(matches!(
            resolve_caller(&store, &tokens, &orphan).await,
            Err(ServiceError::Unauthenticated)
        ));
    }
}
