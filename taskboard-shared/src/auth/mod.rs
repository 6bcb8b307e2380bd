/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing
/// - [`jwt`]: bearer token issuance and verification
/// - [`policy`]: the role and ownership decision function
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskboard_shared::auth::jwt::TokenService;
/// use taskboard_shared::auth::password::{hash_password, verify_password, HashingParams};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("user123", &HashingParams::default())?;
/// assert!(verify_password("user123", &digest)?);
///
/// let tokens = TokenService::new("a-very-long-secret-of-at-least-32-bytes", Duration::minutes(30));
/// let token = tokens.issue(Uuid::new_v4())?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod policy;
