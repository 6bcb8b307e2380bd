/// Credential hashing with Argon2id
///
/// Digests are PHC strings, so the cost parameters travel with each digest and
/// verification works across parameter changes.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password, HashingParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = HashingParams::default();
/// let digest = hash_password("user123", &params)?;
///
/// assert!(verify_password("user123", &digest)?);
/// assert!(!verify_password("user124", &digest)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::Deserialize;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored digest isn't a parseable PHC string
    #[error("invalid password digest: {0}")]
    InvalidDigest(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashingParams {
    /// 64 MiB, 3 passes, 4 lanes
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl HashingParams {
    /// Cheapest parameters argon2 accepts; for tests and local seeding only
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes a password with a fresh random salt
pub fn hash_password(password: &str, params: &HashingParams) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(digest.to_string())
}

/// Checks a password against a stored digest
///
/// Returns `Ok(false)` on mismatch; `Err` only when the digest itself is
/// malformed.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(digest).map_err(|e| PasswordError::InvalidDigest(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::InvalidDigest(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embeds_parameters() {
        let params = HashingParams {
            memory_kib: 1024,
            iterations: 2,
            parallelism: 1,
        };
        let digest = hash_password("admin123", &params).unwrap();

        assert!(digest.starts_with("$argon2id$v=19$"));
        assert!(digest.contains("m=1024,t=2,p=1"));
        assert!(!digest.contains("admin123"));
    }

    #[test]
    fn test_salts_differ() {
        let params = HashingParams::minimal();
        let a = hash_password("same", &params).unwrap();
        let b = hash_password("same", &params).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify() {
        let digest = hash_password("user123", &HashingParams::minimal()).unwrap();

        assert!(verify_password("user123", &digest).unwrap());
        assert!(!verify_password("user12", &digest).unwrap());
        assert!(!verify_password("", &digest).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        assert!(matches!(
            verify_password("x", "not-a-digest"),
            Err(PasswordError::InvalidDigest(_))
        ));
    }

    #[test]
    fn test_invalid_params() {
        let params = HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };
        assert!(matches!(
            hash_password("x", &params),
            Err(PasswordError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_default_params() {
        let params = HashingParams::default();
        assert_eq!(params.memory_kib, 65536);
        assert_eq!(params.iterations, 3);
        assert_eq!(params.parallelism, 4);
    }
}
