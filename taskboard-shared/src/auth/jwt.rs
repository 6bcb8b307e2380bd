/// Bearer token issuance and verification (HS256 JWT)
///
/// Tokens carry only the subject (user id) plus the standard registered
/// claims. Role and active flag are looked up again on every request, so a
/// token never outlives a change to the account it names.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskboard_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("a-very-long-secret-of-at-least-32-bytes", Duration::minutes(30));
///
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `iss` claim on every token we issue
pub const ISSUER: &str = "taskboard";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("failed to create token: {0}")]
    Create(String),

    #[error("token has expired")]
    Expired,

    /// Bad signature, wrong issuer, malformed token or not yet valid
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

impl Claims {
    pub fn new(subject: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs and verifies tokens with a process-wide secret and lifetime
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token naming `subject`, valid for the configured lifetime
    pub fn issue(&self, subject: Uuid) -> Result<String, JwtError> {
        self.sign(&Claims::new(subject, self.ttl))
    }

    /// Verifies signature, issuer and validity window; returns the subject
    pub fn verify(&self, token: &str) -> Result<Uuid, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            }
        })?;

        Ok(data.claims.sub)
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::Create(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(30))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let user_id = Uuid::new_v4();

        let token = tokens.issue(user_id).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(tokens.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_claims_window() {
        let claims = Claims::new(Uuid::new_v4(), Duration::minutes(30));
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(Uuid::new_v4()).unwrap();
        let other = TokenService::new("another-secret-that-is-also-32-bytes-long", Duration::minutes(30));

        assert!(matches!(other.verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::minutes(30));
        claims.iat -= 7200;
        claims.nbf -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = tokens.sign(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let tokens = service();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::minutes(30));
        claims.iss = "someone-else".to_string();

        let token = tokens.sign(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(JwtError::Invalid(_))
        ));
        assert!(service().verify("").is_err());
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", service());
        assert!(!debug.contains(SECRET));
    }
}
