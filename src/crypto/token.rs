use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::{AppError, Result};
use crate::models::claims::Claims;
use crate::models::user::User;

/// Issues and verifies signed, time-limited bearer tokens.
///
/// Verification is stateless: there is no revocation list, so a leaked token
/// stays valid until it expires.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<Keys>,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Creates a `TokenService` from the process-wide signing secret.
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            inner: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
                ttl: Duration::hours(ttl_hours),
            }),
        }
    }

    /// Issues a token for `user`, valid from now for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String> {
        self.issue_at(user, Utc::now())
    }

    /// Issues a token as if it had been signed at `issued_at`.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.inner.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verifies a token's signature and expiry and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AppError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ann@example.com".into(),
            password_hash: "unused".into(),
            name: "Ann".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies_with_same_identity() {
        let service = TokenService::new(SECRET, 24);
        let user = user();

        let claims = service.verify(&service.issue(&user).unwrap()).unwrap();

        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_expires_after_ttl() {
        let service = TokenService::new(SECRET, 24);
        let user = user();

        let still_valid = service
            .issue_at(&user, Utc::now() - Duration::hours(23))
            .unwrap();
        assert!(service.verify(&still_valid).is_ok());

        let expired = service
            .issue_at(&user, Utc::now() - Duration::hours(24) - Duration::seconds(5))
            .unwrap();
        assert!(matches!(service.verify(&expired), Err(AppError::InvalidToken)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = TokenService::new(SECRET, 24);
        let theirs = TokenService::new(b"another-secret-another-secret-xx", 24);

        let token = theirs.issue(&user()).unwrap();
        assert!(matches!(ours.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        let service = TokenService::new(SECRET, 24);
        assert!(matches!(service.verify("not.a.jwt"), Err(AppError::InvalidToken)));
        assert!(matches!(service.verify(""), Err(AppError::InvalidToken)));
    }
}
