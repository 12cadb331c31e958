//! Session service issuing and rotating JWT access/refresh token pairs.

use chrono::Utc;
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Which of the two secrets a token is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims carried by both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
    pub typ: TokenType,
}

/// Identity of the caller, attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// A freshly issued token pair.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Service for issuing, verifying and revoking sessions.
///
/// Access tokens are stateless. For refresh tokens only an HMAC-SHA256 digest
/// (keyed by the refresh secret) is stored on the user row, and a refresh
/// replaces it, so each refresh token can be used once.
pub struct AuthService<U: UserRepository> {
    users: Arc<U>,
    jwt: JwtConfig,
}

impl<U: UserRepository> AuthService<U> {
    /// Creates a new session service.
    pub fn new(users: Arc<U>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(self.jwt.refresh_secret.as_bytes())
            .map_err(|e| AppError::internal("Invalid HMAC key", json!({ "reason": e.to_string() })))
    }

    /// Hashes a refresh token with HMAC-SHA256 using the refresh secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    fn hash_token(&self, token: &str) -> Result<String, AppError> {
        let mut mac = self.mac()?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time comparison of a token against a stored digest.
    fn digest_matches(&self, token: &str, stored_hex: &str) -> Result<bool, AppError> {
        let Ok(stored) = hex::decode(stored_hex) else {
            return Ok(false);
        };
        let mut mac = self.mac()?;
        mac.update(token.as_bytes());
        Ok(mac.verify_slice(&stored).is_ok())
    }

    fn sign(&self, user: &User, typ: TokenType) -> Result<String, AppError> {
        let (secret, ttl) = match typ {
            TokenType::Access => (&self.jwt.access_secret, self.jwt.access_ttl),
            TokenType::Refresh => (&self.jwt.refresh_secret, self.jwt.refresh_ttl),
        };

        let iat = Utc::now().timestamp();
        let exp = i64::try_from(ttl)
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| {
                AppError::internal("Token lifetime too large", json!({ "ttl": ttl }))
            })?;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            iat,
            exp,
            jti: Uuid::new_v4(),
            typ,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::internal("Failed to sign token", json!({ "reason": e.to_string() })))
    }

    fn decode_claims(&self, token: &str, typ: TokenType) -> Option<Claims> {
        let secret = match typ {
            TokenType::Access => &self.jwt.access_secret,
            TokenType::Refresh => &self.jwt.refresh_secret,
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .ok()
        .map(|data| data.claims)
        .filter(|claims| claims.typ == typ)
    }

    /// Issues a token pair and records the refresh token digest.
    ///
    /// Any refresh token issued earlier for this user stops working.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user no longer exists.
    /// Returns [`AppError::Internal`] on signing or database errors.
    pub async fn issue_session(&self, user: &User) -> Result<SessionTokens, AppError> {
        let access_token = self.sign(user, TokenType::Access)?;
        let refresh_token = self.sign(user, TokenType::Refresh)?;

        let digest = self.hash_token(&refresh_token)?;
        if !self
            .users
            .set_refresh_token_hash(user.id, Some(digest))
            .await?
        {
            return Err(AppError::not_found(
                "User not found",
                json!({ "user_id": user.id }),
            ));
        }

        Ok(SessionTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt.access_ttl,
        })
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, expired,
    /// of the wrong type, already rotated or revoked, or the user is gone.
    /// Returns [`AppError::Forbidden`] if the token is current but the account
    /// has been disabled.
    /// Returns [`AppError::Internal`] on signing or database errors.
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<(User, SessionTokens), AppError> {
        let invalid = || AppError::unauthorized("Invalid refresh token");

        let claims = self
            .decode_claims(refresh_token, TokenType::Refresh)
            .ok_or_else(invalid)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(invalid)?;

        let Some(stored) = user.refresh_token_hash.as_deref() else {
            warn!(user_id = %user.id, "Refresh attempted on a revoked session");
            return Err(invalid());
        };

        if !self.digest_matches(refresh_token, stored)? {
            warn!(user_id = %user.id, jti = %claims.jti, "Stale refresh token presented");
            return Err(invalid());
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Refresh attempted on a disabled account");
            return Err(AppError::forbidden("Account is disabled"));
        }

        let tokens = self.issue_session(&user).await?;
        info!(user_id = %user.id, "session_refreshed");

        Ok((user, tokens))
    }

    /// Forgets the user's refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn revoke_session(&self, user_id: Uuid) -> Result<(), AppError> {
        if !self.users.set_refresh_token_hash(user_id, None).await? {
            return Err(AppError::not_found(
                "User not found",
                json!({ "user_id": user_id }),
            ));
        }

        info!(user_id = %user_id, "session_revoked");
        Ok(())
    }

    /// Checks an access token's signature, expiry and type.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for any invalid token.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthUser, AppError> {
        self.decode_claims(token, TokenType::Access)
            .map(|claims| AuthUser {
                id: claims.sub,
                username: claims.username,
            })
            .ok_or_else(|| AppError::unauthorized("Invalid or expired access token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUserRepository;
    use std::sync::Mutex;

    fn test_jwt() -> JwtConfig {
        JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_ttl: 900,
            refresh_ttl: 3600,
        }
    }

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mock whose stored digest behaves like the real column.
    fn stateful_repo(user: User) -> (MockUserRepository, Arc<Mutex<Option<String>>>) {
        let stored = Arc::new(Mutex::new(None::<String>));
        let mut mock = MockUserRepository::new();

        let writes = stored.clone();
        mock.expect_set_refresh_token_hash()
            .returning(move |_, hash| {
                *writes.lock().unwrap() = hash;
                Ok(true)
            });

        let reads = stored.clone();
        mock.expect_find_by_id().returning(move |_| {
            let mut u = user.clone();
            u.refresh_token_hash = reads.lock().unwrap().clone();
            Ok(Some(u))
        });

        (mock, stored)
    }

    #[tokio::test]
    async fn test_issue_then_verify_access_token() {
        let user = sample_user();
        let (mock, stored) = stateful_repo(user.clone());
        let service = AuthService::new(Arc::new(mock), test_jwt());

        let tokens = service.issue_session(&user).await.unwrap();

        let auth = service.verify_access_token(&tokens.access_token).unwrap();
        assert_eq!(auth.id, user.id);
        assert_eq!(auth.username, "alice");
        assert_eq!(tokens.expires_in, 900);

        let digest = stored.lock().unwrap().clone().unwrap();
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, tokens.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let user = sample_user();
        let (mock, _) = stateful_repo(user.clone());
        let service = AuthService::new(Arc::new(mock), test_jwt());

        let tokens = service.issue_session(&user).await.unwrap();

        assert!(matches!(
            service.verify_access_token(&tokens.refresh_token),
            Err(AppError::Unauthorized { .. })
        ));
        assert!(matches!(
            service.refresh_session(&tokens.access_token).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_rejects_old_token() {
        let user = sample_user();
        let (mock, _) = stateful_repo(user.clone());
        let service = AuthService::new(Arc::new(mock), test_jwt());

        let first = service.issue_session(&user).await.unwrap();
        let (_, second) = service.refresh_session(&first.refresh_token).await.unwrap();

        assert_ne!(first.refresh_token, second.refresh_token);
        assert!(matches!(
            service.refresh_session(&first.refresh_token).await,
            Err(AppError::Unauthorized { .. })
        ));
        assert!(service.refresh_session(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_after_revoke_fails() {
        let user = sample_user();
        let (mock, stored) = stateful_repo(user.clone());
        let service = AuthService::new(Arc::new(mock), test_jwt());

        let tokens = service.issue_session(&user).await.unwrap();
        service.revoke_session(user.id).await.unwrap();

        assert!(stored.lock().unwrap().is_none());
        assert!(matches!(
            service.refresh_session(&tokens.refresh_token).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_disabled_account() {
        let user = sample_user();
        let mut inactive = user.clone();
        inactive.is_active = false;
        let (mock, stored) = stateful_repo(inactive);
        let service = AuthService::new(Arc::new(mock), test_jwt());

        let tokens = service.issue_session(&user).await.unwrap();
        let digest = stored.lock().unwrap().clone();

        assert!(matches!(
            service.refresh_session(&tokens.refresh_token).await,
            Err(AppError::Forbidden { .. })
        ));
        assert_eq!(*stored.lock().unwrap(), digest);
    }

    #[tokio::test]
    async fn test_disabled_account_with_stale_token_is_unauthorized() {
        let user = sample_user();
        let mut inactive = user.clone();
        inactive.is_active = false;
        let (mock, _) = stateful_repo(inactive);
        let service = AuthService::new(Arc::new(mock), test_jwt());

        let first = service.issue_session(&user).await.unwrap();
        service.issue_session(&user).await.unwrap();

        assert!(matches!(
            service.refresh_session(&first.refresh_token).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_revoke_unknown_user() {
        let mut mock = MockUserRepository::new();
        mock.expect_set_refresh_token_hash()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = AuthService::new(Arc::new(mock), test_jwt());

        assert!(matches!(
            service.revoke_session(Uuid::new_v4()).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_lifetime_fails_without_panic() {
        let mut jwt = test_jwt();
        jwt.access_ttl = u64::MAX;
        let mut mock = MockUserRepository::new();
        mock.expect_set_refresh_token_hash().never();
        let service = AuthService::new(Arc::new(mock), jwt);

        assert!(matches!(
            service.issue_session(&sample_user()).await,
            Err(AppError::Internal { .. })
        ));
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let service = AuthService::new(Arc::new(MockUserRepository::new()), test_jwt());
        let user = sample_user();

        let claims = Claims {
            sub: user.id,
            username: user.username,
            iat: 1_000,
            exp: 2_000,
            jti: Uuid::new_v4(),
            typ: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-access-secret"),
        )
        .unwrap();

        assert!(service.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let service = AuthService::new(Arc::new(MockUserRepository::new()), test_jwt());

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "mallory".to_string(),
            iat: now,
            exp: now + 600,
            jti: Uuid::new_v4(),
            typ: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"not-the-secret"),
        )
        .unwrap();

        assert!(service.verify_access_token(&token).is_err());
        assert!(service.verify_access_token("garbage").is_err());
    }

    #[test]
    fn test_hash_token_consistency() {
        let service = AuthService::new(Arc::new(MockUserRepository::new()), test_jwt());

        let hash1 = service.hash_token("token").unwrap();
        let hash2 = service.hash_token("token").unwrap();

        assert_eq!(hash1, hash2);
        assert!(service.digest_matches("token", &hash1).unwrap());
        assert!(!service.digest_matches("other", &hash1).unwrap());
        assert!(!service.digest_matches("token", "not-hex").unwrap());
    }
}
