//! Access layer: bcrypt password hashes, bearer tokens and the request extractor
//! that turns an `Authorization` header into an authenticated username.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use persistence::{Credential, LedgerStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use types::account::{normalize_username, same_username};
use types::errors::{LedgerError, LedgerResult};
use types::ids::CredentialId;

/// bcrypt only reads the first 72 bytes of a password
const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
}

/// HS256 signing and verification keys
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue_token(&self, username: &str) -> LedgerResult<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> LedgerResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| LedgerError::Internal(format!("token signing failed: {}", e)))
    }

    /// The token's username, if the signature and expiry check out
    pub fn validate_token(&self, token: &str) -> LedgerResult<String> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| LedgerError::Unauthorized(format!("Invalid token: {}", e)))?;
        Ok(data.claims.sub)
    }
}

/// Salted, cost-adaptive bcrypt hash. CPU-bound, so it runs off the
/// async workers.
pub async fn hash_password(password: &str, cost: u32) -> LedgerResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| LedgerError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| LedgerError::Internal(format!("password hashing failed: {}", e)))
}

/// A malformed stored hash never verifies
pub async fn verify_password(password: &str, stored: &str) -> bool {
    let (password, stored) = (password.to_string(), stored.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Registration, login and token checks over the `auth_users` table
pub struct AuthService {
    store: Arc<LedgerStore>,
    keys: JwtKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<LedgerStore>, keys: JwtKeys, bcrypt_cost: u32) -> Self {
        Self {
            store,
            keys,
            bcrypt_cost,
        }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Store credentials and return a token for the new user
    pub async fn register(&self, username: &str, email: &str, password: &str) -> LedgerResult<String> {
        let username = normalize_username(username)?;
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(LedgerError::invalid("email must be a valid address"));
        }
        if password.is_empty() {
            return Err(LedgerError::invalid("password must not be empty"));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(LedgerError::invalid(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        let credential = Credential {
            id: CredentialId::new(),
            username,
            email: email.to_string(),
            password_hash: hash_password(password, self.bcrypt_cost).await?,
        };
        match self.store.insert_credential(&credential).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => {
                return Err(LedgerError::DuplicateUser {
                    username: credential.username,
                });
            }
            Err(err) => return Err(err.into()),
        }

        info!(username = %credential.username, "User registered");
        self.keys.issue_token(&credential.username)
    }

    pub async fn verify_credentials(&self, username: &str, password: &str) -> LedgerResult<Option<Credential>> {
        let username = normalize_username(username)?;
        match self.store.find_credential(&username).await? {
            Some(credential) if verify_password(password, &credential.password_hash).await => {
                Ok(Some(credential))
            }
            _ => Ok(None),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> LedgerResult<String> {
        match self.verify_credentials(username, password).await? {
            Some(credential) => self.keys.issue_token(&credential.username),
            None => {
                warn!(username = %username.trim(), "Login rejected");
                Err(LedgerError::Unauthorized(
                    "invalid username or password".to_string(),
                ))
            }
        }
    }

    pub fn validate_token(&self, token: &str) -> LedgerResult<String> {
        self.keys.validate_token(token)
    }
}

/// Caller identity taken from a valid bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl AuthenticatedUser {
    /// Reject requests that act on another user's data
    pub fn ensure_owner(&self, username: &str) -> Result<(), AppError> {
        if same_username(&self.username, username.trim()) {
            Ok(())
        } else {
            Err(AppError::unauthorized("Cannot act on behalf of another user"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing authentication credentials"))?;
        let header = header
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid header string"))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Expected a Bearer token"))?;

        let username = state.auth.validate_token(token)?;
        Ok(AuthenticatedUser { username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the tests fast
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_password_round_trip() {
        let stored = hash_password("hunter2", TEST_COST).await.unwrap();
        assert!(stored.starts_with("$2"));
        assert!(verify_password("hunter2", &stored).await);
        assert!(!verify_password("hunter3", &stored).await);
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let first = hash_password("same", TEST_COST).await.unwrap();
        let second = hash_password("same", TEST_COST).await.unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &first).await);
        assert!(verify_password("same", &second).await);
    }

    #[tokio::test]
    async fn test_hash_records_its_cost() {
        let stored = hash_password("pw", 5).await.unwrap();
        assert_eq!(&stored[4..6], "05");
    }

    #[tokio::test]
    async fn test_invalid_cost_is_internal_error() {
        assert!(matches!(
            hash_password("pw", 99).await,
            Err(LedgerError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", "no-separator").await);
        assert!(!verify_password("x", "zz$zz").await);
        assert!(!verify_password("x", "").await);
    }

    #[test]
    fn test_token_carries_username() {
        let keys = JwtKeys::new(b"test-secret", Duration::from_secs(60));
        let token = keys.issue_token("alice").unwrap();
        assert_eq!(keys.validate_token(&token).unwrap(), "alice");
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let issuer = JwtKeys::new(b"one", Duration::from_secs(60));
        let verifier = JwtKeys::new(b"two", Duration::from_secs(60));
        let token = issuer.issue_token("alice").unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(LedgerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = JwtKeys::new(b"test-secret", Duration::from_secs(60));
        let long_ago = (Utc::now().timestamp() - 3600) as u64;
        let token = keys
            .sign(&Claims {
                sub: "alice".into(),
                iat: long_ago - 60,
                exp: long_ago,
            })
            .unwrap();
        assert!(keys.validate_token(&token).is_err());
        assert!(keys.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_owner_check_ignores_case() {
        let user = AuthenticatedUser {
            username: "Alice".into(),
        };
        assert!(user.ensure_owner("alice").is_ok());
        assert!(user.ensure_owner("bob").is_err());
    }
}
