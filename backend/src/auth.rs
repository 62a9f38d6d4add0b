use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sqlx::FromRow;
use tracing::info;

use crate::db::DbConnection;
use crate::error::ApiError;
use crate::AppState;

/// The authenticated principal attached to a request. Only its identity is
/// ever consulted; all account visibility is filtered through `id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

/// Persisted identity store plus credential verification.
#[derive(Clone)]
pub struct AuthService {
    db: DbConnection,
}

impl AuthService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Register a new user. Duplicate usernames are rejected.
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthUser, ApiError> {
        let password_hash = hash_password(password)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2) RETURNING id",
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return ApiError::AlreadyExists;
                }
            }
            ApiError::from(e)
        })?;

        info!("registered user {}", username);
        Ok(AuthUser { id, username: username.to_string() })
    }

    /// Verify HTTP Basic credentials against the stored hash.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthUser, ApiError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?1")
                .bind(username)
                .fetch_optional(self.db.pool())
                .await?;

        let Some(user) = row else {
            // Unknown user: burn a hash anyway so response time does not
            // reveal whether the username exists.
            let _ = hash_password("dummy");
            return Err(ApiError::Unauthorized);
        };

        if !verify_password(password, &user.password_hash) {
            return Err(ApiError::Unauthorized);
        }

        Ok(AuthUser { id: user.id, username: user.username })
    }

    /// Whether a username is registered.
    pub async fn user_exists(&self, username: &str) -> Result<bool, ApiError> {
        let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.is_some())
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let encoded = header.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;
        let decoded = BASE64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
        let credentials = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
        let (username, password) = credentials.split_once(':').ok_or(ApiError::Unauthorized)?;

        state.auth.verify_credentials(username, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> AuthService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AuthService::new(db)
    }

    #[tokio::test]
    async fn register_and_verify_roundtrip() {
        let auth = setup_test().await;

        let registered = auth.register("alice", "secret").await.expect("register");
        let verified = auth
            .verify_credentials("alice", "secret")
            .await
            .expect("verify");

        assert_eq!(verified.id, registered.id);
        assert_eq!(verified.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let auth = setup_test().await;

        auth.register("alice", "secret").await.expect("first register");
        let err = auth.register("alice", "other").await.unwrap_err();

        assert!(matches!(err, ApiError::AlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let auth = setup_test().await;

        auth.register("alice", "secret").await.expect("register");
        let err = auth.verify_credentials("alice", "wrong").await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let auth = setup_test().await;

        let err = auth.verify_credentials("nobody", "secret").await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn user_exists_reflects_registration() {
        let auth = setup_test().await;

        assert!(!auth.user_exists("alice").await.expect("lookup"));
        auth.register("alice", "secret").await.expect("register");
        assert!(auth.user_exists("alice").await.expect("lookup"));
    }

    #[test]
    fn password_hashes_are_salted() {
        let first = hash_password("secret").expect("hash");
        let second = hash_password("secret").expect("hash");

        assert_ne!(first, second);
        assert!(verify_password("secret", &first));
        assert!(verify_password("secret", &second));
        assert!(!verify_password("other", &first));
    }
}
