use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{hash_password, verify_password, TokenAuth};
use crate::error::{Result, ServiceError};
use crate::models::user::User;

/// Credential store: persists user identity and password hashes and
/// issues session tokens through [`TokenAuth`].
#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    auth: TokenAuth,
}

impl UserService {
    pub fn new(pool: SqlitePool, auth: TokenAuth) -> Self {
        Self { pool, auth }
    }

    /// Create a user and issue a session token.
    ///
    /// Duplicate usernames and emails are rejected with a 409 before the
    /// insert; the UNIQUE constraints backstop a concurrent registration.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(User, String)> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "username, email, and password are all required".to_string(),
            ));
        }

        let email_taken = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if email_taken.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let username_taken = sqlx::query("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        if username_taken.is_some() {
            return Err(ServiceError::Conflict(
                "Username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let user = User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: Some(email.to_string()),
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        };

        let token = self.auth.issue_token(&user.username);
        info!("Registered user {} (id {})", user.username, user.id);

        Ok((user, token))
    }

    /// Authenticate by username or email. Unknown identifier and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(ServiceError::Unauthorized(
                "Invalid credentials".to_string(),
            ));
        }

        let token = self.auth.issue_token(&user.username);
        info!("User {} logged in", user.username);

        Ok((user, token))
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE username = ?1 OR email = ?1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
