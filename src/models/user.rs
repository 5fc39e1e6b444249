// src/models/user.rs

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tokio::time::timeout;
use validator::Validate;

use crate::{error::AppError, models::QUERY_TIMEOUT};

/// Represents the 'users' table in the database. Users exist to back the
/// authentication gate; they are not players.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);

    Ok(result.is_ok())
}

/// Persistence operations the auth gate needs, nothing more.
#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a user with an already-hashed password. A duplicate username
    /// maps to `Conflict` so registration can answer 409.
    pub async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool);

        match timeout(QUERY_TIMEOUT, query).await? {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
                format!("Username '{}' already exists", username),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn registration_rules_map_to_field_violations() {
        let payload = CreateUserRequest {
            username: "ab".to_string(),
            password: "pw".to_string(),
        };

        let err = payload.validate().map_err(AppError::from).unwrap_err();
        match err {
            AppError::Validation(v) => {
                assert_eq!(
                    v.message("username"),
                    Some("Username length must be between 3 and 50 characters.")
                );
                assert_eq!(
                    v.message("password"),
                    Some("Password length must be between 4 and 128 characters.")
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn auth_payloads_reject_unknown_fields() {
        let err = serde_json::from_value::<CreateUserRequest>(serde_json::json!({
            "username": "alice",
            "password": "password123",
            "bogus": 1,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));

        assert!(
            serde_json::from_value::<LoginRequest>(serde_json::json!({
                "username": "alice",
                "password": "password123",
                "remember": true,
            }))
            .is_err()
        );
    }
}
