//! # User Repository
//!
//! Back-office accounts. Passwords are stored as argon2 PHC strings and
//! never leave this module in clear or hashed form through the API.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use maguva_core::validation::{validate_email, validate_required};
use maguva_core::User;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::new_id;
use crate::error::{DbError, DbResult};

/// Which flags a new account gets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewUserFlags {
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Repository for back-office accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account with a freshly hashed password.
    ///
    /// ## Errors
    /// - Validation: blank name, malformed email, password under 8 characters
    /// - `UniqueViolation` if the email is taken (case-insensitive)
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        password: &str,
        flags: NewUserFlags,
    ) -> DbResult<User> {
        let email = email.trim().to_lowercase();
        validate_email("email", &email)?;
        validate_required("name", name, 100)?;
        if password.chars().count() < 8 {
            return Err(maguva_core::ValidationError::InvalidFormat {
                field: "password".to_string(),
                reason: "must be at least 8 characters".to_string(),
            }
            .into());
        }

        let user = User {
            id: new_id(),
            email,
            name: name.trim().to_string(),
            password_hash: hash_password(password)?,
            is_staff: flags.is_staff || flags.is_superuser,
            is_superuser: flags.is_superuser,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, is_staff, is_superuser, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &user.email),
            other => other,
        })?;

        info!(user_id = %user.id, role = user.role().as_str(), "User created");
        Ok(user)
    }

    /// Gets a user by id.
    pub async fn get(&self, id: &str) -> DbResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Gets a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Checks an email/password pair.
    ///
    /// Returns `None` for an unknown email, a wrong password or an inactive
    /// account; the caller cannot tell which.
    pub async fn authenticate(&self, email: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!("Login for unknown email");
            return Ok(None);
        };

        if !user.is_active || !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "Login rejected");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Number of accounts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Hashes a password with argon2 and a random salt.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Tests
// =============================================================================
