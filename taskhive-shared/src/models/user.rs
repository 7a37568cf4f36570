//! User model and database operations.
//!
//! Users own projects and appear in other projects' collaborator sets.
//! Passwords are stored as Argon2id hashes, never in plaintext. A single
//! `one_time_token` slot backs both the email confirmation and password
//! reset flows; consuming a token always clears the slot so it cannot be
//! replayed.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name TEXT NOT NULL,
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     confirmed BOOLEAN NOT NULL DEFAULT FALSE,
//!     one_time_token TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskhive_shared::models::user::{User, CreateUser};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let new_user = CreateUser {
//!     name: "John Doe".to_string(),
//!     email: "user@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     one_time_token: "a1b2c3...".to_string(),
//! };
//!
//! let user = User::create(&pool, new_user).await?;
//! println!("Created user: {}", user.id);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing an account
///
/// Secret material (`password_hash`, `one_time_token`) is excluded from
/// serialization; responses expose a [`UserProfile`] instead.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    ///
    /// Must be unique across all users
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the email address has been confirmed
    ///
    /// Accounts cannot log in until confirmed
    pub confirmed: bool,

    /// Outstanding one-time token, if any
    ///
    /// Used for email confirmation and password reset, cleared when consumed
    #[serde(skip_serializing)]
    pub one_time_token: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to embed in responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Confirmation token to store alongside the new account
    pub one_time_token: String,
}

impl User {
    /// Creates a new unconfirmed user.
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, one_time_token)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, confirmed, one_time_token,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.one_time_token)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, confirmed, one_time_token,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, confirmed, one_time_token,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Confirms the account holding the given one-time token.
    ///
    /// Consumption is a single UPDATE so a token can never confirm two
    /// requests racing on it: the first one wins, the second sees no row.
    ///
    /// # Returns
    ///
    /// The confirmed user, or None if no account holds this token
    pub async fn confirm_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET confirmed = TRUE, one_time_token = NULL, updated_at = NOW()
            WHERE one_time_token = $1
            RETURNING id, name, email, password_hash, confirmed, one_time_token,
                      created_at, updated_at
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Stores a fresh one-time token on the user, replacing any previous one
    pub async fn set_one_time_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET one_time_token = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether some account holds the given one-time token
    pub async fn token_exists(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE one_time_token = $1)")
                .bind(token)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }

    /// Sets a new password for the account holding the given token.
    ///
    /// Atomic like [`User::confirm_by_token`]: the token is consumed in the
    /// same statement that writes the new hash.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no account holds this token
    pub async fn reset_password_by_token(
        pool: &PgPool,
        token: &str,
        new_password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, one_time_token = NULL, updated_at = NOW()
            WHERE one_time_token = $1
            RETURNING id, name, email, password_hash, confirmed, one_time_token,
                      created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(new_password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Fetches public profiles for a list of user IDs, preserving the
    /// order of `ids`.
    pub async fn profiles_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE id = ANY($1)
            ORDER BY array_position($1, id)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Gets the public view of this user
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$salt$hash".to_string(),
            confirmed: false,
            one_time_token: Some("abc123".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_drops_secret_fields() {
        let user = sample_user();
        let profile = user.profile();

        assert_eq!(profile.id, user.id);
        assert_eq!(profile.name, "Test User");
        assert_eq!(profile.email, "test@example.com");
    }

    #[test]
    fn test_user_serialization_omits_secrets() {
        let user = sample_user();
        let json = serde_json::to_value(&user).expect("Should serialize");

        assert!(json.get("password_hash").is_none());
        assert!(json.get("one_time_token").is_none());
        assert_eq!(json["email"], "test@example.com");
    }

    // Integration tests for database operations are in tests/ of the API crate
}
