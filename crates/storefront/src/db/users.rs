//! User repository for database operations.

use sqlx::PgPool;

use kedai_core::UserId;

use super::RepositoryError;
use crate::models::{NewUser, User, UserChanges};

const USERNAME_OR_EMAIL_TAKEN: &str = "username or email already exists";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, email, role, created_at
            FROM kedai.users
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, email, role, created_at
            FROM kedai.users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, email, role, created_at
            FROM kedai.users
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO kedai.users (username, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, role, created_at
            ",
        )
        .bind(user.username())
        .bind(user.email())
        .bind(user.role())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, USERNAME_OR_EMAIL_TAKEN))
    }

    /// Apply a partial update. Absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE kedai.users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role)
            WHERE id = $1
            RETURNING id, username, email, role, created_at
            ",
        )
        .bind(id)
        .bind(changes.username())
        .bind(changes.email())
        .bind(changes.role())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, USERNAME_OR_EMAIL_TAKEN))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Number of users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kedai.users")
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}
