//! User accounts

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserRow},
};

impl Repository {
    /// Get user by ID
    pub async fn users_get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT id, username, is_admin FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Find user by ID, `None` when the account no longer exists
    pub async fn users_find(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, is_admin FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user row (with password hash) by username
    pub async fn users_get_by_username(&self, username: &str) -> AppResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if a username is taken
    pub async fn users_username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Check if at least one administrator exists
    pub async fn users_admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE is_admin)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// List all users
    pub async fn users_list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, username, is_admin FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Create a user with an already hashed password
    pub async fn users_create(&self, username: &str, hashed_password: &str, is_admin: bool) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, hashed_password, is_admin)
            VALUES ($1, $2, $3)
            RETURNING id, username, is_admin
            "#,
        )
        .bind(username)
        .bind(hashed_password)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Delete a user
    ///
    /// Owned equipment and locations are detached and the user's requests
    /// keep a NULL requester (foreign keys are `ON DELETE SET NULL`).
    pub async fn users_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
