//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, TokenResponse, User, UserClaims},
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Incorrect username or password";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check credentials and issue a bearer token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<TokenResponse> {
        let row = self
            .repository
            .users_get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&row.hashed_password, password) {
            tracing::info!(username, "rejected login");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let user = User::from(row);
        let access_token = self.create_token(&user)?;
        tracing::info!(user_id = user.id, "user logged in");

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Sign a JWT for `user`
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.token_expiration_minutes)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a bearer token signature and expiry
    pub fn decode_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Could not validate credentials".to_string()))
    }

    /// Load the account behind a verified token, `None` if it was deleted
    pub async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        self.repository.users_find(id).await
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users_list().await
    }

    /// Create a user account
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;

        if self.repository.users_username_exists(&data.username).await? {
            return Err(AppError::Conflict("Username already registered".to_string()));
        }

        let hashed = hash_password(&data.password)?;
        let user = self
            .repository
            .users_create(&data.username, &hashed, data.is_admin)
            .await?;
        tracing::info!(user_id = user.id, is_admin = user.is_admin, "user created");
        Ok(user)
    }

    /// Delete a user account; admins cannot delete themselves
    pub async fn delete_user(&self, actor: &User, id: i32) -> AppResult<()> {
        if actor.id == id {
            return Err(AppError::BadRequest("Administrators cannot delete their own account".to_string()));
        }
        self.repository.users_delete(id).await?;
        tracing::info!(user_id = id, deleted_by = actor.id, "user deleted");
        Ok(())
    }

    /// Create the first administrator
    ///
    /// Refused once any administrator exists or when the username is taken.
    pub async fn create_admin(&self, username: &str, password: &str) -> AppResult<User> {
        if self.repository.users_admin_exists().await? {
            return Err(AppError::Conflict("An administrator already exists".to_string()));
        }

        self.create_user(CreateUser {
            username: username.to_string(),
            password: password.to_string(),
            is_admin: true,
        })
        .await
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against an Argon2 hash; malformed hashes never match
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}
