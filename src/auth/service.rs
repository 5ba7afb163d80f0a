//! Authentication service
//!
//! Registration, credential verification, and token issuance. The rest of
//! the system consumes only "is this principal authenticated, and what is
//! its role" through the claims this service mints.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuthTokensResponse, LoginRequest, RegisterRequest, User, UserResponse};

use super::jwt::{
    generate_access_token, generate_refresh_token, verify_token, JwtError, TokenType,
};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Email or username already registered")]
    AlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("User has loan applications on file and cannot be deleted")]
    HasApplications,
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::DatabaseError(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AuthError::HashingFailed(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        db_pool: PgPool,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            db_pool,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
            bcrypt_cost,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Register a new user with the role chosen at sign-up.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthTokensResponse, AuthError> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE email = $1 OR username = $2",
        )
        .bind(&request.email)
        .bind(&request.username)
        .fetch_one(&self.db_pool)
        .await?;

        if existing > 0 {
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = bcrypt::hash(&request.password, self.bcrypt_cost)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.username)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(request.role)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        self.issue_tokens(user)
    }

    /// Verify credentials and issue tokens.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthTokensResponse, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        self.issue_tokens(user)
    }

    /// Exchange a valid refresh token for a fresh token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokensResponse, AuthError> {
        let claims = verify_token(refresh_token, &self.jwt_secret)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user_id = claims.user_id().map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self.get_user(&user_id).await?;
        self.issue_tokens(user)
    }

    /// Fetch a user by ID.
    pub async fn get_user(&self, id: &Uuid) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// List all registered users, newest first. Admin directory view.
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AuthError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.db_pool)
            .await?;

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Delete a user account. Refuses when the user appears on any loan
    /// application, as borrower or reviewer; those records are never deleted
    /// and must keep their principals resolvable.
    pub async fn delete_user(&self, id: &Uuid) -> Result<(), AuthError> {
        let applications = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loan_applications WHERE borrower_id = $1 OR last_action_by = $1",
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        if applications > 0 {
            return Err(AuthError::HasApplications);
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    fn issue_tokens(&self, user: User) -> Result<AuthTokensResponse, AuthError> {
        let access_token =
            generate_access_token(&user, &self.jwt_secret, self.access_token_ttl_seconds)?;
        let refresh_token =
            generate_refresh_token(&user, &self.jwt_secret, self.refresh_token_ttl_days)?;

        Ok(AuthTokensResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
            user: user.into(),
        })
    }
}
