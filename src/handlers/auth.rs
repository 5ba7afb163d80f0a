//! Authentication API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthError;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthenticatedUser;
use crate::models::{
    AuthTokensResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse,
};
use crate::policy::Resource;
use crate::state::AppState;

use super::authorize;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AlreadyRegistered => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidRefreshToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::HasApplications => ApiError::Conflict(err.to_string()),
            AuthError::DatabaseError(msg) => ApiError::DatabaseError(msg),
            AuthError::HashingFailed(msg) | AuthError::TokenError(msg) => {
                ApiError::InternalError(msg)
            }
        }
    }
}

/// Register a new account
pub async fn register(
    State(app_state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    request.validate()?;
    let tokens = app_state.auth_service.register(request).await?;
    Ok(Json(tokens))
}

/// Log in with email and password
pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    request.validate()?;
    let tokens = app_state.auth_service.login(request).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    State(app_state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokensResponse>> {
    let tokens = app_state.auth_service.refresh(&request.refresh_token).await?;
    Ok(Json(tokens))
}

/// Current principal's profile
pub async fn profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let record = app_state.auth_service.get_user(&user.user_id).await?;
    Ok(Json(record.into()))
}

/// Delete a user account. Admin directory; principals referenced by loan
/// applications cannot be removed.
pub async fn delete_user(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    authorize(Some(user.role), Resource::UserDirectory)?;

    if id == user.user_id {
        return Err(ApiError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }

    app_state.auth_service.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all users. Admin directory.
pub async fn list_users(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    authorize(Some(user.role), Resource::UserDirectory)?;
    let users = app_state.auth_service.list_users().await?;
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            ApiError::from(AuthError::HasApplications).error_code(),
            "CONFLICT"
        );
        assert_eq!(
            ApiError::from(AuthError::UserNotFound).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApiError::from(AuthError::AlreadyRegistered).error_code(),
            "CONFLICT"
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).error_code(),
            "UNAUTHORIZED"
        );
    }
}
