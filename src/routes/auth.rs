//! Authentication route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/profile", get(handlers::profile))
        .route("/api/auth/users", get(handlers::list_users))
        .route("/api/auth/users/:id", delete(handlers::delete_user))
}
