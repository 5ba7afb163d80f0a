//! Loan application route definitions

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/loans",
            get(handlers::list_applications).post(handlers::submit_application),
        )
        .route("/api/loans/user", get(handlers::own_applications))
        .route("/api/loans/dashboard/stats", get(handlers::dashboard_stats))
        .route("/api/loans/:id", get(handlers::get_application))
        .route("/api/loans/:id/verify", put(handlers::verify_application))
        .route("/api/loans/:id/approve", put(handlers::approve_application))
        .route("/api/loans/:id/disburse", put(handlers::disburse_application))
        .route("/api/loans/:id/complete", put(handlers::complete_application))
}
