//! Loan application API handlers
//!
//! The review endpoints mirror the two-tier client API: `/verify` for the
//! verifier tier (pending applications) and `/approve` for the admin tier
//! (under-review applications), plus admin-only disbursement and closure.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::lifecycle::LoanAction;
use crate::loans::{
    DashboardStats, ListLoansQuery, LoanApplication, SubmitLoanRequest, TransitionRequest,
};
use crate::middleware::AuthenticatedUser;
use crate::models::PaginatedResponse;
use crate::policy::Resource;
use crate::state::AppState;

use super::authorize;

/// Submit a new loan application (borrower only)
pub async fn submit_application(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SubmitLoanRequest>,
) -> ApiResult<Json<LoanApplication>> {
    authorize(Some(user.role), Resource::Transition(LoanAction::Submit))?;

    let application = app_state
        .loan_service
        .submit_application(user.user_id, request)
        .await?;

    Ok(Json(application))
}

/// List loan applications, scoped by role
pub async fn list_applications(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListLoansQuery>,
) -> ApiResult<Json<PaginatedResponse<LoanApplication>>> {
    authorize(Some(user.role), Resource::Loans)?;

    let page = app_state
        .loan_service
        .list_applications(user.user_id, user.role, query)
        .await?;

    Ok(Json(page))
}

/// List the calling borrower's own applications
pub async fn own_applications(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<LoanApplication>>> {
    authorize(Some(user.role), Resource::BorrowerHome)?;

    let applications = app_state
        .loan_service
        .list_own_applications(user.user_id)
        .await?;

    Ok(Json(applications))
}

/// Get a single application by ID
pub async fn get_application(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanApplication>> {
    authorize(Some(user.role), Resource::Loans)?;

    let application = app_state
        .loan_service
        .get_application(&id, user.user_id, user.role)
        .await?;

    Ok(Json(application))
}

/// Verifier tier: move a pending application forward or reject it
pub async fn verify_application(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> ApiResult<Json<LoanApplication>> {
    if !matches!(request.action, LoanAction::Verify | LoanAction::Reject) {
        return Err(ApiError::BadRequest(format!(
            "action '{}' is not valid for the verify endpoint",
            request.action
        )));
    }

    run_transition(&app_state, &user, &id, request).await
}

/// Admin tier: approve or reject an application under review
pub async fn approve_application(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> ApiResult<Json<LoanApplication>> {
    if !matches!(request.action, LoanAction::Approve | LoanAction::Reject) {
        return Err(ApiError::BadRequest(format!(
            "action '{}' is not valid for the approve endpoint",
            request.action
        )));
    }

    run_transition(&app_state, &user, &id, request).await
}

/// Release funds for an approved application
pub async fn disburse_application(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanApplication>> {
    let request = TransitionRequest {
        action: LoanAction::Disburse,
        rejection_reason: None,
    };
    run_transition(&app_state, &user, &id, request).await
}

/// Close out a disbursed application
pub async fn complete_application(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LoanApplication>> {
    let request = TransitionRequest {
        action: LoanAction::Complete,
        rejection_reason: None,
    };
    run_transition(&app_state, &user, &id, request).await
}

/// Role-scoped dashboard aggregates
pub async fn dashboard_stats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<DashboardStats>> {
    authorize(Some(user.role), Resource::Dashboard)?;

    let stats = app_state
        .loan_service
        .dashboard_stats(user.user_id, user.role)
        .await?;

    Ok(Json(stats))
}

async fn run_transition(
    app_state: &AppState,
    user: &AuthenticatedUser,
    id: &Uuid,
    request: TransitionRequest,
) -> ApiResult<Json<LoanApplication>> {
    authorize(Some(user.role), Resource::Transition(request.action))?;

    let application = app_state
        .loan_service
        .transition(
            id,
            request.action,
            user.user_id,
            user.role,
            request.rejection_reason.as_deref(),
        )
        .await?;

    Ok(Json(application))
}
