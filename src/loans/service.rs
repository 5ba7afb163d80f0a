//! Loan service layer
//!
//! Business logic for the application lifecycle: submission, role-scoped
//! listing, and review transitions. Transitions use optimistic concurrency:
//! the UPDATE is conditioned on the `(status, updated_at)` pair read before
//! the pure lifecycle check, so two reviewers acting on the same stale view
//! cannot both win. Different applications never contend with each other.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::lifecycle::{self, ApplicationStatus, LifecycleError, LoanAction};
use crate::models::{PaginatedResponse, Role};

use super::{DashboardStats, ListLoansQuery, LoanApplication, SortBy, SortOrder, SubmitLoanRequest};

/// Loan service errors
#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Application not found")]
    NotFound,

    #[error("Application was modified concurrently; refetch and retry")]
    Conflict,

    #[error("Only the owning borrower may view this application")]
    NotOwner,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for LoanError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => LoanError::NotFound,
            _ => LoanError::Database(e.to_string()),
        }
    }
}

impl From<LoanError> for ApiError {
    fn from(err: LoanError) -> Self {
        match err {
            LoanError::Database(msg) => ApiError::DatabaseError(msg),
            LoanError::NotFound => ApiError::NotFound("Application not found".to_string()),
            LoanError::Conflict => ApiError::Conflict(
                "Application was modified concurrently; refetch and retry".to_string(),
            ),
            LoanError::NotOwner => {
                ApiError::Forbidden("Only the owning borrower may view this application".to_string())
            }
            LoanError::Lifecycle(e) => e.into(),
            LoanError::Validation(msg) => ApiError::ValidationError(msg),
        }
    }
}

/// Loan service for managing the application lifecycle
#[derive(Clone)]
pub struct LoanService {
    db_pool: PgPool,
}

impl LoanService {
    /// Create a new loan service instance
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Submit a new application. The record starts in `pending`; both
    /// consent flags must be set and out-of-range values are rejected, not
    /// silently clamped.
    pub async fn submit_application(
        &self,
        borrower_id: Uuid,
        request: SubmitLoanRequest,
    ) -> Result<LoanApplication, LoanError> {
        request
            .validate()
            .map_err(|e| LoanError::Validation(e.to_string()))?;

        if !request.terms_accepted || !request.privacy_accepted {
            return Err(LoanError::Validation(
                "both the terms and the privacy policy must be accepted".to_string(),
            ));
        }

        let now = Utc::now();
        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            INSERT INTO loan_applications (
                id, borrower_id, full_name, loan_amount, loan_tenure_months,
                loan_reason, employment_status, employment_address, status,
                rejection_reason, last_action_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, NULL, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(borrower_id)
        .bind(request.full_name.trim())
        .bind(request.loan_amount)
        .bind(request.loan_tenure_months)
        .bind(request.loan_reason.trim())
        .bind(request.employment_status)
        .bind(request.employment_address.trim())
        .bind(ApplicationStatus::Pending)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(
            application_id = %application.id,
            borrower_id = %borrower_id,
            amount = application.loan_amount,
            "Loan application submitted"
        );

        Ok(application)
    }

    /// Get a single application. Borrowers may only read their own records;
    /// staff see everything.
    pub async fn get_application(
        &self,
        id: &Uuid,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<LoanApplication, LoanError> {
        let application =
            sqlx::query_as::<_, LoanApplication>("SELECT * FROM loan_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or(LoanError::NotFound)?;

        if actor_role == Role::Borrower && application.borrower_id != actor_id {
            return Err(LoanError::NotOwner);
        }

        Ok(application)
    }

    /// List applications with filtering, sorting, and pagination. Borrowers
    /// are scoped to their own records.
    pub async fn list_applications(
        &self,
        actor_id: Uuid,
        actor_role: Role,
        query: ListLoansQuery,
    ) -> Result<PaginatedResponse<LoanApplication>, LoanError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;
        let scope_to_owner = actor_role == Role::Borrower;

        let mut count_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT COUNT(*) FROM loan_applications WHERE 1=1");
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT * FROM loan_applications WHERE 1=1");

        for builder in [&mut count_builder, &mut query_builder] {
            if scope_to_owner {
                builder.push(" AND borrower_id = ");
                builder.push_bind(actor_id);
            }
            if let Some(status) = query.status {
                builder.push(" AND status = ");
                builder.push_bind(status);
            }
        }

        let sort_by = query.sort_by.unwrap_or(SortBy::Date);
        let order = query.order.unwrap_or(SortOrder::Desc);
        query_builder.push(format!(" ORDER BY {} {}", sort_by.column(), order.sql()));
        query_builder.push(" LIMIT ");
        query_builder.push_bind(limit);
        query_builder.push(" OFFSET ");
        query_builder.push_bind(offset);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.db_pool)
            .await?;
        let data = query_builder
            .build_query_as::<LoanApplication>()
            .fetch_all(&self.db_pool)
            .await?;

        Ok(PaginatedResponse {
            data,
            total,
            page,
            limit,
        })
    }

    /// List a borrower's own applications, newest first.
    pub async fn list_own_applications(
        &self,
        borrower_id: Uuid,
    ) -> Result<Vec<LoanApplication>, LoanError> {
        let applications = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE borrower_id = $1 ORDER BY created_at DESC",
        )
        .bind(borrower_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(applications)
    }

    /// Apply a review transition to one application.
    ///
    /// Read the current record, run the pure lifecycle check, then write the
    /// new status conditioned on the `(status, updated_at)` that was read.
    /// Zero affected rows means another actor got there first: re-read to
    /// classify the failure as `Conflict` (status moved) or `NotFound`.
    pub async fn transition(
        &self,
        id: &Uuid,
        action: LoanAction,
        actor_id: Uuid,
        actor_role: Role,
        rejection_reason: Option<&str>,
    ) -> Result<LoanApplication, LoanError> {
        let current =
            sqlx::query_as::<_, LoanApplication>("SELECT * FROM loan_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or(LoanError::NotFound)?;

        let next = lifecycle::apply(current.status, action, actor_role, rejection_reason)?;

        let reason = if next == ApplicationStatus::Rejected {
            rejection_reason.map(|r| r.trim().to_string())
        } else {
            None
        };

        let updated = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications
            SET status = $1, rejection_reason = $2, last_action_by = $3, updated_at = $4
            WHERE id = $5 AND status = $6 AND updated_at = $7
            RETURNING *
            "#,
        )
        .bind(next)
        .bind(&reason)
        .bind(actor_id)
        .bind(Utc::now())
        .bind(id)
        .bind(current.status)
        .bind(current.updated_at)
        .fetch_optional(&self.db_pool)
        .await?;

        let updated = match updated {
            Some(app) => app,
            None => {
                // Lost the race. Re-read so the caller learns whether to
                // refetch-and-retry or give up.
                let reread = sqlx::query_scalar::<_, ApplicationStatus>(
                    "SELECT status FROM loan_applications WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;

                return Err(classify_lost_update(reread));
            }
        };

        tracing::info!(
            application_id = %updated.id,
            action = %action,
            from = %current.status,
            to = %updated.status,
            actor_id = %actor_id,
            role = %actor_role,
            "Loan application transitioned"
        );

        Ok(updated)
    }

    /// Dashboard aggregates. Staff see global figures; borrowers see only
    /// their own applications.
    pub async fn dashboard_stats(
        &self,
        actor_id: Uuid,
        actor_role: Role,
    ) -> Result<DashboardStats, LoanError> {
        let scope = if actor_role.is_staff() {
            ""
        } else {
            " WHERE borrower_id = $1"
        };

        let sql = format!(
            r#"
            SELECT
                COUNT(*) AS total_applications,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'under_review') AS under_review,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                COUNT(*) FILTER (WHERE status = 'disbursed') AS disbursed,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(DISTINCT borrower_id) AS borrowers,
                COALESCE(SUM(loan_amount) FILTER (WHERE status IN ('disbursed', 'completed')), 0)::BIGINT AS cash_disbursed,
                COALESCE(SUM(loan_amount) FILTER (WHERE status = 'completed'), 0)::BIGINT AS cash_received
            FROM loan_applications{scope}
            "#
        );

        let mut stats_query = sqlx::query_as::<_, DashboardStats>(&sql);
        if !actor_role.is_staff() {
            stats_query = stats_query.bind(actor_id);
        }

        let stats = stats_query.fetch_one(&self.db_pool).await?;
        Ok(stats)
    }
}

/// Classify a conditional UPDATE that matched zero rows, from the follow-up
/// read: the row still existing means another actor moved it first
/// (`Conflict`, retry after refetch); the row being gone means `NotFound`.
fn classify_lost_update(reread: Option<ApplicationStatus>) -> LoanError {
    match reread {
        Some(_) => LoanError::Conflict,
        None => LoanError::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lost_update_with_surviving_row_is_conflict() {
        // Another reviewer moved the application under us.
        assert!(matches!(
            classify_lost_update(Some(ApplicationStatus::UnderReview)),
            LoanError::Conflict
        ));
        assert!(matches!(
            classify_lost_update(Some(ApplicationStatus::Rejected)),
            LoanError::Conflict
        ));
    }

    #[test]
    fn test_lost_update_with_missing_row_is_not_found() {
        assert!(matches!(classify_lost_update(None), LoanError::NotFound));
    }
}
