//! Loan application models and request/response DTOs

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::lifecycle::{ApplicationStatus, LoanAction};

pub mod service;
pub use service::{LoanError, LoanService};

/// Borrower employment status captured at submission time
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "employment_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    Employed,
    SelfEmployed,
    Unemployed,
    Student,
    Retired,
}

/// Loan application record. Never deleted: rejected and completed
/// applications stay on file for audit.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: Uuid,
    pub borrower_id: Uuid,
    pub full_name: String,
    /// Currency-agnostic integer units; minimum 1000.
    pub loan_amount: i64,
    /// Months, within [6, 60].
    pub loan_tenure_months: i32,
    pub loan_reason: String,
    pub employment_status: EmploymentStatus,
    pub employment_address: String,
    pub status: ApplicationStatus,
    /// Present only when the application was rejected.
    pub rejection_reason: Option<String>,
    /// The verifier/admin who performed the most recent transition.
    pub last_action_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reject values that are empty once trimmed; `length(min = 1)` would let
/// whitespace-only input through.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("value must not be empty or whitespace".into());
        return Err(err);
    }
    Ok(())
}

/// Submission request. Out-of-range values are rejected outright, never
/// clamped to the minimum.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLoanRequest {
    #[validate(custom = "not_blank")]
    pub full_name: String,
    #[validate(range(min = 1000, message = "loan amount must be at least 1000"))]
    pub loan_amount: i64,
    #[validate(range(min = 6, max = 60, message = "loan tenure must be between 6 and 60 months"))]
    pub loan_tenure_months: i32,
    #[validate(custom = "not_blank")]
    pub loan_reason: String,
    pub employment_status: EmploymentStatus,
    #[validate(custom = "not_blank")]
    pub employment_address: String,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

/// Request body for the review endpoints (`verify`/`approve` tiers)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub action: LoanAction,
    pub rejection_reason: Option<String>,
}

/// Sort key for the applications table
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Date,
    Amount,
    Status,
}

impl SortBy {
    /// Column backing each sort key.
    pub fn column(&self) -> &'static str {
        match self {
            SortBy::Date => "created_at",
            SortBy::Amount => "loan_amount",
            SortBy::Status => "status",
        }
    }
}

/// Sort direction
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query for listing loan applications
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLoansQuery {
    pub status: Option<ApplicationStatus>,
    pub sort_by: Option<SortBy>,
    pub order: Option<SortOrder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Role-scoped dashboard aggregates. Snapshot reads, eventually consistent
/// with in-flight transitions.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applications: i64,
    pub pending: i64,
    pub under_review: i64,
    pub approved: i64,
    pub rejected: i64,
    pub disbursed: i64,
    pub completed: i64,
    pub borrowers: i64,
    pub cash_disbursed: i64,
    pub cash_received: i64,
}
