//! Loan application lifecycle
//!
//! The finite-state machine governing a loan application from submission to
//! closure. Legality of a transition is one table lookup keyed by
//! `(current status, action)`; the role gate is a second, separate check
//! against the allow-list carried by the matched rule. Handlers consult
//! [`crate::policy`] before this module is ever reached, so a request that
//! gets here has already passed route-level authorization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Role;

/// Application status. `Rejected` and `Completed` are terminal.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Disbursed,
    Completed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Disbursed => "disbursed",
            ApplicationStatus::Completed => "completed",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Completed)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review actions a principal can request against an application.
/// `Submit` creates the record and is handled by the loan service directly;
/// the remaining actions move an existing application through the table below.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoanAction {
    Submit,
    Verify,
    Approve,
    Reject,
    Disburse,
    Complete,
}

impl LoanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanAction::Submit => "submit",
            LoanAction::Verify => "verify",
            LoanAction::Approve => "approve",
            LoanAction::Reject => "reject",
            LoanAction::Disburse => "disburse",
            LoanAction::Complete => "complete",
        }
    }
}

impl std::fmt::Display for LoanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub next: ApplicationStatus,
    pub allowed_roles: &'static [Role],
    pub requires_reason: bool,
}

/// The complete transition table. Verification is a two-tier gate: a
/// verifier only moves `pending` applications, while final approval (and
/// everything after it) is reserved for admins. Admin is a superset role for
/// the earlier tier, never the other way around.
const TRANSITIONS: &[(ApplicationStatus, LoanAction, TransitionRule)] = &[
    (
        ApplicationStatus::Pending,
        LoanAction::Verify,
        TransitionRule {
            next: ApplicationStatus::UnderReview,
            allowed_roles: &[Role::Verifier, Role::Admin],
            requires_reason: false,
        },
    ),
    (
        ApplicationStatus::Pending,
        LoanAction::Reject,
        TransitionRule {
            next: ApplicationStatus::Rejected,
            allowed_roles: &[Role::Verifier, Role::Admin],
            requires_reason: true,
        },
    ),
    (
        ApplicationStatus::UnderReview,
        LoanAction::Approve,
        TransitionRule {
            next: ApplicationStatus::Approved,
            allowed_roles: &[Role::Admin],
            requires_reason: false,
        },
    ),
    (
        ApplicationStatus::UnderReview,
        LoanAction::Reject,
        TransitionRule {
            next: ApplicationStatus::Rejected,
            allowed_roles: &[Role::Admin],
            requires_reason: true,
        },
    ),
    (
        ApplicationStatus::Approved,
        LoanAction::Disburse,
        TransitionRule {
            next: ApplicationStatus::Disbursed,
            allowed_roles: &[Role::Admin],
            requires_reason: false,
        },
    ),
    (
        ApplicationStatus::Disbursed,
        LoanAction::Complete,
        TransitionRule {
            next: ApplicationStatus::Completed,
            allowed_roles: &[Role::Admin],
            requires_reason: false,
        },
    ),
];

/// Look up the rule for `(current, action)`, if the transition is legal.
pub fn transition_rule(
    current: ApplicationStatus,
    action: LoanAction,
) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|(from, a, _)| *from == current && *a == action)
        .map(|(_, _, rule)| rule)
}

/// Lifecycle errors. Each variant maps to a distinct API error class so
/// callers can tell "this can never work from here" from "you lack the role"
/// from "your input is incomplete".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("application in state '{current}' does not support '{action}'")]
    InvalidState {
        current: ApplicationStatus,
        action: LoanAction,
    },

    #[error("role '{role}' may not perform '{action}'")]
    Forbidden { role: Role, action: LoanAction },

    #[error("a non-empty rejection reason is required")]
    MissingReason,
}

/// Decide the outcome of applying `action` to an application in `current`
/// state as `role`. Pure: the caller persists the returned status (stamping
/// `updated_at` and `last_action_by`) or surfaces the error unchanged.
///
/// Checks run in a fixed order: state legality, then role, then required
/// input. Re-invoking an already-applied transition therefore fails as
/// `InvalidState`, never silently succeeds.
pub fn apply(
    current: ApplicationStatus,
    action: LoanAction,
    role: Role,
    rejection_reason: Option<&str>,
) -> Result<ApplicationStatus, LifecycleError> {
    let rule = transition_rule(current, action)
        .ok_or(LifecycleError::InvalidState { current, action })?;

    if !rule.allowed_roles.contains(&role) {
        return Err(LifecycleError::Forbidden { role, action });
    }

    if rule.requires_reason {
        match rejection_reason {
            Some(reason) if !reason.trim().is_empty() => {}
            _ => return Err(LifecycleError::MissingReason),
        }
    }

    Ok(rule.next)
}
