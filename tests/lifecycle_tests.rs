//! Loan Lifecycle Tests
//!
//! These tests walk the application state machine end to end: the happy path
//! through disbursement, rejection from both reviewable states, and the
//! ordering of state, role, and reason checks.

use creditsea_server::lifecycle::{apply, ApplicationStatus, LifecycleError, LoanAction};
use creditsea_server::models::Role;

// ============================================================================
// Happy Path
// ============================================================================

#[test]
fn test_full_path_to_completed() {
    let mut status = ApplicationStatus::Pending;

    status = apply(status, LoanAction::Verify, Role::Verifier, None).unwrap();
    assert_eq!(status, ApplicationStatus::UnderReview);

    status = apply(status, LoanAction::Approve, Role::Admin, None).unwrap();
    assert_eq!(status, ApplicationStatus::Approved);

    status = apply(status, LoanAction::Disburse, Role::Admin, None).unwrap();
    assert_eq!(status, ApplicationStatus::Disbursed);

    status = apply(status, LoanAction::Complete, Role::Admin, None).unwrap();
    assert_eq!(status, ApplicationStatus::Completed);
    assert!(status.is_terminal());
}

#[test]
fn test_admin_may_verify_in_place_of_verifier() {
    assert_eq!(
        apply(ApplicationStatus::Pending, LoanAction::Verify, Role::Admin, None),
        Ok(ApplicationStatus::UnderReview)
    );
}

// ============================================================================
// Review Tier Boundaries
// ============================================================================

#[test]
fn test_verifier_may_never_approve() {
    assert_eq!(
        apply(
            ApplicationStatus::UnderReview,
            LoanAction::Approve,
            Role::Verifier,
            None
        ),
        Err(LifecycleError::Forbidden {
            role: Role::Verifier,
            action: LoanAction::Approve
        })
    );
}

#[test]
fn test_borrower_may_not_drive_review() {
    for (status, action) in [
        (ApplicationStatus::Pending, LoanAction::Verify),
        (ApplicationStatus::UnderReview, LoanAction::Approve),
        (ApplicationStatus::Approved, LoanAction::Disburse),
        (ApplicationStatus::Disbursed, LoanAction::Complete),
    ] {
        assert_eq!(
            apply(status, action, Role::Borrower, None),
            Err(LifecycleError::Forbidden {
                role: Role::Borrower,
                action
            })
        );
    }
}

#[test]
fn test_approve_requires_prior_verification() {
    // No skipping straight from pending to approved.
    assert_eq!(
        apply(ApplicationStatus::Pending, LoanAction::Approve, Role::Admin, None),
        Err(LifecycleError::InvalidState {
            current: ApplicationStatus::Pending,
            action: LoanAction::Approve
        })
    );
}

#[test]
fn test_verify_does_not_repeat() {
    assert_eq!(
        apply(
            ApplicationStatus::UnderReview,
            LoanAction::Verify,
            Role::Verifier,
            None
        ),
        Err(LifecycleError::InvalidState {
            current: ApplicationStatus::UnderReview,
            action: LoanAction::Verify
        })
    );
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn test_reject_from_pending_by_either_staff_role() {
    for role in [Role::Verifier, Role::Admin] {
        assert_eq!(
            apply(
                ApplicationStatus::Pending,
                LoanAction::Reject,
                role,
                Some("income below threshold")
            ),
            Ok(ApplicationStatus::Rejected)
        );
    }
}

#[test]
fn test_reject_from_under_review_is_admin_only() {
    assert_eq!(
        apply(
            ApplicationStatus::UnderReview,
            LoanAction::Reject,
            Role::Admin,
            Some("collateral not verifiable")
        ),
        Ok(ApplicationStatus::Rejected)
    );
    assert_eq!(
        apply(
            ApplicationStatus::UnderReview,
            LoanAction::Reject,
            Role::Verifier,
            Some("collateral not verifiable")
        ),
        Err(LifecycleError::Forbidden {
            role: Role::Verifier,
            action: LoanAction::Reject
        })
    );
}

#[test]
fn test_reject_requires_a_nonblank_reason() {
    for reason in [None, Some(""), Some("   ")] {
        assert_eq!(
            apply(ApplicationStatus::Pending, LoanAction::Reject, Role::Admin, reason),
            Err(LifecycleError::MissingReason)
        );
    }
}

// ============================================================================
// Terminal States and Check Ordering
// ============================================================================

#[test]
fn test_terminal_states_accept_no_action() {
    let actions = [
        LoanAction::Verify,
        LoanAction::Approve,
        LoanAction::Reject,
        LoanAction::Disburse,
        LoanAction::Complete,
    ];
    for status in [ApplicationStatus::Rejected, ApplicationStatus::Completed] {
        assert!(status.is_terminal());
        for action in actions {
            assert_eq!(
                apply(status, action, Role::Admin, Some("reason")),
                Err(LifecycleError::InvalidState {
                    current: status,
                    action
                })
            );
        }
    }
}

#[test]
fn test_state_legality_checked_before_role() {
    // A borrower asking for an impossible transition sees the state error,
    // not the role error.
    assert_eq!(
        apply(
            ApplicationStatus::Approved,
            LoanAction::Verify,
            Role::Borrower,
            None
        ),
        Err(LifecycleError::InvalidState {
            current: ApplicationStatus::Approved,
            action: LoanAction::Verify
        })
    );
}

#[test]
fn test_role_checked_before_reason() {
    // A verifier rejecting under review fails on role even with no reason.
    assert_eq!(
        apply(
            ApplicationStatus::UnderReview,
            LoanAction::Reject,
            Role::Verifier,
            None
        ),
        Err(LifecycleError::Forbidden {
            role: Role::Verifier,
            action: LoanAction::Reject
        })
    );
}
