//! Route Access Policy Tests
//!
//! These tests validate the access decision table from the outside: who may
//! reach which screen or transition, and where a denied principal is sent.

use creditsea_server::lifecycle::LoanAction;
use creditsea_server::models::Role;
use creditsea_server::policy::{decide, role_home, Decision, Redirect, Resource};

const ALL_ACTORS: &[Option<Role>] = &[
    None,
    Some(Role::Borrower),
    Some(Role::Verifier),
    Some(Role::Admin),
];

const ALL_RESOURCES: &[Resource] = &[
    Resource::Login,
    Resource::Register,
    Resource::BorrowerHome,
    Resource::Dashboard,
    Resource::Borrowers,
    Resource::Loans,
    Resource::Repayments,
    Resource::Collateral,
    Resource::LoanParameters,
    Resource::Accounting,
    Resource::Reports,
    Resource::AccessConfig,
    Resource::Savings,
    Resource::OtherIncomes,
    Resource::Payroll,
    Resource::Expenses,
    Resource::ESignature,
    Resource::InvestorAccounts,
    Resource::Calendar,
    Resource::Settings,
    Resource::UserDirectory,
    Resource::Transition(LoanAction::Submit),
    Resource::Transition(LoanAction::Verify),
    Resource::Transition(LoanAction::Approve),
    Resource::Transition(LoanAction::Reject),
    Resource::Transition(LoanAction::Disburse),
    Resource::Transition(LoanAction::Complete),
];

// ============================================================================
// Public and Authenticated Routes
// ============================================================================

#[test]
fn test_public_routes_open_to_everyone() {
    for actor in ALL_ACTORS {
        assert_eq!(decide(*actor, Resource::Login), Decision::Allow);
        assert_eq!(decide(*actor, Resource::Register), Decision::Allow);
    }
}

#[test]
fn test_unauthenticated_redirects_to_login_with_next() {
    assert_eq!(
        decide(None, Resource::Loans),
        Decision::Deny {
            redirect: Redirect::Login {
                next: Resource::Loans
            }
        }
    );
    assert_eq!(
        decide(None, Resource::Reports),
        Decision::Deny {
            redirect: Redirect::Login {
                next: Resource::Reports
            }
        }
    );
}

#[test]
fn test_any_authenticated_role_reaches_shared_screens() {
    let shared = [
        Resource::Borrowers,
        Resource::Loans,
        Resource::Repayments,
        Resource::Collateral,
    ];
    for role in [Role::Borrower, Role::Verifier, Role::Admin] {
        for resource in shared {
            assert_eq!(decide(Some(role), resource), Decision::Allow);
        }
    }
}

// ============================================================================
// Role Restrictions and Deny Redirects
// ============================================================================

#[test]
fn test_borrower_denied_staff_screens_goes_home() {
    for resource in [
        Resource::Accounting,
        Resource::Reports,
        Resource::Payroll,
        Resource::Settings,
    ] {
        assert_eq!(
            decide(Some(Role::Borrower), resource),
            Decision::Deny {
                redirect: Redirect::RoleHome {
                    home: Resource::BorrowerHome
                }
            }
        );
    }
}

#[test]
fn test_verifier_denied_user_directory() {
    assert_eq!(
        decide(Some(Role::Verifier), Resource::UserDirectory),
        Decision::Deny {
            redirect: Redirect::RoleHome {
                home: Resource::Dashboard
            }
        }
    );
    assert_eq!(
        decide(Some(Role::Admin), Resource::UserDirectory),
        Decision::Allow
    );
}

#[test]
fn test_role_homes_never_redirect_to_themselves() {
    for role in [Role::Borrower, Role::Verifier, Role::Admin] {
        let home = role_home(role);
        assert!(
            decide(Some(role), home).is_allow(),
            "{role} must reach its own home"
        );
    }
}

// ============================================================================
// Transition Gates
// ============================================================================

#[test]
fn test_submit_is_borrower_only() {
    assert!(decide(Some(Role::Borrower), Resource::Transition(LoanAction::Submit)).is_allow());
    assert!(!decide(Some(Role::Verifier), Resource::Transition(LoanAction::Submit)).is_allow());
    assert!(!decide(Some(Role::Admin), Resource::Transition(LoanAction::Submit)).is_allow());
}

#[test]
fn test_verify_is_staff_only() {
    assert!(!decide(Some(Role::Borrower), Resource::Transition(LoanAction::Verify)).is_allow());
    assert!(decide(Some(Role::Verifier), Resource::Transition(LoanAction::Verify)).is_allow());
    assert!(decide(Some(Role::Admin), Resource::Transition(LoanAction::Verify)).is_allow());
}

#[test]
fn test_approve_disburse_complete_are_admin_only() {
    for action in [LoanAction::Approve, LoanAction::Disburse, LoanAction::Complete] {
        assert!(!decide(Some(Role::Borrower), Resource::Transition(action)).is_allow());
        assert!(!decide(Some(Role::Verifier), Resource::Transition(action)).is_allow());
        assert!(decide(Some(Role::Admin), Resource::Transition(action)).is_allow());
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_decisions_are_deterministic() {
    for actor in ALL_ACTORS {
        for resource in ALL_RESOURCES {
            let first = decide(*actor, *resource);
            let second = decide(*actor, *resource);
            assert_eq!(first, second, "{actor:?} on {resource:?} must be stable");
        }
    }
}

#[test]
fn test_every_resource_has_a_redirect_path() {
    for resource in ALL_RESOURCES {
        assert!(resource.path().starts_with('/'));
    }
}
