//! Access policy
//!
//! Maps `(role, resource)` to an allow/deny decision before any handler or
//! lifecycle logic runs. Pure and deterministic: no I/O, no state, the same
//! input always yields the same decision. On deny the decision carries where
//! the caller should redirect, so authorization failures are navigation,
//! never raw errors shown to the user.

use serde::Serialize;

use crate::lifecycle::LoanAction;
use crate::models::Role;

/// Everything a principal can ask for: a named screen of the application or
/// a lifecycle transition. Closed enum so the policy table below is total.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    // Entry points
    Login,
    Register,
    // Landing views. Each role home must stay reachable by its own role,
    // otherwise the deny-redirect would loop.
    BorrowerHome,
    Dashboard,
    // Screens open to any authenticated principal
    Borrowers,
    Loans,
    Repayments,
    Collateral,
    // Staff screens
    LoanParameters,
    Accounting,
    Reports,
    AccessConfig,
    Savings,
    OtherIncomes,
    Payroll,
    Expenses,
    ESignature,
    InvestorAccounts,
    Calendar,
    Settings,
    // Admin-only user directory
    UserDirectory,
    // Lifecycle transitions
    Transition(LoanAction),
}

impl Resource {
    /// Client route for this resource, used in deny redirects.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Login => "/login",
            Resource::Register => "/register",
            Resource::BorrowerHome => "/user-dashboard",
            Resource::Dashboard => "/dashboard",
            Resource::Borrowers => "/borrowers",
            Resource::Loans => "/loans",
            Resource::Repayments => "/repayments",
            Resource::Collateral => "/collateral",
            Resource::LoanParameters => "/loan-parameters",
            Resource::Accounting => "/accounting",
            Resource::Reports => "/reports",
            Resource::AccessConfig => "/access-config",
            Resource::Savings => "/savings",
            Resource::OtherIncomes => "/other-incomes",
            Resource::Payroll => "/payroll",
            Resource::Expenses => "/expenses",
            Resource::ESignature => "/e-signature",
            Resource::InvestorAccounts => "/investor-accounts",
            Resource::Calendar => "/calendar",
            Resource::Settings => "/settings",
            Resource::UserDirectory => "/settings",
            // Transitions are invoked from the loans table.
            Resource::Transition(_) => "/loans",
        }
    }
}

/// Access class of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Reachable without a session.
    Public,
    /// Any authenticated role.
    Authenticated,
    /// Explicit allow-list. An empty list fails closed: nobody gets in.
    Restricted(&'static [Role]),
}

const STAFF: &[Role] = &[Role::Verifier, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const BORROWER_ONLY: &[Role] = &[Role::Borrower];

/// The policy table. Total over [`Resource`]: adding a variant without a row
/// here is a compile error, not a runtime hole.
pub fn route_policy(resource: Resource) -> RoutePolicy {
    match resource {
        Resource::Login | Resource::Register => RoutePolicy::Public,

        Resource::BorrowerHome
        | Resource::Dashboard
        | Resource::Borrowers
        | Resource::Loans
        | Resource::Repayments
        | Resource::Collateral => RoutePolicy::Authenticated,

        Resource::LoanParameters
        | Resource::Accounting
        | Resource::Reports
        | Resource::AccessConfig
        | Resource::Savings
        | Resource::OtherIncomes
        | Resource::Payroll
        | Resource::Expenses
        | Resource::ESignature
        | Resource::InvestorAccounts
        | Resource::Calendar
        | Resource::Settings => RoutePolicy::Restricted(STAFF),

        Resource::UserDirectory => RoutePolicy::Restricted(ADMIN_ONLY),

        Resource::Transition(action) => match action {
            LoanAction::Submit => RoutePolicy::Restricted(BORROWER_ONLY),
            LoanAction::Verify | LoanAction::Reject => RoutePolicy::Restricted(STAFF),
            LoanAction::Approve | LoanAction::Disburse | LoanAction::Complete => {
                RoutePolicy::Restricted(ADMIN_ONLY)
            }
        },
    }
}

/// Where a denied principal is sent.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Redirect {
    /// No session: go to login, keeping the requested resource so navigation
    /// can resume afterwards. The captured target is ephemeral per attempt.
    Login { next: Resource },
    /// Authenticated but not allowed: go to the role's landing view.
    RoleHome { home: Resource },
}

/// Policy decision.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum Decision {
    Allow,
    Deny { redirect: Redirect },
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// The default landing view for a role, used as the safe redirect target on
/// authorization failure.
pub fn role_home(role: Role) -> Resource {
    match role {
        Role::Borrower => Resource::BorrowerHome,
        Role::Verifier | Role::Admin => Resource::Dashboard,
    }
}

/// Decide whether `actor` (None = unauthenticated) may reach `resource`.
pub fn decide(actor: Option<Role>, resource: Resource) -> Decision {
    evaluate(route_policy(resource), actor, resource)
}

/// Evaluate one access class for an actor. Split from [`decide`] so the
/// fail-closed behavior can be exercised for allow-lists the policy table
/// never produces.
fn evaluate(policy: RoutePolicy, actor: Option<Role>, resource: Resource) -> Decision {
    match policy {
        RoutePolicy::Public => Decision::Allow,

        RoutePolicy::Authenticated => match actor {
            Some(_) => Decision::Allow,
            None => Decision::Deny {
                redirect: Redirect::Login { next: resource },
            },
        },

        RoutePolicy::Restricted(allowed) => match actor {
            None => Decision::Deny {
                redirect: Redirect::Login { next: resource },
            },
            // contains() on an empty allow-list is false for every role, so a
            // misconfigured resource denies all instead of failing open.
            Some(role) if allowed.contains(&role) => Decision::Allow,
            Some(role) => Decision::Deny {
                redirect: Redirect::RoleHome {
                    home: role_home(role),
                },
            },
        },
    }
}
