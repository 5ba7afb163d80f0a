//! API handlers
//!
//! Every protected handler runs the access policy before touching a
//! service; a deny becomes a 401/403 whose body carries the redirect target
//! the client should navigate to.

use crate::error::ApiError;
use crate::models::Role;
use crate::policy::{self, Decision, Redirect, Resource};

pub mod auth;
pub mod loans;

pub use auth::*;
pub use loans::*;

/// Run the access policy for `actor` against `resource`, mapping a deny to
/// the matching API error.
pub fn authorize(actor: Option<Role>, resource: Resource) -> Result<(), ApiError> {
    match policy::decide(actor, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny {
            redirect: Redirect::Login { next },
        } => Err(ApiError::Unauthorized(format!(
            "authentication required; redirect to /login?next={}",
            next.path()
        ))),
        Decision::Deny {
            redirect: Redirect::RoleHome { home },
        } => Err(ApiError::Forbidden(format!(
            "access denied; redirect to {}",
            home.path()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_maps_denials() {
        assert!(authorize(Some(Role::Admin), Resource::UserDirectory).is_ok());

        let err = authorize(None, Resource::Loans).unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");

        let err = authorize(Some(Role::Borrower), Resource::Reports).unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(err.to_string().contains("/user-dashboard"));
    }
}
