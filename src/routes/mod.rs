//! Route definitions, merged into the app router in `main`

pub mod auth;
pub mod loans;

pub use auth::auth_routes;
pub use loans::loan_routes;
