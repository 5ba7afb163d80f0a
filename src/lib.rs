//! CreditSea Backend Library
//!
//! Role-gated loan application review: borrowers submit applications,
//! verifiers and admins move them through the lifecycle. The `policy` and
//! `lifecycle` modules carry the authorization and workflow rules; the rest
//! is the HTTP service around them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod loans;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod state;
