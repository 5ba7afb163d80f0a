//! Authentication: JWT issuance/verification and credential management

pub mod jwt;
pub mod service;

pub use jwt::{
    generate_access_token, generate_refresh_token, verify_token, Claims, JwtError, TokenType,
};
pub use service::{AuthError, AuthService};
