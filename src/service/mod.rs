//! Service Layer
//!
//! Business logic for authentication, token issuance and rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod token;

// Re-export services
pub use auth::AuthService;
pub use rate_limit::{LoginRatePolicy, RateLimiter};
pub use token::{IssuedToken, SessionContext, TokenService};
