//! Auth Service Library
//!
//! An authentication and session-lifecycle microservice providing user
//! registration, rate-limited login, JWT session tokens with blacklist
//! revocation, role-based authorization and password reset.
//!
//! # Features
//!
//! - **Credential Security**: bcrypt hashing with configurable cost factors
//! - **Stateless Sessions**: signed JWT session tokens; only revocations
//!   are persisted (token blacklist)
//! - **Login Throttling**: fixed-window rate limiting keyed by email,
//!   backed by a shared atomic counter store
//! - **Role-Based Authorization**: closed user/admin role set with
//!   admin-gated directory operations
//! - **Password Reset**: short-lived reset tokens in a signing context
//!   distinct from session tokens
//! - **Pluggable Storage**: PostgreSQL via SQLx in production, in-memory
//!   stores for tests and single-node development
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use auth_service::{
//!     api::{create_routes, AppState},
//!     service::{AuthService, TokenService},
//!     store::{InMemoryBlacklist, InMemoryCounterStore, InMemoryUserStore},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth_service = AuthService::new(
//!         Arc::new(InMemoryUserStore::new()),
//!         Arc::new(InMemoryBlacklist::new()),
//!         Arc::new(InMemoryCounterStore::new()),
//!         TokenService::new("signing-secret".to_string()),
//!     );
//!
//!     let app = create_routes(AppState {
//!         auth_service: Arc::new(auth_service),
//!     });
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:50051").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: HTTP handlers, authentication middleware and
//!   configurable routing
//! - **Service Layer**: auth orchestration, token codec, rate limiter
//! - **Store Layer**: trait seams for the user directory, token blacklist
//!   and counter store, with Postgres and in-memory backends
//! - **Models**: user entities, token claims, request/response types
//! - **Utils**: error taxonomy, password hashing, input validation

/// HTTP API layer with handlers, middleware and routing
pub mod api;

/// Configuration management
pub mod config;

/// Database connection management
pub mod database;

/// Data models and request/response structures
pub mod models;

/// Business logic services
pub mod service;

/// Storage trait seams and backends
pub mod store;

/// Shared utilities for security, validation and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use models::{
    auth::{AuthIdentity, TokenClaims, TokenPurpose},
    requests::{
        AddRoleRequest, ListUsersQuery, ListUsersResponse, LoginRequest, LoginResponse,
        PasswordResetTokenResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
        SuccessResponse, UpdateProfileRequest,
    },
    user::{Role, User, UserFilter, UserRecord},
};
pub use service::{AuthService, LoginRatePolicy, RateLimiter, TokenService};
pub use store::{CounterStore, NewUser, TokenBlacklist, UserStore};
pub use utils::error::{AuthError, AuthResult, ErrorResponse, StoreError, StoreResult};

// Re-export database utilities for configuration
pub use database::{DatabaseConfig, DatabasePool};

// Re-export configuration system
pub use config::{AppConfig, AuthConfig, ServerConfig};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
