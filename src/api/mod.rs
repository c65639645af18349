//! API Layer
//!
//! HTTP endpoints, authentication middleware and route construction for
//! the auth service.

pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use handlers::AppState;
pub use middleware::auth_middleware;
pub use routes::{create_routes, RouterBuilder};
