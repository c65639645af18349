//! API Route Definitions
//!
//! Route construction via a builder that separates the unauthenticated
//! surface (register, login, password reset, health) from everything else.
//! All other routes sit behind the authentication middleware, which encodes
//! the interceptor allow-list structurally rather than by method-name
//! matching.

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{self, AppState};
use super::middleware::auth_middleware;

/// Builder for creating API routes with configurable endpoints
#[derive(Default)]
pub struct RouterBuilder {
    /// Health check endpoint (GET /health)
    health_check: bool,
    /// Account registration (POST /auth/register), unauthenticated
    register: bool,
    /// Login (POST /auth/login), unauthenticated
    login: bool,
    /// Logout / token revocation (POST /auth/logout)
    logout: bool,
    /// User lookup (GET /users/{id})
    get_user: bool,
    /// Role assignment (PUT /users/{id}/role), admin only
    add_role: bool,
    /// Directory listing (GET /users), admin only
    list_users: bool,
    /// Profile update (PUT /profile)
    update_profile: bool,
    /// Profile soft-delete (DELETE /profile)
    delete_profile: bool,
    /// Reset-token issuance (POST /auth/password-reset/token)
    password_reset_token: bool,
    /// Password reset completion (POST /auth/password-reset), unauthenticated
    reset_password: bool,
}

impl RouterBuilder {
    /// All routes disabled; enable selectively
    pub fn new() -> Self {
        Self::default()
    }

    /// The full RPC surface
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            register: true,
            login: true,
            logout: true,
            get_user: true,
            add_role: true,
            list_users: true,
            update_profile: true,
            delete_profile: true,
            password_reset_token: true,
            reset_password: true,
        }
    }

    /// Only the unauthenticated surface: health, register, login and
    /// password-reset completion
    pub fn with_public_routes() -> Self {
        Self {
            health_check: true,
            register: true,
            login: true,
            reset_password: true,
            ..Self::default()
        }
    }

    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn register(mut self, enabled: bool) -> Self {
        self.register = enabled;
        self
    }

    pub fn login(mut self, enabled: bool) -> Self {
        self.login = enabled;
        self
    }

    pub fn logout(mut self, enabled: bool) -> Self {
        self.logout = enabled;
        self
    }

    pub fn get_user(mut self, enabled: bool) -> Self {
        self.get_user = enabled;
        self
    }

    pub fn add_role(mut self, enabled: bool) -> Self {
        self.add_role = enabled;
        self
    }

    pub fn list_users(mut self, enabled: bool) -> Self {
        self.list_users = enabled;
        self
    }

    pub fn update_profile(mut self, enabled: bool) -> Self {
        self.update_profile = enabled;
        self
    }

    pub fn delete_profile(mut self, enabled: bool) -> Self {
        self.delete_profile = enabled;
        self
    }

    pub fn password_reset_token(mut self, enabled: bool) -> Self {
        self.password_reset_token = enabled;
        self
    }

    pub fn reset_password(mut self, enabled: bool) -> Self {
        self.reset_password = enabled;
        self
    }

    fn has_protected_routes(&self) -> bool {
        self.logout
            || self.get_user
            || self.add_role
            || self.list_users
            || self.update_profile
            || self.delete_profile
            || self.password_reset_token
    }

    /// Assemble the router. Protected routes get the authentication
    /// middleware; public routes bypass it entirely.
    pub fn build(self, state: AppState) -> Router {
        let mut public = Router::new();
        if self.health_check {
            public = public.route("/health", get(handlers::health_check));
        }
        if self.register {
            public = public.route("/auth/register", post(handlers::register));
        }
        if self.login {
            public = public.route("/auth/login", post(handlers::login));
        }
        if self.reset_password {
            public = public.route("/auth/password-reset", post(handlers::reset_password));
        }

        if !self.has_protected_routes() {
            // route_layer panics on a router without routes
            return public.with_state(state);
        }

        let mut protected = Router::new();
        if self.logout {
            protected = protected.route("/auth/logout", post(handlers::logout));
        }
        if self.get_user {
            protected = protected.route("/users/:id", get(handlers::get_user));
        }
        if self.add_role {
            protected = protected.route("/users/:id/role", put(handlers::add_role));
        }
        if self.list_users {
            protected = protected.route("/users", get(handlers::list_users));
        }
        if self.update_profile {
            protected = protected.route("/profile", put(handlers::update_profile));
        }
        if self.delete_profile {
            protected = protected.route("/profile", delete(handlers::delete_profile));
        }
        if self.password_reset_token {
            protected = protected.route(
                "/auth/password-reset/token",
                post(handlers::generate_password_reset_token),
            );
        }
        let protected =
            protected.route_layer(from_fn_with_state(state.clone(), auth_middleware));

        public.merge(protected).with_state(state)
    }
}

/// Router with the full RPC surface enabled
pub fn create_routes(state: AppState) -> Router {
    RouterBuilder::with_all_routes().build(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{AuthService, LoginRatePolicy, TokenService};
    use crate::store::{InMemoryBlacklist, InMemoryCounterStore, InMemoryUserStore};
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let auth_service = AuthService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryBlacklist::new()),
            Arc::new(InMemoryCounterStore::new()),
            TokenService::new("test_signing_secret".to_string()),
        )
        .with_bcrypt_cost(4)
        .with_login_policy(LoginRatePolicy::default());
        AppState {
            auth_service: Arc::new(auth_service),
        }
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bearer_request(method: Method, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_and_login(app: &Router, email: &str) -> (Value, String) {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"name": "Ann", "email": email, "password": "Passw0rd"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let registered = body_json(response).await;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"email": email, "password": "Passw0rd"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["token"].as_str().unwrap().to_string();

        (registered, token)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = create_routes(test_state());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_register_login_and_lookup_flow() {
        let app = create_routes(test_state());
        let (registered, token) = register_and_login(&app, "ann@example.com").await;

        assert_eq!(registered["email"], "ann@example.com");
        assert_eq!(registered["role"], "user");
        let user_id = registered["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(bearer_request(Method::GET, &format!("/users/{user_id}"), &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Ann");
        assert_eq!(body["email"], "ann@example.com");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_routes(test_state());
        let (registered, _) = register_and_login(&app, "ann@example.com").await;
        let user_id = registered["id"].as_str().unwrap();

        let request = Request::builder()
            .method(Method::GET)
            .uri(format!("/users/{user_id}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_duplicate_conflict() {
        let app = create_routes(test_state());
        register_and_login(&app, "ann@example.com").await;

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"name": "Other", "email": "ann@example.com", "password": "Passw0rd"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_payload() {
        let app = create_routes(test_state());

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"name": "Ann", "email": "not-an-email", "password": "Passw0rd"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_rate_limited_returns_429() {
        let app = create_routes(test_state());
        register_and_login(&app, "ann@example.com").await;

        // register_and_login spent one successful attempt; burn through the
        // rest of the window with bad passwords
        for _ in 0..4 {
            let response = app
                .clone()
                .oneshot(json_request(
                    Method::POST,
                    "/auth/login",
                    json!({"email": "ann@example.com", "password": "WrongPass1"}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"email": "ann@example.com", "password": "Passw0rd"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = create_routes(test_state());
        let (_, token) = register_and_login(&app, "ann@example.com").await;

        let response = app
            .clone()
            .oneshot(bearer_request(Method::POST, "/auth/logout", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The revoked token no longer authenticates
        let response = app
            .oneshot(bearer_request(Method::GET, "/users", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_list_users_forbidden_for_non_admin() {
        let app = create_routes(test_state());
        let (_, token) = register_and_login(&app, "ann@example.com").await;

        let response = app
            .oneshot(bearer_request(Method::GET, "/users", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_add_role_forbidden_for_non_admin() {
        let app = create_routes(test_state());
        let (registered, token) = register_and_login(&app, "ann@example.com").await;
        let user_id = registered["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/users/{user_id}/role"))
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"role": "admin"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_and_delete_profile() {
        let app = create_routes(test_state());
        let (registered, token) = register_and_login(&app, "ann@example.com").await;
        let user_id = registered["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/profile")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"name": "Ann Updated", "email": "ann.new@example.com"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(bearer_request(Method::DELETE, "/profile", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Soft-deleted users are gone from lookups
        let response = app
            .oneshot(bearer_request(Method::GET, &format!("/users/{user_id}"), &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_password_reset_flow_over_http() {
        let app = create_routes(test_state());
        let (_, token) = register_and_login(&app, "ann@example.com").await;

        let response = app
            .clone()
            .oneshot(bearer_request(Method::POST, "/auth/password-reset/token", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let reset_token = body_json(response).await["reset_token"]
            .as_str()
            .unwrap()
            .to_string();

        // Completion endpoint is unauthenticated
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/password-reset",
                json!({"reset_token": reset_token, "new_password": "N3wPassword"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"email": "ann@example.com", "password": "N3wPassword"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_password_bad_token_is_400() {
        let app = create_routes(test_state());

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/password-reset",
                json!({"reset_token": "bogus", "new_password": "N3wPassword"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_public_preset_excludes_protected_routes() {
        let app = RouterBuilder::with_public_routes().build(test_state());

        let response = app
            .oneshot(bearer_request(Method::GET, "/users", "whatever"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
