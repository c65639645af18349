//! Auth Service Server
//!
//! Binary entry point wiring the PostgreSQL-backed stores into the auth
//! service and serving the full HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth_service::{
    api::{create_routes, AppState},
    config::AppConfig,
    database::DatabaseConfig,
    service::{AuthService, LoginRatePolicy, TokenService},
    store::{PostgresBlacklist, PostgresCounterStore, PostgresUserStore, TokenBlacklist},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    env_logger::init();

    log::info!("Starting auth service v{}", auth_service::VERSION);

    let config = AppConfig::from_env()?;
    config.validate()?;

    log::info!("Configuration loaded and validated");

    let db_config = DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        connect_timeout: Duration::from_secs(config.database.connect_timeout_seconds),
        idle_timeout: Duration::from_secs(config.database.idle_timeout_seconds),
        max_lifetime: Duration::from_secs(config.database.max_lifetime_seconds),
    };
    let pool = db_config.create_pool().await?;

    log::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database migrations completed");

    let tokens = TokenService::with_session_ttl(
        config.auth.jwt_secret.clone(),
        ChronoDuration::hours(config.auth.session_ttl_hours),
    );
    let auth_service = AuthService::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresBlacklist::new(pool.clone())),
        Arc::new(PostgresCounterStore::new(pool.clone())),
        tokens,
    )
    .with_login_policy(LoginRatePolicy::new(
        config.auth.login_max_attempts,
        config.auth.login_window_secs,
    ))
    .with_bcrypt_cost(config.auth.bcrypt_cost);

    log::info!("Auth service initialized");
    log::info!(
        "  - login throttling: {} attempts per {}s",
        config.auth.login_max_attempts,
        config.auth.login_window_secs
    );
    log::info!("  - session TTL: {}h", config.auth.session_ttl_hours);

    // Hourly reaper bounds blacklist growth; entries past expiry are dead
    // weight since verification AND-checks expiry anyway.
    let reaper = PostgresBlacklist::new(pool.clone());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match reaper.purge_expired().await {
                Ok(reaped) if reaped > 0 => {
                    log::info!("reaped {reaped} expired blacklist entries");
                }
                Ok(_) => {}
                Err(e) => log::warn!("blacklist reaper failed: {e}"),
            }
        }
    });

    let app_state = AppState {
        auth_service: Arc::new(auth_service),
    };

    let app = create_routes(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .into_inner(),
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("Listening on {bind_addr}");
    log::info!("Endpoints:");
    log::info!("  GET    /health");
    log::info!("  POST   /auth/register");
    log::info!("  POST   /auth/login");
    log::info!("  POST   /auth/logout");
    log::info!("  POST   /auth/password-reset/token");
    log::info!("  POST   /auth/password-reset");
    log::info!("  GET    /users            (admin)");
    log::info!("  GET    /users/:id");
    log::info!("  PUT    /users/:id/role   (admin)");
    log::info!("  PUT    /profile");
    log::info!("  DELETE /profile");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
