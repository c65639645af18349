//! Configuration Module
//!
//! Environment-driven configuration for the auth service: server binding,
//! database pool and authentication parameters.

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable
    pub fn get_required(key: &str) -> Result<String, String> {
        env::var(key).map_err(|_| format!("required environment variable {key} is not set"))
    }
}

/// Application configuration combining all sections
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database pool settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Authentication parameters
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric signing secret for session and reset tokens
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub session_ttl_hours: i64,
    /// Maximum login attempts per window, keyed by email
    pub login_max_attempts: u64,
    /// Login rate-limit window in seconds
    pub login_window_secs: u64,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 50051),
        }
    }
}

impl AppConfig {
    /// Load complete application configuration from the environment
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::default(),
            database: DatabaseSettings {
                url: env::get_required("DATABASE_URL")?,
                max_connections: env::get_u32("DB_MAX_CONNECTIONS", 10),
                min_connections: env::get_u32("DB_MIN_CONNECTIONS", 1),
                connect_timeout_seconds: env::get_u64("DB_CONNECT_TIMEOUT", 10),
                idle_timeout_seconds: env::get_u64("DB_IDLE_TIMEOUT", 600),
                max_lifetime_seconds: env::get_u64("DB_MAX_LIFETIME", 3600),
            },
            auth: AuthConfig {
                jwt_secret: env::get_required("JWT_SECRET")?,
                session_ttl_hours: env::get_i64("SESSION_TTL_HOURS", 24),
                login_max_attempts: env::get_u64("LOGIN_MAX_ATTEMPTS", 5),
                login_window_secs: env::get_u64("LOGIN_WINDOW_SECS", 60),
                bcrypt_cost: env::get_u32("BCRYPT_COST", bcrypt::DEFAULT_COST),
            },
        })
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server port must be greater than 0".to_string());
        }

        if self.database.max_connections == 0 {
            return Err("database max_connections must be greater than 0".to_string());
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(
                "database min_connections cannot be greater than max_connections".to_string(),
            );
        }

        if self.auth.jwt_secret.is_empty() {
            return Err("JWT secret cannot be empty".to_string());
        }
        if self.auth.session_ttl_hours <= 0 {
            return Err("session TTL must be positive".to_string());
        }
        if self.auth.login_max_attempts == 0 || self.auth.login_window_secs == 0 {
            return Err("login rate-limit policy must be non-zero".to_string());
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err("bcrypt cost must be between 4 and 31".to_string());
        }

        Ok(())
    }
}
