/// Configuration management for livestream-service
///
/// All settings come from environment variables (a `.env` file is loaded first
/// by `main`). Missing values fall back to development defaults; production
/// refuses insecure defaults.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "livestream-service-dev-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Session token configuration
    pub session: SessionConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 secret used to verify bearer tokens
    pub jwt_secret: String,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("LIVESTREAM_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("LIVESTREAM_SERVICE_PORT", 8080)?,
                workers: parse_env_or_default("HTTP_WORKERS", 4)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/isupipe".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env_or_default("DATABASE_MIN_CONNECTIONS", 1)?,
                acquire_timeout_secs: parse_env_or_default("DATABASE_ACQUIRE_TIMEOUT_SECS", 10)?,
                run_migrations: parse_env_or_default("DATABASE_RUN_MIGRATIONS", true)?,
            },
            session: SessionConfig {
                jwt_secret: match std::env::var("SESSION_JWT_SECRET") {
                    Ok(secret) if !secret.trim().is_empty() => secret,
                    _ if production => {
                        return Err("SESSION_JWT_SECRET must be set in production".to_string())
                    }
                    _ => DEV_JWT_SECRET.to_string(),
                },
            },
        })
    }

    pub fn http_bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }

    pub fn allowed_origins(&self) -> Vec<&str> {
        self.cors
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => parse_value(key, &val),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, val: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    val.trim()
        .parse()
        .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e))
}
