//! Configuration management for the job board API

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Security headers configuration
    pub security_headers: SecurityHeadersConfig,
    /// Telemetry configuration
    pub telemetry: TelemetryConfig,
    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
    /// Whether Swagger UI is served at /api-docs
    pub docs_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    /// Token lifetime in seconds
    pub lifetime_secs: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Requests allowed per client within one window
    pub max_requests: u64,
    /// Window size in seconds
    pub window_secs: u64,
    /// Honour the first `X-Forwarded-For` hop as the client address
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 15 * 60,
            trust_proxy: true,
        }
    }
}

/// CORS configuration. An empty origin list allows any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub hsts_enabled: bool,
    /// Only emit HSTS when the request arrived over HTTPS
    pub hsts_https_only: bool,
    /// Treat `X-Forwarded-Proto: https` as HTTPS
    pub hsts_trust_x_forwarded_proto: bool,
    pub hsts_max_age_secs: u64,
    pub hsts_include_subdomains: bool,
    pub hsts_preload: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_enabled: true,
            hsts_https_only: true,
            hsts_trust_x_forwarded_proto: true,
            hsts_max_age_secs: 31_536_000,
            hsts_include_subdomains: true,
            hsts_preload: false,
        }
    }
}

/// Logging and metrics configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "pretty" or "json"
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}

/// Upper bound for `JWT_LIFETIME_SECS` (10 years)
pub const MAX_JWT_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

fn validate_jwt_lifetime(secs: i64) -> Result<i64> {
    if (1..=MAX_JWT_LIFETIME_SECS).contains(&secs) {
        Ok(secs)
    } else {
        anyhow::bail!(
            "Invalid JWT_LIFETIME_SECS: {} (expected 1..={})",
            secs,
            MAX_JWT_LIFETIME_SECS
        )
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("MONGO_URI"))
            .context("DATABASE_URL (or MONGO_URI) is required")?;

        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_parse("PORT", 3000)?,
            database: DatabaseConfig {
                url: database_url,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS", 1)?,
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "jobboard-api".to_string()),
                lifetime_secs: validate_jwt_lifetime(env_parse(
                    "JWT_LIFETIME_SECS",
                    30 * 24 * 60 * 60,
                )?)?,
            },
            rate_limit: RateLimitConfig {
                enabled: env_flag("RATE_LIMIT_ENABLED", true),
                max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 100)?,
                window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
                trust_proxy: env_flag("TRUST_PROXY", true),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(|o| o.trim().to_string())
                            .filter(|o| !o.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            security_headers: SecurityHeadersConfig {
                hsts_enabled: env_flag("HSTS_ENABLED", true),
                hsts_https_only: env_flag("HSTS_HTTPS_ONLY", true),
                hsts_trust_x_forwarded_proto: env_flag("HSTS_TRUST_X_FORWARDED_PROTO", true),
                ..SecurityHeadersConfig::default()
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                metrics_enabled: env_flag("METRICS_ENABLED", false),
            },
            body_limit_bytes: env_parse("BODY_LIMIT_BYTES", 100 * 1024)?,
            docs_enabled: env_flag("DOCS_ENABLED", true),
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
