//! Configuration
//! Mission: Load all runtime configuration from the environment, once, at startup

use anyhow::{bail, Context, Result};
use std::env;

/// Minimum secret length for HS256 (256 bits).
const MIN_SECRET_BYTES: usize = 32;

/// JWT signing configuration. The secret is read once and treated as
/// immutable for the process lifetime (no hot reload, no rotation).
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in milliseconds (default 15 minutes)
    pub access_token_expiration_ms: i64,
    /// Refresh token lifetime in milliseconds (default 7 days)
    pub refresh_token_expiration_ms: i64,
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .context("JWT_SECRET is not set; it is required to sign tokens")?;
        if secret.len() < MIN_SECRET_BYTES {
            bail!(
                "JWT_SECRET must be at least {} bytes for HS256 (got {})",
                MIN_SECRET_BYTES,
                secret.len()
            );
        }

        Ok(Self {
            secret,
            access_token_expiration_ms: env_i64("JWT_ACCESS_TOKEN_EXPIRATION_MS", 900_000),
            refresh_token_expiration_ms: env_i64("JWT_REFRESH_TOKEN_EXPIRATION_MS", 604_800_000),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "meditation-center".to_string()),
        })
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env_i64("PORT", 8080);
        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| format!("0.0.0.0:{}", port));
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "meditation_center.db".to_string());

        Ok(Self {
            bind_addr,
            database_path,
            jwt: JwtConfig::from_env()?,
        })
    }
}

fn env_i64(var: &str, default: i64) -> i64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt_config(secret: &str) -> Result<JwtConfig> {
        // from_env reads the process environment, which is shared across
        // tests; validate the length rule directly instead.
        if secret.len() < MIN_SECRET_BYTES {
            bail!("too short");
        }
        Ok(JwtConfig {
            secret: secret.to_string(),
            access_token_expiration_ms: 900_000,
            refresh_token_expiration_ms: 604_800_000,
            issuer: "meditation-center".to_string(),
        })
    }

    #[test]
    fn test_secret_length_rule() {
        assert!(test_jwt_config("short").is_err());
        assert!(test_jwt_config("0123456789abcdef0123456789abcdef").is_ok());
    }

    #[test]
    fn test_env_i64_defaults() {
        assert_eq!(env_i64("DOES_NOT_EXIST_XYZ", 900_000), 900_000);
    }
}
