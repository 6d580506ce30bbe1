use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_CACHE_NAME, DEFAULT_MAX_POLL_BACKOFF_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_ROSTER_TTL_SECS, DEFAULT_SQUIRREL_MOVE_INTERVAL_SECS, DEFAULT_TOKEN_EXPIRY_MINUTES,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Cache
    pub redis_url: String,
    pub cache_name: String,

    // Disposable tokens
    pub token_signing_secret: String,
    pub token_expiry_minutes: u64,

    // Gameplay
    pub allow_negative_experience: bool,
    pub enable_squirrel_mover: bool,
    pub squirrel_move_interval_secs: u64,
    pub roster_ttl_secs: u64,

    // Client polling
    pub poll_interval_ms: u64,
    pub max_poll_backoff_ms: u64,

    // Request shaping
    pub trust_forwarded_for: bool,
    pub internal_api_key: Option<String>,

    // CORS
    pub cors_allowed_origins: String,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| {
            let normalized = v.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            cache_name: env::var("CACHE_NAME").unwrap_or_else(|_| DEFAULT_CACHE_NAME.to_string()),

            token_signing_secret: env::var("TOKEN_SIGNING_SECRET")?,
            token_expiry_minutes: env::var("TOKEN_EXPIRY_MINUTES")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_TOKEN_EXPIRY_MINUTES))?,

            allow_negative_experience: env_flag("ALLOW_NEGATIVE_EXPERIENCE", true),
            enable_squirrel_mover: env_flag("ENABLE_SQUIRREL_MOVER", true),
            squirrel_move_interval_secs: env::var("SQUIRREL_MOVE_INTERVAL_SECS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_SQUIRREL_MOVE_INTERVAL_SECS))?,
            roster_ttl_secs: env::var("ROSTER_TTL_SECS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_ROSTER_TTL_SECS))?,

            poll_interval_ms: env::var("POLL_INTERVAL_MS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_POLL_INTERVAL_MS))?,
            max_poll_backoff_ms: env::var("MAX_POLL_BACKOFF_MS")
                .map(|v| v.parse())
                .unwrap_or(Ok(DEFAULT_MAX_POLL_BACKOFF_MS))?,

            trust_forwarded_for: env_flag("TRUST_FORWARDED_FOR", false),
            internal_api_key: env::var("INTERNAL_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.redis_url.trim().is_empty() {
            anyhow::bail!("REDIS_URL is empty");
        }
        if self.cache_name.trim().is_empty() {
            anyhow::bail!("CACHE_NAME is empty");
        }
        if self.token_signing_secret.trim().is_empty() {
            anyhow::bail!("TOKEN_SIGNING_SECRET is empty");
        }
        if self.token_expiry_minutes == 0 {
            anyhow::bail!("TOKEN_EXPIRY_MINUTES must be > 0");
        }
        if self.poll_interval_ms == 0 || self.squirrel_move_interval_secs == 0 {
            anyhow::bail!("Polling and squirrel intervals must be > 0");
        }
        if self.roster_ttl_secs == 0 {
            anyhow::bail!("ROSTER_TTL_SECS must be > 0");
        }
        if self.roster_ttl_secs.saturating_mul(1000) <= self.max_poll_backoff_ms {
            tracing::warn!(
                "ROSTER_TTL_SECS ({}) does not outlast MAX_POLL_BACKOFF_MS ({}); backing-off players will drop off the roster",
                self.roster_ttl_secs,
                self.max_poll_backoff_ms
            );
        }

        if self.max_poll_backoff_ms < self.poll_interval_ms {
            tracing::warn!(
                "MAX_POLL_BACKOFF_MS ({}) is below POLL_INTERVAL_MS ({}); backoff will not grow",
                self.max_poll_backoff_ms,
                self.poll_interval_ms
            );
        }
        if self.token_signing_secret.contains("change_me") || self.token_signing_secret.len() < 16 {
            tracing::warn!("Detected weak or dev token signing secret");
        }
        if self.internal_api_key.is_none() && !self.is_development() {
            tracing::warn!("INTERNAL_API_KEY not set; level-up endpoint is unauthenticated");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "test"
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "test".to_string(),
        database_url: "postgres://localhost/squirrel_test".to_string(),
        database_max_connections: 1,
        redis_url: "redis://localhost:6379".to_string(),
        cache_name: "squirrel-game".to_string(),
        token_signing_secret: "test_signing_secret_0123456789".to_string(),
        token_expiry_minutes: 30,
        allow_negative_experience: true,
        enable_squirrel_mover: true,
        squirrel_move_interval_secs: 3,
        roster_ttl_secs: 120,
        poll_interval_ms: 3000,
        max_poll_backoff_ms: 30000,
        trust_forwarded_for: false,
        internal_api_key: None,
        cors_allowed_origins: "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_test_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let mut config = test_config();
        config.token_signing_secret = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_expiry() {
        let mut config = test_config();
        config.token_expiry_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_roster_ttl() {
        let mut config = test_config();
        config.roster_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_counts_as_development() {
        let mut config = test_config();
        assert!(config.is_development());
        config.environment = "production".to_string();
        assert!(!config.is_development());
    }
}
