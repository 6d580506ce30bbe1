// src/api/mod.rs

pub mod game;
pub mod health;
pub mod level;
pub mod play;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;

use crate::config::Config;
use crate::constants::INTERNAL_KEY_HEADER;
use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::render::PageSettings;
use crate::services::{
    token_service::Claims, ExperiencePolicy, GameCache, LevelUpService, TokenService, UserLoader,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenService>,
    pub cache: Arc<dyn GameCache>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenService>,
        cache: Arc<dyn GameCache>,
        config: Config,
    ) -> Self {
        Self {
            store,
            tokens,
            cache,
            config,
        }
    }

    pub fn user_loader(&self) -> UserLoader {
        UserLoader::new(self.store.clone())
    }

    pub fn level_up_service(&self) -> LevelUpService {
        LevelUpService::new(
            self.store.clone(),
            self.cache.clone(),
            ExperiencePolicy {
                allow_negative: self.config.allow_negative_experience,
            },
        )
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            poll_interval_ms: self.config.poll_interval_ms,
            max_backoff_ms: self.config.max_poll_backoff_ms,
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::AuthError("Missing Authorization header".to_string()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::AuthError("Invalid Authorization header".to_string()))?;
    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthError("Invalid Authorization scheme".to_string()))
}

/// Verifies the bearer token and that it may read the configured cache.
pub fn require_cache_reader(headers: &HeaderMap, state: &AppState) -> Result<Claims> {
    let token = bearer_token(headers)?;
    let claims = state.tokens.verify(token)?;
    if !claims.can_read_cache(&state.config.cache_name) {
        return Err(AppError::Forbidden(format!(
            "Token cannot read cache {}",
            state.config.cache_name
        )));
    }
    Ok(claims)
}

/// Internal endpoints are open unless `INTERNAL_API_KEY` is configured.
pub fn require_internal_caller(headers: &HeaderMap, state: &AppState) -> Result<()> {
    let Some(expected) = state.config.internal_api_key.as_deref() else {
        return Ok(());
    };
    let provided = headers
        .get(INTERNAL_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::AuthError("Missing internal key".to_string()))?;
    if provided != expected {
        return Err(AppError::AuthError("Invalid internal key".to_string()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::memory::MemoryUserStore;
    use crate::services::{game_cache::memory::MemoryGameCache, JwtTokenService};

    pub struct TestApp {
        pub state: AppState,
        pub store: Arc<MemoryUserStore>,
        pub cache: Arc<MemoryGameCache>,
    }

    pub fn test_app() -> TestApp {
        let config = crate::config::test_config();
        let store = Arc::new(MemoryUserStore::new());
        let cache = Arc::new(MemoryGameCache::new());
        let tokens = Arc::new(JwtTokenService::new(&config.token_signing_secret));
        let state = AppState::new(store.clone(), tokens, cache.clone(), config);
        TestApp {
            state,
            store,
            cache,
        }
    }
}
